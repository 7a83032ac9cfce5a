//! A two-pass assembler for a pedagogical 16-opcode machine with 10-bit words.
//!
//! Given a `name.as` source file this crate produces `name.ob` (a base-4
//! encoded object file), and, when applicable, `name.ent` (entry symbols)
//! and `name.ext` (external reference usages).

pub mod assembler;
pub mod logging;
