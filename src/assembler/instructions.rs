//! The 16-opcode instruction set: mnemonic lookup, addressing-mode
//! validity, word-count computation, and the 10-bit word encoder.
//!
//! Bits are numbered 9 (MSB) .. 0 (LSB). ARE occupies bits 1:0 of every
//! word: 00 Absolute, 01 External, 10 Relocatable.

use crate::assembler::error::Error;
use crate::assembler::operand::{AddressingMode, Operand};
use crate::assembler::word::{Address, Word};

const MNEMONICS: &[(&str, u8)] = &[
    ("mov", 0),
    ("cmp", 1),
    ("add", 2),
    ("sub", 3),
    ("lea", 4),
    ("clr", 5),
    ("not", 6),
    ("inc", 7),
    ("dec", 8),
    ("jmp", 9),
    ("bne", 10),
    ("jsr", 11),
    ("red", 12),
    ("prn", 13),
    ("rts", 14),
    ("stop", 15),
];

pub fn opcode_for(mnemonic: &str) -> Option<u8> {
    MNEMONICS
        .iter()
        .find(|(name, _)| *name == mnemonic)
        .map(|(_, opcode)| *opcode)
}

/// Modes permitted for the source and target operand of an opcode. An
/// empty slice means that side has no operand at all.
fn allowed_modes(opcode: u8) -> (&'static [u16], &'static [u16]) {
    const ALL: &[u16] = &[0, 1, 2, 3];
    const NONE: &[u16] = &[];
    const REGLIKE: &[u16] = &[1, 2, 3];
    const DIRECT_OR_MATRIX: &[u16] = &[1, 2];
    match opcode {
        0 => (ALL, REGLIKE),            // mov
        1 => (ALL, ALL),                // cmp
        2 => (ALL, REGLIKE),            // add
        3 => (ALL, REGLIKE),            // sub
        4 => (DIRECT_OR_MATRIX, REGLIKE), // lea
        5..=12 => (NONE, REGLIKE),      // clr,not,inc,dec,jmp,bne,jsr,red
        13 => (NONE, ALL),              // prn
        14 | 15 => (NONE, NONE),        // rts, stop
        _ => (NONE, NONE),
    }
}

/// How many operands this opcode's syntax takes: 0, 1 (target only), or 2.
pub fn expected_operand_count(opcode: u8) -> usize {
    let (source, target) = allowed_modes(opcode);
    usize::from(!source.is_empty()) + usize::from(!target.is_empty())
}

pub fn validate_addressing(
    opcode: u8,
    source: Option<&Operand>,
    target: Option<&Operand>,
    line_number: usize,
) -> Result<(), Error> {
    let (allowed_source, allowed_target) = allowed_modes(opcode);
    let source_ok = source.is_none_or(|op| allowed_source.contains(&op.mode().code()));
    let target_ok = target.is_none_or(|op| allowed_target.contains(&op.mode().code()));
    match (source_ok, target_ok) {
        (true, true) => Ok(()),
        (false, true) => Err(Error::InvalidSourceAddressing { line_number }),
        (true, false) => Err(Error::InvalidTargetAddressing { line_number }),
        (false, false) => Err(Error::InvalidAddressingMode { line_number }),
    }
}

/// Total word count for an instruction: one base word, plus a shared word
/// when both operands are Register, plus each present operand's
/// contribution otherwise (Register/Immediate/Direct +1, Matrix +2).
pub fn word_count(source: Option<&Operand>, target: Option<&Operand>) -> u8 {
    if let (Some(Operand::Register(_)), Some(Operand::Register(_))) = (source, target) {
        return 2;
    }
    let mut count = 1;
    if let Some(op) = source {
        count += op.word_contribution();
    }
    if let Some(op) = target {
        count += op.word_contribution();
    }
    count
}

pub fn encode_first_word(
    opcode: u8,
    source_mode: Option<AddressingMode>,
    target_mode: Option<AddressingMode>,
) -> Word {
    let source = source_mode.map(AddressingMode::code).unwrap_or(0);
    let target = target_mode.map(AddressingMode::code).unwrap_or(0);
    Word::from_bits(((opcode as u16) << 6) | (source << 4) | (target << 2))
}

/// Immediate operand word: the value occupies bits 9:2 (8 bits, truncated
/// two's-complement), ARE=00 in bits 1:0.
pub fn encode_immediate_word(value: i16) -> Word {
    let pattern = (value as i32 as u32) & 0xFF;
    Word::from_bits((pattern as u16) << 2)
}

/// Direct operand word for a resolved, non-external symbol: ARE=10
/// (Relocatable).
pub fn encode_direct_word(address: Address) -> Word {
    Word::from_bits(((address as u16) << 2) | 0b10)
}

/// Direct operand word for an external symbol: ARE=01, address field zero.
pub fn encode_external_word() -> Word {
    Word::from_bits(0b01)
}

/// Second word of a matrix operand: the two register indices.
pub fn encode_matrix_register_word(reg1: u8, reg2: u8) -> Word {
    Word::from_bits(((reg1 as u16) << 6) | ((reg2 as u16) << 2))
}

pub fn encode_register_source_word(register: u8) -> Word {
    Word::from_bits((register as u16) << 6)
}

pub fn encode_register_target_word(register: u8) -> Word {
    Word::from_bits((register as u16) << 2)
}

/// The word-sharing encoding used when both operands are Register.
pub fn encode_register_pair_word(source_register: u8, target_register: u8) -> Word {
    Word::from_bits(((source_register as u16) << 6) | ((target_register as u16) << 2))
}
