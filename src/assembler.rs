//! Converts source in the pedagogical 16-opcode assembly language into a
//! base-4 encoded object file, in two passes.
//!
//! The preprocessor expands macros (`name.as` -> `name.am`); the first
//! pass walks the expanded source building the symbol table, the data
//! image, and everything about each instruction that doesn't depend on a
//! symbol address; the second pass re-walks the source once symbol
//! addresses are final, resolving `Direct`/`Matrix` operands and
//! producing the instruction image plus `.entry`/external-use records.
//! The emitter renders all of that to `.ob`/`.ent`/`.ext`.
//!
//! Comments start with a semicolon (`;`) and run to the end of the line.
//! Labels are case-sensitive; mnemonics and directives are not
//! special-cased for case at all — they're matched literally in lower
//! case, per the language's own grammar.

pub mod context;
pub mod directives;
pub mod emitter;
pub mod error;
pub mod first_pass;
pub mod image;
pub mod instructions;
pub mod label;
pub mod operand;
pub mod preprocessor;
pub mod reserved;
pub mod second_pass;
pub mod statement;
pub mod symbol;
pub mod word;

pub use context::Context;
pub use error::Error;
pub use word::Address;

use std::fs;

/// What happened when assembling one file. The CLI maps each variant to
/// an exit status and decides what to print; only `Success` means output
/// files were written.
#[derive(Debug)]
pub enum Outcome {
    Success,
    /// The source file had no significant content at all.
    Empty,
    FileNotFound,
    /// An I/O failure other than the source file being missing.
    Io(Error),
    MacroErrors(Vec<Error>),
    FirstPassErrors(Vec<Error>),
    SecondPassErrors(Vec<Error>),
    WriteError(Error),
}

/// Read `<stem>.as` and run it through the full pipeline.
pub fn assemble_file(stem: &str) -> Outcome {
    let source_path = format!("{stem}.as");
    let source = match fs::read_to_string(&source_path) {
        Ok(source) => source,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Outcome::FileNotFound,
        Err(error) => return Outcome::Io(Error::Io { source: error }),
    };
    assemble(stem, &source)
}

/// Run the full pipeline against already-read source text. `stem` names
/// the output files (`<stem>.am`, `<stem>.ob`, `<stem>.ent`, `<stem>.ext`).
pub fn assemble(stem: &str, source: &str) -> Outcome {
    if source.trim().is_empty() {
        return Outcome::Empty;
    }

    let (expanded, macro_errors) = preprocessor::preprocess(source);
    if !macro_errors.is_empty() {
        return Outcome::MacroErrors(macro_errors);
    }
    if let Err(error) = fs::write(format!("{stem}.am"), &expanded) {
        return Outcome::Io(Error::Io { source: error });
    }

    let mut ctx = Context::new();
    let first_pass_errors = first_pass::run(&expanded, &mut ctx);
    if !first_pass_errors.is_empty() {
        return Outcome::FirstPassErrors(first_pass_errors);
    }

    let icf = ctx.ic;
    let dcf = ctx.dc;
    ctx.symbols.relocate_data(icf as Address);

    let (instruction_image, entries, externals, second_pass_errors) = second_pass::run(&expanded, &mut ctx);
    if !second_pass_errors.is_empty() {
        return Outcome::SecondPassErrors(second_pass_errors);
    }

    let object_text = emitter::build_object_text(&ctx, icf, dcf, &instruction_image);
    let entries_text = emitter::build_entries_text(&entries);
    let externals_text = emitter::build_externals_text(&externals);
    match emitter::write_outputs(stem, &object_text, entries_text.as_deref(), externals_text.as_deref()) {
        Ok(()) => Outcome::Success,
        Err(error) => Outcome::WriteError(error),
    }
}
