//! Second pass: re-walks the `.am` stream with an independent
//! instruction-record cursor, resolving `Direct`/`Matrix` operands against
//! the now-final symbol table and emitting the instruction image.
//!
//! Each instruction line advances the cursor into the records the first
//! pass built (see `image::InstructionRecord`); the record's `first_word`
//! and any precomputed immediate words are reused rather than re-encoded,
//! and its `ic_address` is cross-checked against this pass's own IC to
//! catch the two cursors drifting apart. Only runs once the first pass is
//! error-free (see `assembler.rs`): a first-pass error means the record
//! list and the line-by-line walk here would already disagree, so there's
//! nothing this pass could reliably cross-check against.

use crate::assembler::context::Context;
use crate::assembler::directives;
use crate::assembler::error::Error;
use crate::assembler::first_pass::parse_instruction_operands;
use crate::assembler::image::{EntryRef, ExternalRef, InstructionImage, InstructionRecord};
use crate::assembler::instructions::{
    encode_direct_word, encode_external_word, encode_matrix_register_word, encode_register_pair_word,
    encode_register_source_word, encode_register_target_word, opcode_for,
};
use crate::assembler::operand::Operand;
use crate::assembler::statement::{peel_label, split_first_token, strip_comment};
use crate::assembler::symbol::{SymbolKind, SymbolTable};
use crate::assembler::word::{Address, Word, IC_START};

/// Walk `source` a second time, producing the finished instruction image
/// plus any `.entry` and external-reference records, and any errors this
/// pass itself uncovers (undefined symbols, entry/external conflicts).
///
/// `UndefinedSymbol` and `EntryNotDefined` both mean "this name isn't in
/// the symbol table," but are raised at different resolution sites:
/// `UndefinedSymbol` for a `Direct`/`Matrix` operand inside an instruction
/// (see `resolve_symbol_word`), `EntryNotDefined` specifically for a
/// `.entry` directive naming a symbol the file never defines (see
/// `resolve_entry`) — the closed error taxonomy gives each its own kind,
/// so the two resolution paths are kept distinguishable in diagnostics.
pub fn run(source: &str, ctx: &mut Context) -> (InstructionImage, Vec<EntryRef>, Vec<ExternalRef>, Vec<Error>) {
    let mut errors = Vec::new();
    let mut entries = Vec::new();
    let mut externals = Vec::new();
    let mut image = InstructionImage::new();
    let mut ic: u16 = IC_START as u16;
    let mut record_cursor = ctx.records.iter();

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        let stripped = strip_comment(raw_line);
        if stripped.is_empty() {
            continue;
        }

        let (_label, rest) = peel_label(stripped);
        if rest.is_empty() {
            continue;
        }

        let (first_token, operand_text) = split_first_token(rest);

        match first_token {
            ".entry" => match directives::parse_entry_name(operand_text, line_number) {
                Ok(name) => resolve_entry(name, line_number, ctx, &mut entries, &mut errors),
                Err(error) => errors.push(error),
            },
            ".data" | ".string" | ".mat" | ".extern" => {}
            other if other.starts_with('.') => {}
            mnemonic => {
                if let Some(opcode) = opcode_for(mnemonic) {
                    let record = record_cursor
                        .next()
                        .expect("first pass produced one InstructionRecord per instruction line");
                    assert_eq!(
                        record.ic_address, ic as Address,
                        "second pass IC drifted from the first pass's instruction-record cursor"
                    );
                    handle_instruction(
                        opcode,
                        operand_text,
                        line_number,
                        record,
                        &mut ic,
                        &mut image,
                        &ctx.symbols,
                        &mut errors,
                        &mut externals,
                    );
                }
            }
        }
    }

    (image, entries, externals, errors)
}

fn resolve_entry(
    name: &str,
    line_number: usize,
    ctx: &mut Context,
    entries: &mut Vec<EntryRef>,
    errors: &mut Vec<Error>,
) {
    match ctx.symbols.get(name) {
        None => errors.push(Error::EntryNotDefined { name: name.to_string(), line_number }),
        Some(symbol) if symbol.kind == SymbolKind::External => {
            errors.push(Error::ExternalConflict { name: name.to_string(), line_number })
        }
        Some(symbol) => {
            let final_address = symbol.address;
            let _ = ctx.symbols.mark_entry(name);
            entries.push(EntryRef { name: name.to_string(), final_address });
        }
    }
}

/// Emit one instruction's words: the record's pre-built first word, then
/// either the shared register-pair word or each present operand's word(s),
/// resolving `Direct`/`Matrix` symbol references as they're encountered.
#[allow(clippy::too_many_arguments)]
fn handle_instruction(
    opcode: u8,
    operand_text: &str,
    line_number: usize,
    record: &InstructionRecord,
    ic: &mut u16,
    image: &mut InstructionImage,
    symbols: &SymbolTable,
    errors: &mut Vec<Error>,
    externals: &mut Vec<ExternalRef>,
) {
    let (source, target) = match parse_instruction_operands(opcode, operand_text, line_number) {
        Ok(pair) => pair,
        Err(error) => {
            errors.push(error);
            return;
        }
    };

    image.push(*ic as Address, record.first_word);
    *ic += 1;

    if let (Some(Operand::Register(src_reg)), Some(Operand::Register(tgt_reg))) = (&source, &target) {
        image.push(*ic as Address, encode_register_pair_word(*src_reg, *tgt_reg));
        *ic += 1;
        return;
    }

    let mut immediate_cursor = record.immediates.iter().flatten();
    for (operand, is_source) in [(&source, true), (&target, false)] {
        let Some(operand) = operand else { continue };
        let words = encode_operand(operand, is_source, &mut immediate_cursor, symbols, *ic, line_number, errors, externals);
        for word in words {
            image.push(*ic as Address, word);
            *ic += 1;
        }
    }
}

/// Encode one operand's contribution (1 word for Register/Immediate/Direct,
/// 2 for Matrix). Immediate values reuse the word the first pass already
/// computed; `Direct`/`Matrix` are resolved against `symbols` here, since
/// their final address wasn't known until this pass. `next_ic` is the
/// address the first of these words will occupy — it's where an external
/// reference's use site is recorded.
#[allow(clippy::too_many_arguments)]
fn encode_operand<'a>(
    operand: &Operand,
    is_source: bool,
    immediate_cursor: &mut impl Iterator<Item = &'a Word>,
    symbols: &SymbolTable,
    next_ic: u16,
    line_number: usize,
    errors: &mut Vec<Error>,
    externals: &mut Vec<ExternalRef>,
) -> Vec<Word> {
    match operand {
        Operand::Register(register) => {
            vec![if is_source {
                encode_register_source_word(*register)
            } else {
                encode_register_target_word(*register)
            }]
        }
        Operand::Immediate(_) => {
            let word = immediate_cursor
                .next()
                .copied()
                .expect("first pass precomputed one immediate word per Immediate operand");
            vec![word]
        }
        Operand::Direct(name) => {
            vec![resolve_symbol_word(name, symbols, next_ic, line_number, errors, externals)]
        }
        Operand::Matrix { symbol, reg1, reg2 } => {
            let base = resolve_symbol_word(symbol, symbols, next_ic, line_number, errors, externals);
            vec![base, encode_matrix_register_word(*reg1, *reg2)]
        }
    }
}

fn resolve_symbol_word(
    name: &str,
    symbols: &SymbolTable,
    use_address: u16,
    line_number: usize,
    errors: &mut Vec<Error>,
    externals: &mut Vec<ExternalRef>,
) -> Word {
    match symbols.get(name) {
        None => {
            errors.push(Error::UndefinedSymbol { name: name.to_string(), line_number });
            Word::from_bits(0)
        }
        Some(symbol) if symbol.kind == SymbolKind::External => {
            externals.push(ExternalRef { name: name.to_string(), usage_address: use_address as Address });
            encode_external_word()
        }
        Some(symbol) => encode_direct_word(symbol.address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::first_pass;

    fn run_full(source: &str) -> (Context, InstructionImage, Vec<EntryRef>, Vec<ExternalRef>, Vec<Error>) {
        let mut ctx = Context::new();
        let first_errors = first_pass::run(source, &mut ctx);
        assert!(first_errors.is_empty(), "first pass errors: {first_errors:?}");
        let icf = ctx.ic;
        ctx.symbols.relocate_data(icf as Address);
        let (image, entries, externals, errors) = run(source, &mut ctx);
        (ctx, image, entries, externals, errors)
    }

    #[test]
    fn resolves_a_direct_reference_to_a_code_label() {
        let source = "jmp LOOP\nLOOP: stop";
        let (_, image, _, _, errors) = run_full(source);
        assert!(errors.is_empty());
        assert_eq!(image.len(), 3);
    }

    #[test]
    fn external_reference_is_recorded_with_its_use_site() {
        let source = ".extern FOO\njmp FOO";
        let (_, _, _, externals, errors) = run_full(source);
        assert!(errors.is_empty());
        assert_eq!(externals.len(), 1);
        assert_eq!(externals[0].name, "FOO");
        assert_eq!(externals[0].usage_address, 101);
    }

    #[test]
    fn undefined_symbol_in_entry_is_reported_as_entry_not_defined() {
        let source = ".entry MISSING\nstop";
        let (_, _, entries, _, errors) = run_full(source);
        assert!(entries.is_empty());
        assert!(matches!(errors.as_slice(), [Error::EntryNotDefined { .. }]));
    }

    #[test]
    fn undefined_symbol_in_an_operand_is_reported_as_undefined_symbol() {
        let source = "jmp MISSING";
        let (_, _, _, _, errors) = run_full(source);
        assert!(matches!(errors.as_slice(), [Error::UndefinedSymbol { .. }]));
    }

    #[test]
    fn entry_on_external_symbol_is_a_conflict() {
        let source = ".extern FOO\n.entry FOO\njmp FOO";
        let (_, _, entries, _, errors) = run_full(source);
        assert!(entries.is_empty());
        assert!(matches!(errors.as_slice(), [Error::ExternalConflict { .. }]));
    }

    #[test]
    fn entry_on_data_symbol_reports_its_relocated_address() {
        let source = "X: .data 7\n.entry X\nstop";
        let (_, _, entries, _, errors) = run_full(source);
        assert!(errors.is_empty());
        assert_eq!(entries[0].name, "X");
        assert_eq!(entries[0].final_address, 101);
    }

    #[test]
    fn immediate_word_is_reused_rather_than_recomputed() {
        let source = "mov #-1, r3";
        let (_, image, _, _, errors) = run_full(source);
        assert!(errors.is_empty());
        let (_, immediate_word) = image.iter().nth(1).unwrap();
        assert_eq!(immediate_word.to_bits(), 0xFFu16 << 2);
    }
}
