//! First pass: scans the `.am` stream, registers symbols, parses
//! directives into the data image, and pre-encodes everything about each
//! instruction that doesn't depend on resolving a symbol address (the
//! first word's opcode/mode bits, and any immediate operand words).
//!
//! Per-line errors are accumulated so a single source file surfaces its
//! full set of first-pass diagnostics in one run.

use crate::assembler::context::Context;
use crate::assembler::directives;
use crate::assembler::error::Error;
use crate::assembler::image::InstructionRecord;
use crate::assembler::instructions::{
    encode_first_word, encode_immediate_word, expected_operand_count, opcode_for, validate_addressing,
    word_count,
};
use crate::assembler::label::{self, LabelError};
use crate::assembler::operand::{parse_operand, Operand};
use crate::assembler::statement::{split_first_token, split_operands, strip_comment};
use crate::assembler::symbol::SymbolKind;
use crate::assembler::word::{Address, Word, IC_START};

const DIRECTIVE_NAMES: &[&str] = &[".data", ".string", ".mat", ".extern", ".entry"];
const MAX_IMAGE_WORDS: i32 = 156; // 256 - IC_START

/// Walk the macro-expanded source, mutating `ctx` in place, and return
/// every line-level error encountered.
pub fn run(source: &str, ctx: &mut Context) -> Vec<Error> {
    let mut errors = Vec::new();

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        let stripped = strip_comment(raw_line);
        if stripped.is_empty() {
            continue;
        }

        let (label, rest) = peel_label(stripped, line_number, &mut errors);

        if rest.is_empty() {
            if label.is_some() {
                errors.push(Error::Syntax { line_number });
            }
            continue;
        }

        let (first_token, operand_text) = split_first_token(rest);

        if let Some(name) = fused_directive_name(first_token) {
            errors.push(Error::MissingWhitespace { line_number });
            let _ = name;
            continue;
        }

        match first_token {
            ".data" => handle_data(label.as_deref(), operand_text, line_number, ctx, &mut errors),
            ".string" => handle_string(label.as_deref(), operand_text, line_number, ctx, &mut errors),
            ".mat" => handle_matrix(label.as_deref(), operand_text, line_number, ctx, &mut errors),
            ".extern" => handle_extern(label.as_deref(), operand_text, line_number, ctx, &mut errors),
            ".entry" => { /* resolved in the second pass */ }
            other if other.starts_with('.') => {
                errors.push(Error::InvalidDirective { name: other.to_string(), line_number })
            }
            mnemonic => match opcode_for(mnemonic) {
                Some(opcode) => {
                    handle_instruction(label.as_deref(), opcode, operand_text, line_number, ctx, &mut errors)
                }
                None => errors.push(Error::UnknownInstruction {
                    mnemonic: mnemonic.to_string(),
                    line_number,
                }),
            },
        }
    }

    errors
}

/// Peel a `<name>:` prefix off the front of a comment-stripped line,
/// validating the name against label syntax and the reserved-word table.
/// A malformed or reserved name still consumes the colon token (so the
/// rest of the line is dispatched normally) but is not registered.
fn peel_label<'a>(line: &'a str, line_number: usize, errors: &mut Vec<Error>) -> (Option<String>, &'a str) {
    let first_token_end = line.find(char::is_whitespace).unwrap_or(line.len());
    let first_token = &line[..first_token_end];
    let Some(colon_index) = first_token.find(':') else {
        return (None, line);
    };
    if colon_index != first_token.len() - 1 {
        return (None, line);
    }
    let name = &first_token[..colon_index];
    let rest = line[first_token_end..].trim_start();
    match label::validate(name) {
        Ok(()) => (Some(name.to_string()), rest),
        Err(LabelError::Reserved) => {
            errors.push(Error::ReservedWord { word: name.to_string(), line_number });
            (None, rest)
        }
        Err(LabelError::Syntax) => {
            errors.push(Error::InvalidLabel { name: name.to_string(), line_number });
            (None, rest)
        }
    }
}

/// Detect a directive glued to its operand text with no separating
/// whitespace, e.g. `.mat[2][2]` or `.string"hi"`.
fn fused_directive_name(token: &str) -> Option<&'static str> {
    DIRECTIVE_NAMES
        .iter()
        .find(|&&name| token != name && token.starts_with(name))
        .copied()
}

fn remaining_capacity(ctx: &Context) -> i32 {
    MAX_IMAGE_WORDS - (ctx.ic as i32 - IC_START as i32) - ctx.dc as i32
}

fn register_data_label(
    label: Option<&str>,
    line_number: usize,
    ctx: &mut Context,
    errors: &mut Vec<Error>,
) {
    if let Some(name) = label {
        if ctx.symbols.add(name, ctx.dc as Address, SymbolKind::Data).is_err() {
            errors.push(Error::DuplicateLabel { name: name.to_string(), line_number });
        }
    }
}

fn append_data_words(words: Vec<Word>, line_number: usize, ctx: &mut Context, errors: &mut Vec<Error>) {
    if remaining_capacity(ctx) < words.len() as i32 {
        errors.push(Error::DataImageOverflow { line_number });
        return;
    }
    for word in words {
        ctx.data_image.push(word);
        ctx.dc += 1;
    }
}

fn handle_data(
    label: Option<&str>,
    text: &str,
    line_number: usize,
    ctx: &mut Context,
    errors: &mut Vec<Error>,
) {
    register_data_label(label, line_number, ctx, errors);
    match directives::parse_data(text, line_number) {
        Ok(words) => append_data_words(words, line_number, ctx, errors),
        Err(error) => errors.push(error),
    }
}

fn handle_string(
    label: Option<&str>,
    text: &str,
    line_number: usize,
    ctx: &mut Context,
    errors: &mut Vec<Error>,
) {
    register_data_label(label, line_number, ctx, errors);
    match directives::parse_string(text, line_number) {
        Ok(words) => append_data_words(words, line_number, ctx, errors),
        Err(error) => errors.push(error),
    }
}

fn handle_matrix(
    label: Option<&str>,
    text: &str,
    line_number: usize,
    ctx: &mut Context,
    errors: &mut Vec<Error>,
) {
    register_data_label(label, line_number, ctx, errors);
    match directives::parse_matrix(text, line_number) {
        Ok(words) => append_data_words(words, line_number, ctx, errors),
        Err(error) => errors.push(error),
    }
}

fn handle_extern(
    label: Option<&str>,
    text: &str,
    line_number: usize,
    ctx: &mut Context,
    errors: &mut Vec<Error>,
) {
    if label.is_some() {
        errors.push(Error::LabelOnExtern { line_number });
    }
    match directives::parse_extern_name(text, line_number) {
        Ok(name) => {
            if ctx.symbols.add(name, 0, SymbolKind::External).is_err() {
                errors.push(Error::DuplicateLabel { name: name.to_string(), line_number });
            }
        }
        Err(error) => errors.push(error),
    }
}

/// Parse the operand text for an instruction with `opcode` into a
/// `(source, target)` pair, validating operand count and comma usage.
/// Shared with the second pass, which re-parses the same text once symbol
/// addresses are known.
pub(crate) fn parse_instruction_operands(
    opcode: u8,
    text: &str,
    line_number: usize,
) -> Result<(Option<Operand>, Option<Operand>), Error> {
    let expected = expected_operand_count(opcode);

    if expected == 0 {
        if !text.is_empty() {
            return Err(Error::TooManyOperands { line_number });
        }
        return Ok((None, None));
    }

    let comma_count = text.matches(',').count();
    if expected == 2 && comma_count == 0 && text.split_whitespace().count() >= 2 {
        return Err(Error::MissingComma { line_number });
    }

    let tokens = split_operands(text);
    if tokens.is_empty() || tokens.iter().any(|token| token.is_empty()) {
        return Err(Error::TooFewOperands { line_number });
    }
    if tokens.len() < expected {
        return Err(Error::TooFewOperands { line_number });
    }
    if tokens.len() > expected {
        return Err(Error::TooManyOperands { line_number });
    }

    if expected == 1 {
        let target = parse_operand(tokens[0], line_number)?;
        Ok((None, Some(target)))
    } else {
        let source = parse_operand(tokens[0], line_number)?;
        let target = parse_operand(tokens[1], line_number)?;
        Ok((Some(source), Some(target)))
    }
}

fn handle_instruction(
    label: Option<&str>,
    opcode: u8,
    text: &str,
    line_number: usize,
    ctx: &mut Context,
    errors: &mut Vec<Error>,
) {
    if let Some(name) = label {
        if ctx.symbols.add(name, ctx.ic as Address, SymbolKind::Code).is_err() {
            errors.push(Error::DuplicateLabel { name: name.to_string(), line_number });
        }
    }

    let (source, target) = match parse_instruction_operands(opcode, text, line_number) {
        Ok(pair) => pair,
        Err(error) => {
            errors.push(error);
            return;
        }
    };

    if let Err(error) = validate_addressing(opcode, source.as_ref(), target.as_ref(), line_number) {
        errors.push(error);
        return;
    }

    let count = word_count(source.as_ref(), target.as_ref());
    if remaining_capacity(ctx) < count as i32 {
        errors.push(Error::InstructionImageOverflow { line_number });
        return;
    }

    let source_mode = source.as_ref().map(Operand::mode);
    let target_mode = target.as_ref().map(Operand::mode);
    let first_word = encode_first_word(opcode, source_mode, target_mode);

    let is_register_pair =
        matches!((&source, &target), (Some(Operand::Register(_)), Some(Operand::Register(_))));

    let mut immediates = [None, None];
    let mut immediate_count = 0u8;
    if !is_register_pair {
        for operand in [&source, &target].into_iter().flatten() {
            if let Operand::Immediate(value) = operand {
                immediates[immediate_count as usize] = Some(encode_immediate_word(*value));
                immediate_count += 1;
            }
        }
    }

    ctx.records.push(InstructionRecord {
        ic_address: ctx.ic as Address,
        word_count: count,
        first_word,
        immediates,
        immediate_count,
    });
    ctx.ic += count as u16;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_source(source: &str) -> (Context, Vec<Error>) {
        let mut ctx = Context::new();
        let errors = run(source, &mut ctx);
        (ctx, errors)
    }

    #[test]
    fn registers_a_code_label_at_ic() {
        let (ctx, errors) = run_source("main: stop");
        assert!(errors.is_empty());
        assert_eq!(ctx.symbols.get("main").unwrap().address, 100);
    }

    #[test]
    fn registers_a_data_label_at_dc() {
        let (ctx, errors) = run_source("X: .data 5, 6");
        assert!(errors.is_empty());
        assert_eq!(ctx.symbols.get("X").unwrap().address, 0);
        assert_eq!(ctx.dc, 2);
    }

    #[test]
    fn label_on_extern_is_an_error_and_not_registered() {
        let (ctx, errors) = run_source("X: .extern FOO");
        assert!(matches!(errors.as_slice(), [Error::LabelOnExtern { .. }]));
        assert!(!ctx.symbols.is_defined("X"));
        assert!(ctx.symbols.is_defined("FOO"));
    }

    #[test]
    fn label_on_entry_is_silently_ignored() {
        let (ctx, errors) = run_source("X: .entry Y");
        assert!(errors.is_empty());
        assert!(!ctx.symbols.is_defined("X"));
    }

    #[test]
    fn two_register_operands_share_one_word() {
        let (ctx, errors) = run_source("add r1, r2");
        assert!(errors.is_empty());
        assert_eq!(ctx.records.len(), 1);
        assert_eq!(ctx.records[0].word_count, 2);
    }

    #[test]
    fn immediate_operand_is_pre_encoded() {
        let (ctx, errors) = run_source("mov #-1, r3");
        assert!(errors.is_empty());
        let record = &ctx.records[0];
        assert_eq!(record.word_count, 2);
        assert_eq!(record.immediate_count, 1);
        assert!(record.immediates[0].is_some());
    }

    #[test]
    fn invalid_addressing_mode_is_reported() {
        let (_, errors) = run_source("lea #5, r1");
        assert!(matches!(errors.as_slice(), [Error::InvalidSourceAddressing { .. }]));
    }

    #[test]
    fn missing_comma_between_operands_is_reported() {
        let (_, errors) = run_source("mov r1 r2");
        assert!(matches!(errors.as_slice(), [Error::MissingComma { .. }]));
    }

    #[test]
    fn fused_directive_reports_missing_whitespace() {
        let (_, errors) = run_source("M: .mat[2][2] 1,2,3,4");
        assert!(matches!(errors.as_slice(), [Error::MissingWhitespace { .. }]));
    }

    #[test]
    fn unknown_mnemonic_is_reported() {
        let (_, errors) = run_source("frobnicate r1");
        assert!(matches!(errors.as_slice(), [Error::UnknownInstruction { .. }]));
    }
}
