//! Base-4 rendering and output-file assembly: turns the finished images
//! into the text of `.ob`, `.ent`, and `.ext`.
//!
//! The alphabet is `a=0, b=1, c=2, d=3`, most-significant digit first. A
//! 10-bit word takes 5 digits (4^5 = 1024); an 8-bit address takes 4
//! digits (4^4 = 256) — see DESIGN.md for why 4 rather than 5.

use crate::assembler::context::Context;
use crate::assembler::error::Error;
use crate::assembler::image::{EntryRef, ExternalRef, InstructionImage};
use crate::assembler::word::{Address, Word, IC_START};

fn base4_digit(bits: u32) -> char {
    match bits & 0b11 {
        0 => 'a',
        1 => 'b',
        2 => 'c',
        _ => 'd',
    }
}

/// Inverse of [`base4_digit`]: the 2-bit value a base-4 character stands for.
fn base4_digit_value(digit: char) -> Option<u32> {
    match digit {
        'a' => Some(0),
        'b' => Some(1),
        'c' => Some(2),
        'd' => Some(3),
        _ => None,
    }
}

fn encode_fixed(value: u32, digits: usize) -> String {
    let mut chars = vec!['a'; digits];
    let mut remaining = value;
    for slot in chars.iter_mut().rev() {
        *slot = base4_digit(remaining);
        remaining >>= 2;
    }
    chars.into_iter().collect()
}

/// Inverse of [`encode_fixed`]: decode an exactly-`digits`-long base-4
/// string, most-significant digit first, into its unsigned value. `None`
/// if the string isn't exactly `digits` characters or contains a character
/// outside `{a,b,c,d}`.
fn decode_fixed(text: &str, digits: usize) -> Option<u32> {
    if text.chars().count() != digits {
        return None;
    }
    text.chars().try_fold(0u32, |acc, ch| Some((acc << 2) | base4_digit_value(ch)?))
}

/// Encode a 10-bit word as 5 base-4 digits.
pub fn encode_word(word: Word) -> String {
    encode_fixed(word.to_bits() as u32, 5)
}

/// Decode 5 base-4 digits back into the word they encode.
pub fn decode_word(text: &str) -> Option<Word> {
    let bits = decode_fixed(text, 5)?;
    Some(Word::from_bits(bits as u16))
}

/// Encode an 8-bit address as 4 base-4 digits.
pub fn encode_address(address: Address) -> String {
    encode_fixed(address as u32, 4)
}

/// Decode 4 base-4 digits back into the address they encode.
pub fn decode_address(text: &str) -> Option<Address> {
    decode_fixed(text, 4).map(|value| value as Address)
}

/// Encode an unsigned count with no leading-zero padding; zero renders as
/// a single `a`.
pub fn encode_count(value: u16) -> String {
    if value == 0 {
        return "a".to_string();
    }
    let mut digits = Vec::new();
    let mut remaining = value as u32;
    while remaining > 0 {
        digits.push(base4_digit(remaining));
        remaining >>= 2;
    }
    digits.reverse();
    digits.into_iter().collect()
}

/// Render the `.ob` file body: a header line of `<instruction count>
/// <data count>`, then one `<address> <word>` line per instruction word,
/// then one per data word (data addresses continue on from where the
/// instruction image left off).
pub fn build_object_text(ctx: &Context, icf: u16, dcf: u16, instruction_image: &InstructionImage) -> String {
    let mut lines = Vec::with_capacity(1 + instruction_image.len() + ctx.data_image.len());
    lines.push(format!("{} {}", encode_count(icf - IC_START as u16), encode_count(dcf)));

    for (address, word) in instruction_image.iter() {
        lines.push(format!("{} {}", encode_address(*address), encode_word(*word)));
    }

    let mut data_address = icf as u8;
    for word in ctx.data_image.iter() {
        lines.push(format!("{} {}", encode_address(data_address), encode_word(*word)));
        data_address = data_address.wrapping_add(1);
    }

    lines.join("\n")
}

/// Render the `.ent` file body, or `None` if there are no entries.
pub fn build_entries_text(entries: &[EntryRef]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    Some(
        entries
            .iter()
            .map(|entry| format!("{} {}", entry.name, encode_address(entry.final_address)))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Render the `.ext` file body, or `None` if there are no external
/// references. Duplicate names (repeated use sites of the same symbol)
/// produce one line each, by design.
pub fn build_externals_text(externals: &[ExternalRef]) -> Option<String> {
    if externals.is_empty() {
        return None;
    }
    Some(
        externals
            .iter()
            .map(|ext| format!("{} {}", ext.name, encode_address(ext.usage_address)))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Write the finished output text to `<stem>.ob`, and `<stem>.ent` /
/// `<stem>.ext` when those bodies are non-empty.
pub fn write_outputs(
    stem: &str,
    object_text: &str,
    entries_text: Option<&str>,
    externals_text: Option<&str>,
) -> Result<(), Error> {
    std::fs::write(format!("{stem}.ob"), format!("{object_text}\n"))?;
    if let Some(text) = entries_text {
        std::fs::write(format!("{stem}.ent"), format!("{text}\n"))?;
    }
    if let Some(text) = externals_text {
        std::fs::write(format!("{stem}.ext"), format!("{text}\n"))?;
    }
    Ok(())
}
