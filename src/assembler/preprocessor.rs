//! Macro expansion: `name.as` -> `name.am`.
//!
//! Single pass over the input, textual, one level of substitution (macro
//! bodies are not themselves expanded). Comments are not recognized
//! specially here — they pass through untouched, to be stripped later by
//! the first pass.

use std::collections::HashMap;

use crate::assembler::error::Error;
use crate::assembler::label;
use crate::assembler::reserved::is_reserved;

/// A macro definition: its name and the ordered body lines recorded
/// between `mcro` and `mcroend`.
#[derive(Debug, Clone)]
pub struct Macro {
    pub name: String,
    pub body: Vec<String>,
}

const MAX_SIGNIFICANT_LINE_LENGTH: usize = 80;

/// Expand all macro definitions in `source`, returning the expanded text.
/// Accumulates every line-level error found rather than stopping at the
/// first one, so the caller can report the maximum diagnostic set; the
/// expanded text should only be used when the returned error list is empty.
pub fn preprocess(source: &str) -> (String, Vec<Error>) {
    let mut errors = Vec::new();
    let mut macros: HashMap<String, Macro> = HashMap::new();
    let mut output_lines: Vec<String> = Vec::new();
    let mut current: Option<Macro> = None;

    for (index, raw_line) in source.lines().enumerate() {
        let line_number = index + 1;
        if raw_line.len() > MAX_SIGNIFICANT_LINE_LENGTH {
            errors.push(Error::LineTooLong { line_number });
            continue;
        }

        let mut tokens = raw_line.split_whitespace();
        let first = tokens.next();

        if let Some(macro_def) = current.as_mut() {
            if first == Some("mcroend") {
                if tokens.next().is_some() {
                    errors.push(Error::MacroExtraText { line_number });
                }
                let macro_def = current.take().unwrap();
                if macros.contains_key(&macro_def.name) {
                    errors.push(Error::DuplicateLabel { name: macro_def.name, line_number });
                } else {
                    macros.insert(macro_def.name.clone(), macro_def);
                }
            } else {
                macro_def.body.push(raw_line.to_string());
            }
            continue;
        }

        if first == Some("mcro") {
            match tokens.next() {
                None => errors.push(Error::MacroMissingName { line_number }),
                Some(name) => {
                    if tokens.next().is_some() {
                        errors.push(Error::MacroExtraText { line_number });
                    } else if is_reserved(name) {
                        errors.push(Error::MacroReservedWord {
                            name: name.to_string(),
                            line_number,
                        });
                    } else if label::validate(name).is_err() {
                        errors.push(Error::LabelSyntax { line_number });
                    } else {
                        current = Some(Macro { name: name.to_string(), body: Vec::new() });
                    }
                }
            }
            continue;
        }

        if first == Some("mcroend") {
            errors.push(Error::MacroExtraText { line_number });
            continue;
        }

        match first.and_then(|name| macros.get(name)) {
            Some(macro_def) => output_lines.extend(macro_def.body.iter().cloned()),
            None => output_lines.push(raw_line.to_string()),
        }
    }

    if current.is_some() {
        errors.push(Error::MacroMissingEnd { line_number: source.lines().count() });
    }

    (output_lines.join("\n"), errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_a_macro_in_place() {
        let source = "mcro M\nmov r1, r2\nmcroend\nM\nrts";
        let (expanded, errors) = preprocess(source);
        assert!(errors.is_empty());
        assert_eq!(expanded, "mov r1, r2\nrts");
    }

    #[test]
    fn macro_bodies_are_not_recursively_expanded() {
        let source = "mcro A\nmov r1, r2\nmcroend\nmcro B\nA\nmcroend\nB";
        let (expanded, errors) = preprocess(source);
        assert!(errors.is_empty());
        assert_eq!(expanded, "A");
    }

    #[test]
    fn missing_macro_name_is_an_error() {
        let (_, errors) = preprocess("mcro\nmcroend");
        assert!(matches!(errors.as_slice(), [Error::MacroMissingName { .. }]));
    }

    #[test]
    fn reserved_word_as_macro_name_is_an_error() {
        let (_, errors) = preprocess("mcro mov\nmcroend");
        assert!(matches!(errors.as_slice(), [Error::MacroReservedWord { .. }]));
    }

    #[test]
    fn unclosed_macro_is_an_error() {
        let (_, errors) = preprocess("mcro M\nmov r1, r2");
        assert!(matches!(errors.as_slice(), [Error::MacroMissingEnd { .. }]));
    }

    #[test]
    fn extra_text_after_mcroend_is_an_error() {
        let (_, errors) = preprocess("mcro M\nmov r1, r2\nmcroend extra");
        assert!(matches!(errors.as_slice(), [Error::MacroExtraText { .. }]));
    }
}
