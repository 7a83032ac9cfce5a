//! Label-name validation, shared by label parsing, `.extern`/`.entry`
//! operands, and macro-name validation.

use std::sync::LazyLock;

use regex::Regex;

use crate::assembler::reserved::is_reserved;

static LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,29}$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelError {
    Syntax,
    Reserved,
}

/// Validate a name against label syntax (1..30 printable chars, starts with
/// a letter, alphanumeric plus underscore) and the reserved-word table.
pub fn validate(name: &str) -> Result<(), LabelError> {
    if !LABEL_PATTERN.is_match(name) {
        return Err(LabelError::Syntax);
    }
    if is_reserved(name) {
        return Err(LabelError::Reserved);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_labels() {
        assert_eq!(validate("LOOP"), Ok(()));
        assert_eq!(validate("x_1"), Ok(()));
        assert_eq!(validate(&"A".repeat(30)), Ok(()));
    }

    #[test]
    fn rejects_bad_syntax() {
        assert_eq!(validate("1LOOP"), Err(LabelError::Syntax));
        assert_eq!(validate(""), Err(LabelError::Syntax));
        assert_eq!(validate(&"A".repeat(31)), Err(LabelError::Syntax));
        assert_eq!(validate("bad-name"), Err(LabelError::Syntax));
    }

    #[test]
    fn rejects_reserved_words() {
        assert_eq!(validate("mov"), Err(LabelError::Reserved));
        assert_eq!(validate("r3"), Err(LabelError::Reserved));
    }
}
