//! The four addressing modes and the operand sum type.

use std::sync::LazyLock;

use regex::Regex;

use crate::assembler::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    Immediate = 0,
    Direct = 1,
    Matrix = 2,
    Register = 3,
}

impl AddressingMode {
    pub fn code(self) -> u16 {
        self as u16
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Immediate(i16),
    Direct(String),
    Matrix { symbol: String, reg1: u8, reg2: u8 },
    Register(u8),
}

impl Operand {
    pub fn mode(&self) -> AddressingMode {
        match self {
            Operand::Immediate(_) => AddressingMode::Immediate,
            Operand::Direct(_) => AddressingMode::Direct,
            Operand::Matrix { .. } => AddressingMode::Matrix,
            Operand::Register(_) => AddressingMode::Register,
        }
    }

    /// Additional words this operand contributes on top of the
    /// instruction's first word: Register +1, Immediate +1, Direct +1,
    /// Matrix +2. The word-sharing rule for two Register operands is
    /// applied by the caller, not here.
    pub fn word_contribution(&self) -> u8 {
        match self {
            Operand::Matrix { .. } => 2,
            _ => 1,
        }
    }
}

static REGISTER_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^r(\d+)$").unwrap());
static MATRIX_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_]{0,29})((?:\[[^\[\]]*\])*)$").unwrap());
static BRACKET_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").unwrap());

/// Parse a single operand token (already comma-split and trimmed) into an
/// [`Operand`]. `line_number` is attached to any error raised.
pub fn parse_operand(token: &str, line_number: usize) -> Result<Operand, Error> {
    if let Some(rest) = token.strip_prefix('#') {
        let value: i64 = rest
            .parse()
            .map_err(|_| Error::InvalidOperand { operand: token.to_string(), line_number })?;
        if !(-512..=511).contains(&value) {
            return Err(Error::InvalidImmediateValue { value, line_number });
        }
        return Ok(Operand::Immediate(value as i16));
    }

    if let Some(captures) = REGISTER_PATTERN.captures(token) {
        return Ok(Operand::Register(parse_register_digits(&captures[1], token, line_number)?));
    }

    if token.contains('[') {
        return parse_matrix_access(token, line_number);
    }

    if crate::assembler::label::validate(token).is_ok() {
        return Ok(Operand::Direct(token.to_string()));
    }

    Err(Error::InvalidOperand { operand: token.to_string(), line_number })
}

/// A standalone `r<digits>` token is only a valid register name when its
/// digits are a single 0..7 index; anything else (`r8`, `r23`) is a
/// register-shaped token with an out-of-range index, not a label.
fn parse_register_digits(digits: &str, token: &str, line_number: usize) -> Result<u8, Error> {
    match digits.parse::<u32>() {
        Ok(n) if digits.len() == 1 && n <= 7 => Ok(n as u8),
        _ => Err(Error::InvalidRegister { text: token.to_string(), line_number }),
    }
}

/// Parse a `name[r<i>][r<j>]` matrix access, distinguishing the specific
/// ways the bracketed register pair can be malformed.
fn parse_matrix_access(token: &str, line_number: usize) -> Result<Operand, Error> {
    let Some(captures) = MATRIX_SHAPE.captures(token) else {
        return Err(Error::InvalidMatrixAccess { text: token.to_string(), line_number });
    };
    let symbol = captures[1].to_string();
    let brackets: Vec<&str> =
        BRACKET_GROUP.captures_iter(&captures[2]).map(|c| c.get(1).unwrap().as_str()).collect();

    match brackets.as_slice() {
        [] | [_] => Err(Error::MatrixMissingRegister { line_number }),
        [first, second] => Ok(Operand::Matrix {
            symbol,
            reg1: parse_matrix_register(first, line_number)?,
            reg2: parse_matrix_register(second, line_number)?,
        }),
        _ => Err(Error::InvalidMatrixAccess { text: token.to_string(), line_number }),
    }
}

/// Parse one bracketed matrix index. Must be `r<digit>` with digit 0..7;
/// an immediate-looking (`#`) index, a too-long register name, or any other
/// malformed content each get their own error kind.
fn parse_matrix_register(text: &str, line_number: usize) -> Result<u8, Error> {
    if text.starts_with('#') {
        return Err(Error::MatrixImmediateNotAllowed { line_number });
    }
    if text.len() > 4 {
        return Err(Error::MatrixRegisterTooLong { text: text.to_string(), line_number });
    }
    match text.strip_prefix('r').and_then(|digits| digits.parse::<u32>().ok()) {
        Some(n) if text.len() == 2 && n <= 7 => Ok(n as u8),
        _ => Err(Error::MatrixInvalidRegister { text: text.to_string(), line_number }),
    }
}
