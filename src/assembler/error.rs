//! The closed error-kind vocabulary reported by the assembler.
//!
//! Every kind named in the specification's error taxonomy has exactly one
//! variant here. Each per-line variant carries the `line_number` it was
//! raised at so the caller can print `file at line N: <kind text>`; the
//! `Display` impl produces only the kind text, never the file/line prefix,
//! since the enclosing file stem isn't known to the error itself.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // --- Label / syntax ---
    #[error("invalid label \"{name}\"")]
    InvalidLabel { name: String, line_number: usize },
    #[error("label syntax error")]
    LabelSyntax { line_number: usize },
    #[error("duplicate label \"{name}\"")]
    DuplicateLabel { name: String, line_number: usize },
    #[error("\"{word}\" is a reserved word and cannot be used as a label")]
    ReservedWord { word: String, line_number: usize },
    #[error("syntax error")]
    Syntax { line_number: usize },
    #[error("line exceeds the maximum of 80 significant characters")]
    LineTooLong { line_number: usize },
    #[error("missing required whitespace")]
    MissingWhitespace { line_number: usize },
    #[error("missing comma between operands")]
    MissingComma { line_number: usize },

    // --- Instruction / directive ---
    #[error("unknown instruction \"{mnemonic}\"")]
    UnknownInstruction { mnemonic: String, line_number: usize },
    #[error("unknown directive \"{name}\"")]
    InvalidDirective { name: String, line_number: usize },
    #[error("too many operands")]
    TooManyOperands { line_number: usize },
    #[error("too few operands")]
    TooFewOperands { line_number: usize },
    #[error("invalid operand \"{operand}\"")]
    InvalidOperand { operand: String, line_number: usize },

    // --- Immediate / register ---
    #[error("immediate value {value} out of range (-512..511)")]
    InvalidImmediateValue { value: i64, line_number: usize },
    #[error("data value {value} out of range (-512..511)")]
    DataOutOfRange { value: i64, line_number: usize },
    #[error("invalid register \"{text}\"")]
    InvalidRegister { text: String, line_number: usize },
    #[error("addressing mode not permitted for this opcode")]
    InvalidAddressingMode { line_number: usize },
    #[error("source addressing mode not permitted for this opcode")]
    InvalidSourceAddressing { line_number: usize },
    #[error("target addressing mode not permitted for this opcode")]
    InvalidTargetAddressing { line_number: usize },

    // --- Matrix ---
    #[error("invalid matrix operand \"{text}\"")]
    InvalidMatrix { text: String, line_number: usize },
    #[error("invalid matrix access \"{text}\"")]
    InvalidMatrixAccess { text: String, line_number: usize },
    #[error("matrix operand is missing a register index")]
    MatrixMissingRegister { line_number: usize },
    #[error("invalid register \"{text}\" in matrix operand")]
    MatrixInvalidRegister { text: String, line_number: usize },
    #[error("register name \"{text}\" in matrix operand is too long")]
    MatrixRegisterTooLong { text: String, line_number: usize },
    #[error("immediate values are not allowed in matrix operands")]
    MatrixImmediateNotAllowed { line_number: usize },
    #[error("invalid matrix dimensions")]
    InvalidMatrixDimensions { line_number: usize },
    #[error("too many values for matrix dimensions")]
    MatrixTooManyValues { line_number: usize },

    // --- String ---
    #[error("string exceeds the maximum supported length")]
    StringTooLong { line_number: usize },
    #[error("string literal is missing quotes")]
    StringMissingQuotes { line_number: usize },
    #[error("unclosed string literal")]
    StringUnclosed { line_number: usize },
    #[error("string contains a non-printable character")]
    StringInvalidCharacter { line_number: usize },

    // --- Symbol / entry ---
    #[error("undefined symbol \"{name}\"")]
    UndefinedSymbol { name: String, line_number: usize },
    #[error("entry symbol \"{name}\" is never defined")]
    EntryNotDefined { name: String, line_number: usize },
    #[error("a label is not allowed on a .extern directive")]
    LabelOnExtern { line_number: usize },
    #[error("symbol \"{name}\" is both external and declared as entry")]
    ExternalConflict { name: String, line_number: usize },

    // --- Macro ---
    #[error("\"{name}\" is a reserved word and cannot be used as a macro name")]
    MacroReservedWord { name: String, line_number: usize },
    #[error("unexpected extra text on a macro directive line")]
    MacroExtraText { line_number: usize },
    #[error("macro definition is missing a matching mcroend")]
    MacroMissingEnd { line_number: usize },
    #[error("mcro directive is missing a macro name")]
    MacroMissingName { line_number: usize },

    // --- System ---
    #[error("memory allocation failed")]
    MemoryAllocationFailed,
    #[error("data image overflow")]
    DataImageOverflow { line_number: usize },
    #[error("instruction image overflow")]
    InstructionImageOverflow { line_number: usize },
    #[error("address {address} is out of bounds")]
    AddressOutOfBounds { address: i64, line_number: usize },

    // --- General ---
    #[error("{message}")]
    General { message: String },

    #[error("failed to read or write file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// The source line this error was raised at, when one exists.
    pub fn line_number(&self) -> Option<usize> {
        use Error::*;
        match self {
            InvalidLabel { line_number, .. }
            | LabelSyntax { line_number }
            | DuplicateLabel { line_number, .. }
            | ReservedWord { line_number, .. }
            | Syntax { line_number }
            | LineTooLong { line_number }
            | MissingWhitespace { line_number }
            | MissingComma { line_number }
            | UnknownInstruction { line_number, .. }
            | InvalidDirective { line_number, .. }
            | TooManyOperands { line_number }
            | TooFewOperands { line_number }
            | InvalidOperand { line_number, .. }
            | InvalidImmediateValue { line_number, .. }
            | DataOutOfRange { line_number, .. }
            | InvalidRegister { line_number, .. }
            | InvalidAddressingMode { line_number }
            | InvalidSourceAddressing { line_number }
            | InvalidTargetAddressing { line_number }
            | InvalidMatrix { line_number, .. }
            | InvalidMatrixAccess { line_number, .. }
            | MatrixMissingRegister { line_number }
            | MatrixInvalidRegister { line_number, .. }
            | MatrixRegisterTooLong { line_number, .. }
            | MatrixImmediateNotAllowed { line_number }
            | InvalidMatrixDimensions { line_number }
            | MatrixTooManyValues { line_number }
            | StringTooLong { line_number }
            | StringMissingQuotes { line_number }
            | StringUnclosed { line_number }
            | StringInvalidCharacter { line_number }
            | UndefinedSymbol { line_number, .. }
            | EntryNotDefined { line_number, .. }
            | LabelOnExtern { line_number }
            | ExternalConflict { line_number, .. }
            | MacroReservedWord { line_number, .. }
            | MacroExtraText { line_number }
            | MacroMissingEnd { line_number }
            | MacroMissingName { line_number }
            | DataImageOverflow { line_number }
            | InstructionImageOverflow { line_number }
            | AddressOutOfBounds { line_number, .. } => Some(*line_number),
            MemoryAllocationFailed | General { .. } | Io { .. } => None,
        }
    }
}
