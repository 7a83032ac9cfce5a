//! The reserved-word table shared by label validation, macro-name
//! validation, and instruction/directive lookup.

use std::collections::HashSet;
use std::sync::LazyLock;

pub static RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "mov", "cmp", "add", "sub", "lea", "clr", "not", "inc", "dec", "jmp", "bne", "jsr", "red",
        "prn", "rts", "stop", "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", ".data", ".string",
        ".mat", ".entry", ".extern", "mcro", "mcroend",
    ]
    .into_iter()
    .collect()
});

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_mnemonics_and_registers() {
        assert!(is_reserved("mov"));
        assert!(is_reserved("r7"));
        assert!(is_reserved(".extern"));
        assert!(!is_reserved("r8"));
        assert!(!is_reserved("LOOP"));
    }
}
