//! End-to-end scenarios exercised against the real filesystem through
//! `assembler::assemble`, each in its own temp directory so `.as`/`.am`/
//! `.ob`/`.ent`/`.ext` files never collide between tests.

use std::fs;

use asm16::assembler::{self, emitter, Outcome};

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Workspace { dir: tempfile::tempdir().unwrap() }
    }

    fn stem(&self, name: &str) -> String {
        self.dir.path().join(name).to_str().unwrap().to_string()
    }

    fn read(&self, name: &str, extension: &str) -> String {
        fs::read_to_string(self.dir.path().join(format!("{name}.{extension}"))).unwrap()
    }

    fn exists(&self, name: &str, extension: &str) -> bool {
        self.dir.path().join(format!("{name}.{extension}")).exists()
    }
}

#[test]
fn empty_but_valid_program() {
    let ws = Workspace::new();
    let stem = ws.stem("prog");
    let outcome = assembler::assemble(&stem, "main: stop");
    assert!(matches!(outcome, Outcome::Success));

    let object = ws.read("prog", "ob");
    let mut lines = object.lines();
    assert_eq!(lines.next().unwrap(), "b a"); // inst_count=1, data_count=0
    let first_word = emitter::encode_word(asm16::assembler::word::Word::from_bits(15 << 6));
    let expected_address = emitter::encode_address(100);
    assert_eq!(lines.next().unwrap(), format!("{expected_address} {first_word}"));
    assert!(lines.next().is_none());

    assert!(!ws.exists("prog", "ent"));
    assert!(!ws.exists("prog", "ext"));
}

#[test]
fn immediate_into_register() {
    let ws = Workspace::new();
    let stem = ws.stem("prog");
    let outcome = assembler::assemble(&stem, "mov #-1, r3");
    assert!(matches!(outcome, Outcome::Success));

    let object = ws.read("prog", "ob");
    let lines: Vec<_> = object.lines().collect();
    assert_eq!(lines[0], "c a"); // inst_count=2, data_count=0
    let first_word = emitter::encode_word(asm16::assembler::word::Word::from_bits((3u16) << 2));
    assert_eq!(lines[1], format!("{} {}", emitter::encode_address(100), first_word));
    let immediate_word =
        emitter::encode_word(asm16::assembler::word::Word::from_bits((0xFFu16) << 2));
    assert_eq!(lines[2], format!("{} {}", emitter::encode_address(101), immediate_word));
}

#[test]
fn two_registers_share_a_word() {
    let ws = Workspace::new();
    let stem = ws.stem("prog");
    let outcome = assembler::assemble(&stem, "add r1, r2");
    assert!(matches!(outcome, Outcome::Success));

    let object = ws.read("prog", "ob");
    let lines: Vec<_> = object.lines().collect();
    assert_eq!(lines.len(), 3); // header + 2 words
    let shared_word = emitter::encode_word(asm16::assembler::word::Word::from_bits((1u16 << 6) | (2u16 << 2)));
    assert_eq!(lines[2], format!("{} {}", emitter::encode_address(101), shared_word));
}

#[test]
fn external_reference() {
    let ws = Workspace::new();
    let stem = ws.stem("prog");
    let outcome = assembler::assemble(&stem, ".extern FOO\njmp FOO");
    assert!(matches!(outcome, Outcome::Success));

    let object = ws.read("prog", "ob");
    let lines: Vec<_> = object.lines().collect();
    assert_eq!(lines.len(), 3);
    let external_word = emitter::encode_word(asm16::assembler::word::Word::from_bits(0b01));
    assert_eq!(lines[2], format!("{} {}", emitter::encode_address(101), external_word));

    assert!(!ws.exists("prog", "ent"));
    let external_text = ws.read("prog", "ext");
    assert_eq!(external_text.trim_end(), format!("FOO {}", emitter::encode_address(101)));
}

#[test]
fn matrix_operand() {
    let ws = Workspace::new();
    let stem = ws.stem("prog");
    let source = "M: .mat [2][2] 1,2,3,4\nmov M[r1][r2], r3";
    let outcome = assembler::assemble(&stem, source);
    assert!(matches!(outcome, Outcome::Success));

    let object = ws.read("prog", "ob");
    let lines: Vec<_> = object.lines().collect();
    // header + 4 instruction words (first, matrix address, matrix registers,
    // target register) + 4 data words. Matrix contributes 2 words, the
    // Register target contributes 1 more on top of that (word-sharing only
    // applies when BOTH operands are Register).
    assert_eq!(lines.len(), 1 + 4 + 4);
    assert_eq!(lines[0], "ba ba"); // inst_count=4, data_count=4

    let matrix_register_word =
        emitter::encode_word(asm16::assembler::word::Word::from_bits((1u16 << 6) | (2u16 << 2)));
    assert_eq!(lines[3], format!("{} {}", emitter::encode_address(102), matrix_register_word));

    let target_register_word =
        emitter::encode_word(asm16::assembler::word::Word::from_bits(3u16 << 2));
    assert_eq!(lines[4], format!("{} {}", emitter::encode_address(103), target_register_word));

    // M is a data symbol relocated to ICF (100 + 4 = 104).
    let data_lines = &lines[5..];
    assert_eq!(data_lines.len(), 4);
    assert_eq!(data_lines[0], format!("{} {}", emitter::encode_address(104), emitter::encode_word(asm16::assembler::word::Word::new(1).unwrap())));
}

#[test]
fn entry_symbol() {
    let ws = Workspace::new();
    let stem = ws.stem("prog");
    let outcome = assembler::assemble(&stem, "X: .data 5\n.entry X");
    assert!(matches!(outcome, Outcome::Success));

    assert!(!ws.exists("prog", "ext"));
    let entries = ws.read("prog", "ent");
    // ICF = 100 (no instructions); X is the only data symbol, relocated to ICF.
    assert_eq!(entries.trim_end(), format!("X {}", emitter::encode_address(100)));
}

#[test]
fn macro_expansion_substitutes_the_body_in_place() {
    let ws = Workspace::new();
    let stem = ws.stem("prog");
    let source = "mcro DOUBLE\nadd r1, r2\nmcroend\nDOUBLE\nrts";
    let outcome = assembler::assemble(&stem, source);
    assert!(matches!(outcome, Outcome::Success));

    let expanded = ws.read("prog", "am");
    assert_eq!(expanded, "add r1, r2\nrts");
}

#[test]
fn undefined_symbol_suppresses_all_output_files() {
    let ws = Workspace::new();
    let stem = ws.stem("prog");
    let outcome = assembler::assemble(&stem, "jmp NOWHERE");
    assert!(matches!(outcome, Outcome::SecondPassErrors(_)));
    assert!(!ws.exists("prog", "ob"));
    assert!(!ws.exists("prog", "ent"));
    assert!(!ws.exists("prog", "ext"));
}

#[test]
fn missing_source_file_is_reported_distinctly() {
    let ws = Workspace::new();
    let stem = ws.stem("does_not_exist");
    let outcome = assembler::assemble_file(&stem);
    assert!(matches!(outcome, Outcome::FileNotFound));
}
