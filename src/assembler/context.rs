//! Per-file assembly state. Created fresh at the start of `assemble_file`
//! and dropped at its end — nothing here is process-wide (see the
//! Redesign Flags: the source keeps IC/DC/err_found as global externs,
//! this re-architects them as fields of a per-file value).

use crate::assembler::image::{DataImage, InstructionRecord};
use crate::assembler::symbol::SymbolTable;
use crate::assembler::word::IC_START;

pub struct Context {
    pub ic: u16,
    pub dc: u16,
    pub symbols: SymbolTable,
    pub data_image: DataImage,
    pub records: Vec<InstructionRecord>,
}

impl Context {
    pub fn new() -> Self {
        Context {
            ic: IC_START as u16,
            dc: 0,
            symbols: SymbolTable::new(),
            data_image: DataImage::new(),
            records: Vec::new(),
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
