//! Bytecode image format for the Cinder interpreter.
//!
//! This crate contains:
//! - Image layout definitions (header, descriptor records, function records)
//! - The instruction set (opcodes and operand encoding)
//! - An image loader and a human-readable disassembler

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod colors;
mod constants;
mod descriptor;
mod dump;
mod header;
mod image;
mod instruction;
mod reader;


pub use colors::Colors;
pub use constants::{FUNCTION_HEADER_SIZE, HEADER_SIZE, NO_TARGET};
pub use descriptor::{DescriptorRecord, EntityKindTag, MethodSlot};
pub use dump::dump;
pub use header::Header;
pub use image::{FunctionRecord, Image, ImageError};
pub use instruction::{Instruction, Opcode};

/// Interpreter register index within a call frame.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct Register(pub u8);

/// Index into the program-wide selector namespace.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(transparent)]
pub struct SelectorIdx(pub u32);

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl std::fmt::Display for SelectorIdx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
