//! Decoded view of a complete bytecode image.

use std::io;
use std::path::Path;

use super::descriptor::DescriptorRecord;
use super::header::Header;
use super::instruction::Instruction;
use super::reader::Reader;
use super::{HEADER_SIZE, SelectorIdx};

/// Image load error.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image too small: {0} bytes (minimum {HEADER_SIZE})")]
    TooSmall(usize),
    #[error("unexpected end of image at offset {offset:#x}")]
    UnexpectedEof { offset: usize },
    #[error("invalid opcode {opcode:#04x} at offset {offset:#x}")]
    InvalidOpcode { offset: usize, opcode: u8 },
    #[error("invalid entity kind {kind} at offset {offset:#x}")]
    InvalidEntityKind { offset: usize, kind: u8 },
    #[error("invalid UTF-8 string at offset {offset:#x}")]
    InvalidUtf8 { offset: usize },
    #[error("function at {offset:#x} ends at {end:#x}, outside its bounds")]
    FunctionOutOfBounds { offset: usize, end: u32 },
    #[error("entry offset {0:#x} is not the start of a function")]
    EntryNotAFunction(u32),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A function record with its decoded instruction stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionRecord {
    /// Byte offset of the record (the value code references resolve to).
    pub offset: u32,
    pub arity: u8,
    pub register_count: u8,
    /// Offset just past the last instruction.
    pub end: u32,
    /// Instructions paired with their byte offsets.
    pub instructions: Vec<(u32, Instruction)>,
}

/// A fully decoded bytecode image.
#[derive(Clone, Debug)]
pub struct Image {
    header: Header,
    descriptors: Vec<DescriptorRecord>,
    functions: Vec<FunctionRecord>,
}

impl Image {
    /// Decode an image from bytes.
    pub fn load(bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.len() < HEADER_SIZE {
            return Err(ImageError::TooSmall(bytes.len()));
        }

        let header = Header::from_bytes(bytes);
        let mut r = Reader::new(bytes, HEADER_SIZE);

        let descriptors = (0..header.descriptor_count)
            .map(|_| DescriptorRecord::decode(&mut r))
            .collect::<Result<Vec<_>, _>>()?;

        let mut functions = Vec::new();
        while !r.is_at_end() {
            functions.push(decode_function(bytes, &mut r)?);
        }

        if !functions.iter().any(|f| f.offset == header.entry_offset) {
            return Err(ImageError::EntryNotAFunction(header.entry_offset));
        }

        Ok(Self {
            header,
            descriptors,
            functions,
        })
    }

    /// Load an image from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn descriptors(&self) -> &[DescriptorRecord] {
        &self.descriptors
    }

    pub fn descriptor(&self, index: u32) -> Option<&DescriptorRecord> {
        self.descriptors.get(index as usize)
    }

    /// Find a descriptor by its display name.
    pub fn descriptor_named(&self, name: &str) -> Option<(u32, &DescriptorRecord)> {
        self.descriptors
            .iter()
            .enumerate()
            .find(|(_, d)| d.name == name)
            .map(|(i, d)| (i as u32, d))
    }

    pub fn functions(&self) -> &[FunctionRecord] {
        &self.functions
    }

    /// Function whose record starts at `offset`.
    pub fn function_at(&self, offset: u32) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.offset == offset)
    }

    pub fn entry(&self) -> &FunctionRecord {
        self.function_at(self.header.entry_offset)
            .expect("entry function validated at load")
    }

    /// Every selector referenced by descriptors or instructions.
    pub fn referenced_selectors(&self) -> Vec<SelectorIdx> {
        let from_descriptors = self.descriptors.iter().flat_map(|d| {
            d.methods
                .iter()
                .map(|m| m.selector)
                .chain(d.fields.iter().copied())
        });
        let from_code = self
            .functions
            .iter()
            .flat_map(|f| f.instructions.iter().filter_map(|(_, i)| i.selector()));
        from_descriptors.chain(from_code).collect()
    }
}

fn decode_function(bytes: &[u8], r: &mut Reader<'_>) -> Result<FunctionRecord, ImageError> {
    let start = r.pos();
    let arity = r.u8()?;
    let register_count = r.u8()?;
    let end = r.u32()?;

    if (end as usize) < r.pos() || end as usize > bytes.len() {
        return Err(ImageError::FunctionOutOfBounds { offset: start, end });
    }

    let mut instructions = Vec::new();
    while r.pos() < end as usize {
        let offset = r.pos() as u32;
        instructions.push((offset, Instruction::decode(r)?));
    }
    if r.pos() != end as usize {
        return Err(ImageError::FunctionOutOfBounds { offset: start, end });
    }

    Ok(FunctionRecord {
        offset: start as u32,
        arity,
        register_count,
        end,
        instructions,
    })
}
