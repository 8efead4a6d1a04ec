//! Descriptor records: per-entity runtime type and dispatch metadata.

use super::reader::Reader;
use super::{ImageError, NO_TARGET, SelectorIdx};

/// Entity kind byte stored in each descriptor.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum EntityKindTag {
    Class = 0,
    Interface = 1,
    Primitive = 2,
}

impl EntityKindTag {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Class),
            1 => Some(Self::Interface),
            2 => Some(Self::Primitive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Primitive => "primitive",
        }
    }
}

/// One dispatch table entry: the selector and the code offset implementing it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MethodSlot {
    pub selector: SelectorIdx,
    /// Code offset, or `None` for methods the interpreter provides natively.
    pub target: Option<u32>,
}

/// Decoded descriptor record.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DescriptorRecord {
    /// Byte offset of the record within the image.
    pub offset: usize,
    pub name: String,
    pub kind: EntityKindTag,
    /// Size of the program-wide selector namespace.
    pub selector_count: u32,
    pub methods: Vec<MethodSlot>,
    pub fields: Vec<SelectorIdx>,
    /// Descriptor indices of declared supertypes.
    pub supertypes: Vec<u32>,
    pub finaliser: Option<u32>,
}

fn target(raw: u32) -> Option<u32> {
    (raw != NO_TARGET).then_some(raw)
}

impl DescriptorRecord {
    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ImageError> {
        let offset = r.pos();
        let name = r.str()?;

        let kind_offset = r.pos();
        let kind_byte = r.u8()?;
        let kind = EntityKindTag::from_u8(kind_byte).ok_or(ImageError::InvalidEntityKind {
            offset: kind_offset,
            kind: kind_byte,
        })?;

        let selector_count = r.u32()?;

        let method_count = r.u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            let selector = SelectorIdx(r.u32()?);
            methods.push(MethodSlot {
                selector,
                target: target(r.u32()?),
            });
        }

        let field_count = r.u16()?;
        let fields = (0..field_count)
            .map(|_| r.u32().map(SelectorIdx))
            .collect::<Result<Vec<_>, _>>()?;

        let supertype_count = r.u16()?;
        let supertypes = (0..supertype_count)
            .map(|_| r.u32())
            .collect::<Result<Vec<_>, _>>()?;

        let finaliser = target(r.u32()?);

        Ok(Self {
            offset,
            name,
            kind,
            selector_count,
            methods,
            fields,
            supertypes,
            finaliser,
        })
    }

    /// Code offset implementing `selector`, if this entity answers to it.
    pub fn lookup(&self, selector: SelectorIdx) -> Option<MethodSlot> {
        self.methods.iter().copied().find(|m| m.selector == selector)
    }
}
