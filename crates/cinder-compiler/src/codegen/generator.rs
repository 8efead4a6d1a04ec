//! Append-only byte buffer with deferred label and relocatable patching.
//!
//! Labels resolve to byte offsets in the buffer. Relocatables resolve to the
//! value passed to [`Generator::define_relocatable`] (a descriptor index).
//! References to handles that are not defined yet are recorded as fixups and
//! patched by [`Generator::finish`].

use cinder_bytecode::{Opcode, Register, SelectorIdx};

/// A code offset that may be referenced before it is known.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Label(pub(super) u32);

/// A data slot (descriptor) that may be referenced before it is known.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Relocatable(pub(super) u32);

#[derive(Clone, Copy, Debug)]
enum Target {
    Label(Label),
    Relocatable(Relocatable),
}

/// A pending `u32` write at `at`.
#[derive(Clone, Copy, Debug)]
struct Fixup {
    at: usize,
    target: Target,
}

#[derive(Debug, Default)]
pub struct Generator {
    buf: Vec<u8>,
    pub(super) labels: Vec<Option<u32>>,
    pub(super) relocatables: Vec<Option<u32>>,
    fixups: Vec<Fixup>,
}

impl Generator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    pub fn create_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() as u32 - 1)
    }

    pub fn create_relocatable(&mut self) -> Relocatable {
        self.relocatables.push(None);
        Relocatable(self.relocatables.len() as u32 - 1)
    }

    /// Bind `label` to the current position.
    pub fn define_label(&mut self, label: Label) {
        let offset = Self::ensure_offset(self.position());
        self.ensure_label_undefined(label);
        self.labels[label.0 as usize] = Some(offset);
    }

    /// Bind `relocatable` to `value`.
    pub fn define_relocatable(&mut self, relocatable: Relocatable, value: u32) {
        self.ensure_relocatable_undefined(relocatable);
        self.relocatables[relocatable.0 as usize] = Some(value);
    }

    pub fn label_value(&self, label: Label) -> Option<u32> {
        self.labels[label.0 as usize]
    }

    pub fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    pub fn u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    pub fn u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a `u16`-length-prefixed UTF-8 string.
    pub fn str(&mut self, value: &str) {
        self.u16(Self::ensure_str_len(value));
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn opcode(&mut self, opcode: Opcode) {
        self.u8(opcode as u8);
    }

    pub fn reg(&mut self, register: Register) {
        self.u8(register.0);
    }

    pub fn selector(&mut self, selector: SelectorIdx) {
        self.u32(selector.0);
    }

    /// Write a reference to `label`'s offset.
    pub fn label(&mut self, label: Label) {
        match self.labels[label.0 as usize] {
            Some(offset) => self.u32(offset),
            None => self.fixup(Target::Label(label)),
        }
    }

    /// Write a reference to `relocatable`'s value.
    pub fn relocatable(&mut self, relocatable: Relocatable) {
        match self.relocatables[relocatable.0 as usize] {
            Some(value) => self.u32(value),
            None => self.fixup(Target::Relocatable(relocatable)),
        }
    }

    fn fixup(&mut self, target: Target) {
        self.fixups.push(Fixup {
            at: self.position(),
            target,
        });
        self.u32(0);
    }

    /// Patch every pending reference and return the finished buffer.
    ///
    /// # Panics
    /// Panics if a referenced label or relocatable was never defined, or if
    /// the buffer outgrew the `u32` offset space.
    pub fn finish(mut self) -> Vec<u8> {
        Self::ensure_offset(self.buf.len());

        for fixup in std::mem::take(&mut self.fixups) {
            let value = match fixup.target {
                Target::Label(label) => self.ensure_label_defined(label),
                Target::Relocatable(r) => self.ensure_relocatable_defined(r),
            };
            self.buf[fixup.at..fixup.at + 4].copy_from_slice(&value.to_le_bytes());
        }

        self.buf
    }
}
