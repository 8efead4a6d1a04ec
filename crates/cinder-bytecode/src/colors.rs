//! Terminal styling for the disassembler.

/// Escape sequences `dump` wraps around each kind of token.
///
/// Every field is empty when output is not a terminal, so formatting code
/// writes them unconditionally.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    /// `[header]`, `[descriptors]`, `[functions]`.
    pub heading: &'static str,
    /// Descriptor names and function offsets.
    pub name: &'static str,
    /// Instruction offsets and trailing markers.
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        heading: "\x1b[1m",
        name: "\x1b[34m",
        muted: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        heading: "",
        name: "",
        muted: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.reset.is_empty()
    }
}
