//! Image header (6 bytes).

use super::HEADER_SIZE;

/// Image header - first 6 bytes of every image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// Code offset of the entry method's function record.
    pub entry_offset: u32,
    /// Number of descriptor records following the header.
    pub descriptor_count: u16,
}

impl Header {
    /// Decode header from the first 6 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        Self {
            entry_offset: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            descriptor_count: u16::from_le_bytes([bytes[4], bytes[5]]),
        }
    }

    /// Encode header to 6 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.entry_offset.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.descriptor_count.to_le_bytes());
        bytes
    }
}
