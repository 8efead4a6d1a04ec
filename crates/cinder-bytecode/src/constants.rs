/// Size of the image header in bytes.
pub const HEADER_SIZE: usize = 6;

/// Size of a function record header: arity (u8), register count (u8), end offset (u32).
pub const FUNCTION_HEADER_SIZE: usize = 6;

/// Code target written for methods without a body and for absent finalisers.
pub const NO_TARGET: u32 = u32::MAX;
