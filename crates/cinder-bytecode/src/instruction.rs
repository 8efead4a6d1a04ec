//! Instruction set definitions.
//!
//! Every instruction starts with a one-byte opcode followed by its operands.
//! Registers are one byte, selectors and code/descriptor references are four.

use super::reader::Reader;
use super::{ImageError, Register, SelectorIdx};

/// Instruction opcodes.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Opcode {
    LoadI64 = 0x00,
    LoadStr = 0x01,
    Unit = 0x02,
    Copy = 0x03,
    New = 0x04,
    Call = 0x05,
    StaticCall = 0x06,
    Load = 0x07,
    Store = 0x08,
    TypeTest = 0x09,
    Jump = 0x0A,
    JumpIf = 0x0B,
    Return = 0x0C,
    ReturnUnit = 0x0D,
}

impl Opcode {
    pub fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0x00 => Self::LoadI64,
            0x01 => Self::LoadStr,
            0x02 => Self::Unit,
            0x03 => Self::Copy,
            0x04 => Self::New,
            0x05 => Self::Call,
            0x06 => Self::StaticCall,
            0x07 => Self::Load,
            0x08 => Self::Store,
            0x09 => Self::TypeTest,
            0x0A => Self::Jump,
            0x0B => Self::JumpIf,
            0x0C => Self::Return,
            0x0D => Self::ReturnUnit,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Self::LoadI64 => "load_i64",
            Self::LoadStr => "load_str",
            Self::Unit => "unit",
            Self::Copy => "copy",
            Self::New => "new",
            Self::Call => "call",
            Self::StaticCall => "static_call",
            Self::Load => "load",
            Self::Store => "store",
            Self::TypeTest => "type_test",
            Self::Jump => "jump",
            Self::JumpIf => "jump_if",
            Self::Return => "return",
            Self::ReturnUnit => "return_unit",
        }
    }
}

/// Decoded instruction with resolved operands.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Instruction {
    LoadI64 {
        dst: Register,
        value: u64,
    },
    LoadStr {
        dst: Register,
        value: String,
    },
    Unit {
        dst: Register,
    },
    Copy {
        dst: Register,
        src: Register,
    },
    New {
        dst: Register,
        descriptor: u32,
    },
    /// Dynamic dispatch through the receiver's descriptor. `args[0]` is the receiver.
    Call {
        dst: Register,
        selector: SelectorIdx,
        args: Vec<Register>,
    },
    StaticCall {
        dst: Register,
        target: u32,
        args: Vec<Register>,
    },
    Load {
        dst: Register,
        base: Register,
        selector: SelectorIdx,
    },
    /// Writes `src` into the field and puts the previous value in `dst`.
    Store {
        dst: Register,
        base: Register,
        selector: SelectorIdx,
        src: Register,
    },
    TypeTest {
        dst: Register,
        src: Register,
        descriptor: u32,
    },
    Jump {
        target: u32,
    },
    JumpIf {
        cond: Register,
        target: u32,
    },
    Return {
        src: Register,
    },
    ReturnUnit,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::LoadI64 { .. } => Opcode::LoadI64,
            Self::LoadStr { .. } => Opcode::LoadStr,
            Self::Unit { .. } => Opcode::Unit,
            Self::Copy { .. } => Opcode::Copy,
            Self::New { .. } => Opcode::New,
            Self::Call { .. } => Opcode::Call,
            Self::StaticCall { .. } => Opcode::StaticCall,
            Self::Load { .. } => Opcode::Load,
            Self::Store { .. } => Opcode::Store,
            Self::TypeTest { .. } => Opcode::TypeTest,
            Self::Jump { .. } => Opcode::Jump,
            Self::JumpIf { .. } => Opcode::JumpIf,
            Self::Return { .. } => Opcode::Return,
            Self::ReturnUnit => Opcode::ReturnUnit,
        }
    }

    /// Code offset this instruction transfers control to, if any.
    pub fn code_target(&self) -> Option<u32> {
        match self {
            Self::StaticCall { target, .. }
            | Self::Jump { target }
            | Self::JumpIf { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Descriptor index this instruction refers to, if any.
    pub fn descriptor(&self) -> Option<u32> {
        match self {
            Self::New { descriptor, .. } | Self::TypeTest { descriptor, .. } => Some(*descriptor),
            _ => None,
        }
    }

    /// Selector this instruction dispatches on, if any.
    pub fn selector(&self) -> Option<SelectorIdx> {
        match self {
            Self::Call { selector, .. }
            | Self::Load { selector, .. }
            | Self::Store { selector, .. } => Some(*selector),
            _ => None,
        }
    }

    pub(crate) fn decode(r: &mut Reader<'_>) -> Result<Self, ImageError> {
        let offset = r.pos();
        let byte = r.u8()?;
        let Some(opcode) = Opcode::from_u8(byte) else {
            return Err(ImageError::InvalidOpcode {
                offset,
                opcode: byte,
            });
        };

        let reg = |r: &mut Reader<'_>| r.u8().map(Register);
        let selector = |r: &mut Reader<'_>| r.u32().map(SelectorIdx);
        let args = |r: &mut Reader<'_>| -> Result<Vec<Register>, ImageError> {
            let argc = r.u8()?;
            (0..argc).map(|_| r.u8().map(Register)).collect()
        };

        Ok(match opcode {
            Opcode::LoadI64 => Self::LoadI64 {
                dst: reg(r)?,
                value: r.u64()?,
            },
            Opcode::LoadStr => Self::LoadStr {
                dst: reg(r)?,
                value: r.str()?,
            },
            Opcode::Unit => Self::Unit { dst: reg(r)? },
            Opcode::Copy => Self::Copy {
                dst: reg(r)?,
                src: reg(r)?,
            },
            Opcode::New => Self::New {
                dst: reg(r)?,
                descriptor: r.u32()?,
            },
            Opcode::Call => Self::Call {
                dst: reg(r)?,
                selector: selector(r)?,
                args: args(r)?,
            },
            Opcode::StaticCall => Self::StaticCall {
                dst: reg(r)?,
                target: r.u32()?,
                args: args(r)?,
            },
            Opcode::Load => Self::Load {
                dst: reg(r)?,
                base: reg(r)?,
                selector: selector(r)?,
            },
            Opcode::Store => Self::Store {
                dst: reg(r)?,
                base: reg(r)?,
                selector: selector(r)?,
                src: reg(r)?,
            },
            Opcode::TypeTest => Self::TypeTest {
                dst: reg(r)?,
                src: reg(r)?,
                descriptor: r.u32()?,
            },
            Opcode::Jump => Self::Jump { target: r.u32()? },
            Opcode::JumpIf => Self::JumpIf {
                cond: reg(r)?,
                target: r.u32()?,
            },
            Opcode::Return => Self::Return { src: reg(r)? },
            Opcode::ReturnUnit => Self::ReturnUnit,
        })
    }
}

fn join_regs(regs: &[Register]) -> String {
    regs.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl std::fmt::Display for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.opcode().mnemonic();
        match self {
            Self::LoadI64 { dst, value } => write!(f, "{m} {dst}, {value}"),
            Self::LoadStr { dst, value } => write!(f, "{m} {dst}, {value:?}"),
            Self::Unit { dst } => write!(f, "{m} {dst}"),
            Self::Copy { dst, src } => write!(f, "{m} {dst}, {src}"),
            Self::New { dst, descriptor } => write!(f, "{m} {dst}, D{descriptor}"),
            Self::Call {
                dst,
                selector,
                args,
            } => write!(f, "{m} {dst}, {selector}({})", join_regs(args)),
            Self::StaticCall { dst, target, args } => {
                write!(f, "{m} {dst}, {target:#06x}({})", join_regs(args))
            }
            Self::Load {
                dst,
                base,
                selector,
            } => write!(f, "{m} {dst}, {base}.{selector}"),
            Self::Store {
                dst,
                base,
                selector,
                src,
            } => write!(f, "{m} {dst}, {base}.{selector}, {src}"),
            Self::TypeTest {
                dst,
                src,
                descriptor,
            } => write!(f, "{m} {dst}, {src}, D{descriptor}"),
            Self::Jump { target } => write!(f, "{m} {target:#06x}"),
            Self::JumpIf { cond, target } => write!(f, "{m} {cond}, {target:#06x}"),
            Self::Return { src } => write!(f, "{m} {src}"),
            Self::ReturnUnit => write!(f, "{m}"),
        }
    }
}
