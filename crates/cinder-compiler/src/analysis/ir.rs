//! Analysed method bodies: basic blocks of three-address statements.

use crate::interner::Symbol;
use crate::program::Type;

/// A local variable of one method body.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Variable(pub u32);

/// Index of a basic block within its method body.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct BlockId(pub u32);

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Statement {
    Integer {
        output: Variable,
        value: u64,
    },
    String {
        output: Variable,
        value: String,
    },
    Unit {
        output: Variable,
    },
    Copy {
        output: Variable,
        input: Variable,
    },
    New {
        output: Variable,
        class: Type,
    },
    /// Dynamically dispatched call on `receiver`.
    Call {
        output: Variable,
        receiver: Variable,
        method: Symbol,
        type_arguments: Vec<Type>,
        arguments: Vec<Variable>,
    },
    /// Call resolved at compile time through `entity`.
    StaticCall {
        output: Variable,
        entity: Type,
        method: Symbol,
        type_arguments: Vec<Type>,
        arguments: Vec<Variable>,
    },
    ReadField {
        output: Variable,
        base: Variable,
        field: Symbol,
    },
    WriteField {
        output: Variable,
        base: Variable,
        field: Symbol,
        input: Variable,
    },
    TypeTest {
        output: Variable,
        input: Variable,
        ty: Type,
    },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Terminator {
    Return(Option<Variable>),
    Jump(BlockId),
    Branch {
        condition: Variable,
        if_true: BlockId,
        if_false: BlockId,
    },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BasicBlock {
    pub statements: Vec<Statement>,
    pub terminator: Terminator,
}

/// A method body. Block 0 is the entry block.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MethodIr {
    pub parameters: Vec<Variable>,
    pub blocks: Vec<BasicBlock>,
}

impl Statement {
    /// Variables mentioned by this statement, output first.
    pub fn variables(&self) -> Vec<Variable> {
        match self {
            Self::Integer { output, .. }
            | Self::String { output, .. }
            | Self::Unit { output }
            | Self::New { output, .. } => vec![*output],
            Self::Copy { output, input } => vec![*output, *input],
            Self::Call {
                output,
                receiver,
                arguments,
                ..
            } => [*output, *receiver]
                .into_iter()
                .chain(arguments.iter().copied())
                .collect(),
            Self::StaticCall {
                output, arguments, ..
            } => std::iter::once(*output)
                .chain(arguments.iter().copied())
                .collect(),
            Self::ReadField { output, base, .. } => vec![*output, *base],
            Self::WriteField {
                output,
                base,
                input,
                ..
            } => vec![*output, *base, *input],
            Self::TypeTest { output, input, .. } => vec![*output, *input],
        }
    }
}

impl Terminator {
    pub fn variable(&self) -> Option<Variable> {
        match self {
            Self::Return(value) => *value,
            Self::Jump(_) => None,
            Self::Branch { condition, .. } => Some(*condition),
        }
    }

    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Self::Return(_) => Vec::new(),
            Self::Jump(target) => vec![*target],
            Self::Branch {
                if_true, if_false, ..
            } => vec![*if_true, *if_false],
        }
    }
}
