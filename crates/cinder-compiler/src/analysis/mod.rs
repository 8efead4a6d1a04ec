//! Per-method analysis results consumed by the function emitter.

pub mod ir;


use std::collections::HashMap;

use cinder_bytecode::Register;

use crate::program::MethodId;

pub use ir::{BasicBlock, BlockId, MethodIr, Statement, Terminator, Variable};

/// Register assignment for one method body.
#[derive(Clone, Debug)]
pub struct FnAnalysis {
    pub ir: MethodIr,
    pub(crate) registers: HashMap<Variable, Register>,
}

impl FnAnalysis {
    /// Assign registers: parameters first, then variables in order of first appearance.
    pub fn new(ir: MethodIr) -> Self {
        let mut registers = HashMap::new();
        let mut assign = |v: Variable| {
            let next = registers.len();
            registers
                .entry(v)
                .or_insert_with(|| Register(Self::ensure_register_index(next)));
        };

        for &param in &ir.parameters {
            assign(param);
        }
        for block in &ir.blocks {
            for stmt in &block.statements {
                stmt.variables().into_iter().for_each(&mut assign);
            }
            if let Some(v) = block.terminator.variable() {
                assign(v);
            }
        }

        Self { ir, registers }
    }

    pub fn register(&self, variable: Variable) -> Register {
        self.ensure_register(variable)
    }

    pub fn register_count(&self) -> u8 {
        self.registers.len() as u8
    }

    /// Number of parameters, receiver included.
    pub fn arity(&self) -> u8 {
        self.ir.parameters.len() as u8
    }
}

/// Analysis for every method that has a body, keyed by declaration.
#[derive(Clone, Debug, Default)]
pub struct AnalysisResults {
    pub functions: HashMap<MethodId, FnAnalysis>,
}

impl AnalysisResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: MethodId, analysis: FnAnalysis) {
        self.functions.insert(method, analysis);
    }

    pub fn get(&self, method: MethodId) -> Option<&FnAnalysis> {
        self.functions.get(&method)
    }
}
