//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use cinder_bytecode::Register;

use crate::analysis::{AnalysisResults, FnAnalysis, Variable};
use crate::instantiation::Instantiation;
use crate::interner::{Interner, Symbol};
use crate::program::{MethodId, Type, TypeParamId};

impl Instantiation {
    pub(crate) fn ensure_bound(&self, param: TypeParamId) -> &Type {
        self.get(param).unwrap_or_else(|| {
            panic!(
                "Instantiation: unbound type parameter {param:?} \
                 (front end must substitute every generic it hands to codegen)"
            )
        })
    }

    pub(crate) fn ensure_arity(params: &[TypeParamId], arguments: &[Type]) {
        if params.len() != arguments.len() {
            panic!(
                "Instantiation: type argument count mismatch (expected {}, found {})",
                params.len(),
                arguments.len()
            );
        }
    }
}

impl FnAnalysis {
    pub(crate) fn ensure_register_index(index: usize) -> u8 {
        match u8::try_from(index) {
            Ok(index) if index < u8::MAX => index,
            _ => panic!(
                "FnAnalysis: too many registers ({}, limit {})",
                index + 1,
                u8::MAX
            ),
        }
    }

    pub(crate) fn ensure_register(&self, variable: Variable) -> Register {
        self.registers
            .get(&variable)
            .copied()
            .unwrap_or_else(|| panic!("FnAnalysis: {variable:?} has no register"))
    }
}

impl AnalysisResults {
    pub(crate) fn ensure_function(&self, method: MethodId) -> &FnAnalysis {
        self.get(method).unwrap_or_else(|| {
            panic!("AnalysisResults: no analysis for {method:?} (method has a body)")
        })
    }
}

impl Interner {
    pub(crate) fn ensure_symbol(name: Option<&str>, sym: Symbol) -> &str {
        name.unwrap_or_else(|| panic!("Interner: {sym:?} does not belong to this interner"))
    }
}

pub(crate) fn ensure_symbol_index(index: usize) -> u32 {
    u32::try_from(index).unwrap_or_else(|_| panic!("Interner: more than u32::MAX names"))
}
