//! Lowering of one analysed method body into a function record.

use cinder_bytecode::{Opcode, Register};

use super::generator::{Generator, Label};
use super::invariants::ensure_u8;
use super::reachability::{Reachability, entity_item_of, static_callee};
use super::selector::{Selector, SelectorTable};
use crate::analysis::{BlockId, FnAnalysis, Statement, Terminator, Variable};
use crate::instantiation::MethodItem;
use crate::program::Program;

pub(super) struct FunctionEmitter<'a> {
    pub(super) generator: &'a mut Generator,
    pub(super) program: &'a Program,
    pub(super) reachability: &'a Reachability,
    pub(super) selectors: &'a SelectorTable,
}

impl FunctionEmitter<'_> {
    /// Emit the record for `item` at `label`.
    pub(super) fn emit(&mut self, item: &MethodItem, label: Label, analysis: &FnAnalysis) {
        self.generator.define_label(label);
        self.generator.u8(analysis.arity());
        self.generator.u8(analysis.register_count());
        let end = self.generator.create_label();
        self.generator.label(end);

        let blocks: Vec<Label> = analysis
            .ir
            .blocks
            .iter()
            .map(|_| self.generator.create_label())
            .collect();

        for (index, block) in analysis.ir.blocks.iter().enumerate() {
            self.generator.define_label(blocks[index]);
            for stmt in &block.statements {
                self.statement(item, analysis, stmt);
            }
            self.terminator(analysis, &blocks, index, &block.terminator);
        }

        self.generator.define_label(end);
    }

    fn statement(&mut self, item: &MethodItem, analysis: &FnAnalysis, stmt: &Statement) {
        let reg = |v: &Variable| analysis.register(*v);
        let inst = &item.instantiation;

        match stmt {
            Statement::Integer { output, value } => {
                self.generator.opcode(Opcode::LoadI64);
                self.generator.reg(reg(output));
                self.generator.u64(*value);
            }
            Statement::String { output, value } => {
                self.generator.opcode(Opcode::LoadStr);
                self.generator.reg(reg(output));
                self.generator.str(value);
            }
            Statement::Unit { output } => {
                self.generator.opcode(Opcode::Unit);
                self.generator.reg(reg(output));
            }
            Statement::Copy { output, input } => {
                self.generator.opcode(Opcode::Copy);
                self.generator.reg(reg(output));
                self.generator.reg(reg(input));
            }
            Statement::New { output, class } => {
                let class = entity_item_of(self.program, &inst.apply(class));
                self.generator.opcode(Opcode::New);
                self.generator.reg(reg(output));
                self.generator
                    .relocatable(self.reachability.entity(&class).descriptor);
            }
            Statement::Call {
                output,
                receiver,
                method,
                type_arguments,
                arguments,
            } => {
                let selector = Selector::method(*method, inst.apply_list(type_arguments));
                self.generator.opcode(Opcode::Call);
                self.generator.reg(reg(output));
                self.generator.selector(self.selectors.get(&selector));
                let args: Vec<Register> = std::iter::once(receiver)
                    .chain(arguments)
                    .map(reg)
                    .collect();
                self.arguments(&args);
            }
            Statement::StaticCall {
                output,
                entity,
                method,
                type_arguments,
                arguments,
            } => {
                let callee = static_callee(self.program, inst, entity, *method, type_arguments);
                let target = self.reachability.method_label(self.program, &callee);
                self.generator.opcode(Opcode::StaticCall);
                self.generator.reg(reg(output));
                self.generator.label(target);
                let args: Vec<Register> = arguments.iter().map(reg).collect();
                self.arguments(&args);
            }
            Statement::ReadField {
                output,
                base,
                field,
            } => {
                self.generator.opcode(Opcode::Load);
                self.generator.reg(reg(output));
                self.generator.reg(reg(base));
                self.generator
                    .selector(self.selectors.get(&Selector::field(*field)));
            }
            Statement::WriteField {
                output,
                base,
                field,
                input,
            } => {
                self.generator.opcode(Opcode::Store);
                self.generator.reg(reg(output));
                self.generator.reg(reg(base));
                self.generator
                    .selector(self.selectors.get(&Selector::field(*field)));
                self.generator.reg(reg(input));
            }
            Statement::TypeTest { output, input, ty } => {
                let target = entity_item_of(self.program, &inst.apply(ty));
                self.generator.opcode(Opcode::TypeTest);
                self.generator.reg(reg(output));
                self.generator.reg(reg(input));
                self.generator
                    .relocatable(self.reachability.entity(&target).descriptor);
            }
        }
    }

    fn arguments(&mut self, args: &[Register]) {
        self.generator.u8(ensure_u8(args.len(), "call arguments"));
        for &arg in args {
            self.generator.reg(arg);
        }
    }

    /// Jumps to the block laid out next are omitted.
    fn terminator(
        &mut self,
        analysis: &FnAnalysis,
        blocks: &[Label],
        index: usize,
        terminator: &Terminator,
    ) {
        let next = BlockId(index as u32 + 1);
        match terminator {
            Terminator::Return(Some(value)) => {
                self.generator.opcode(Opcode::Return);
                self.generator.reg(analysis.register(*value));
            }
            Terminator::Return(None) => self.generator.opcode(Opcode::ReturnUnit),
            Terminator::Jump(target) => {
                if *target != next {
                    self.jump(blocks, *target);
                }
            }
            Terminator::Branch {
                condition,
                if_true,
                if_false,
            } => {
                self.generator.opcode(Opcode::JumpIf);
                self.generator.reg(analysis.register(*condition));
                self.generator.label(blocks[if_true.0 as usize]);
                if *if_false != next {
                    self.jump(blocks, *if_false);
                }
            }
        }
    }

    fn jump(&mut self, blocks: &[Label], target: BlockId) {
        self.generator.opcode(Opcode::Jump);
        self.generator.label(blocks[target.0 as usize]);
    }
}
