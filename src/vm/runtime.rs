use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::bytecode::{Instruction, Program};
use crate::runtime::error::RuntimeError;
use crate::runtime::{Arithmetic, Comparison};

use super::{Execution, VmError, VmGlobals, VmResult};

/// Resolves labels, then executes `program` from its first instruction.
pub(super) fn run_program(program: &Program, globals: VmGlobals) -> VmResult<Execution> {
    let labels = resolve_labels(program)?;
    let mut runtime = VmRuntime {
        labels,
        stack: Vec::new(),
        globals,
        output: Vec::new(),
    };
    runtime.execute_code(&program.instructions)?;
    debug!(
        printed = runtime.output.len(),
        variables = runtime.globals.len(),
        stack_depth = runtime.stack.len(),
        "vm finished"
    );
    Ok(Execution {
        output: runtime.output,
        globals: runtime.globals,
        stack_depth: runtime.stack.len(),
    })
}

/// Maps every label to the index of its `LABEL` marker.
fn resolve_labels(program: &Program) -> VmResult<FxHashMap<&str, usize>> {
    let mut labels = FxHashMap::default();
    for (index, instruction) in program.instructions.iter().enumerate() {
        if let Instruction::Label(label) = instruction
            && labels.insert(label.as_str(), index).is_some()
        {
            return Err(VmError::DuplicateLabel {
                label: label.clone(),
            });
        }
    }
    Ok(labels)
}

struct VmRuntime<'a> {
    labels: FxHashMap<&'a str, usize>,
    stack: Vec<i64>,
    globals: VmGlobals,
    output: Vec<i64>,
}

impl VmRuntime<'_> {
    fn execute_code(&mut self, code: &[Instruction]) -> VmResult<()> {
        let mut pc = 0;
        while let Some(instruction) = code.get(pc) {
            pc += 1;
            self.execute_instruction(instruction, &mut pc)?;
            trace!(%instruction, stack = ?self.stack, "executed");
        }
        Ok(())
    }

    fn execute_instruction(&mut self, instruction: &Instruction, pc: &mut usize) -> VmResult<()> {
        match instruction {
            Instruction::Push(value) => self.stack.push(*value),
            Instruction::Load(name) => {
                let value = self.globals.get(name).copied().ok_or_else(|| {
                    RuntimeError::UndefinedVariable {
                        name: name.to_string(),
                    }
                })?;
                self.stack.push(value);
            }
            Instruction::Store(name) => {
                let value = self.pop_stack()?;
                self.globals.insert(name.to_string(), value);
            }
            Instruction::Add => self.execute_arithmetic(Arithmetic::Add)?,
            Instruction::Sub => self.execute_arithmetic(Arithmetic::Sub)?,
            Instruction::Mul => self.execute_arithmetic(Arithmetic::Mul)?,
            Instruction::Div => self.execute_arithmetic(Arithmetic::Div)?,
            Instruction::Gt => self.execute_comparison(Comparison::Greater)?,
            Instruction::Lt => self.execute_comparison(Comparison::Less)?,
            Instruction::Eq => self.execute_comparison(Comparison::Equal)?,
            Instruction::Jz(label) => {
                if self.pop_stack()? == 0 {
                    *pc = self.jump_target(label)?;
                }
            }
            Instruction::Jmp(label) => *pc = self.jump_target(label)?,
            Instruction::Label(_) | Instruction::Nop => {}
            Instruction::Print => {
                let value = self.pop_stack()?;
                self.output.push(value);
            }
            Instruction::Pop => {
                self.pop_stack()?;
            }
        }
        Ok(())
    }

    fn execute_arithmetic(&mut self, arithmetic: Arithmetic) -> VmResult<()> {
        let (left, right) = self.pop_operands()?;
        self.stack.push(arithmetic.apply(left, right)?);
        Ok(())
    }

    fn execute_comparison(&mut self, comparison: Comparison) -> VmResult<()> {
        let (left, right) = self.pop_operands()?;
        self.stack.push(i64::from(comparison.apply(left, right)));
        Ok(())
    }

    /// Pops the right operand, then the left one.
    fn pop_operands(&mut self) -> VmResult<(i64, i64)> {
        let right = self.pop_stack()?;
        let left = self.pop_stack()?;
        Ok((left, right))
    }

    fn pop_stack(&mut self) -> VmResult<i64> {
        self.stack.pop().ok_or(VmError::StackUnderflow)
    }

    /// Execution resumes right after the `LABEL` marker.
    fn jump_target(&self, label: &str) -> VmResult<usize> {
        self.labels
            .get(label)
            .map(|index| index + 1)
            .ok_or_else(|| VmError::UndefinedLabel {
                label: label.to_string(),
            })
    }
}
