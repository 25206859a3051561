use anyhow::Result;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ast::Node;
use crate::backend::{Backend, PreparedBackend, render_output};
use crate::bytecode::{Program, compile};
use crate::runtime::error::RuntimeError;

mod runtime;

pub type VmGlobals = FxHashMap<String, i64>;
pub type VmResult<T> = std::result::Result<T, VmError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("Stack underflow")]
    StackUnderflow,
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error("Undefined label '{label}'")]
    UndefinedLabel { label: String },
    #[error("Duplicate label '{label}'")]
    DuplicateLabel { label: String },
}

/// Final state of one VM run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    pub output: Vec<i64>,
    pub globals: VmGlobals,
    /// Values left on the operand stack; zero for compiled programs.
    pub stack_depth: usize,
}

/// Stack-machine backend. `prepare` compiles the tree once; every run starts
/// from an empty stack and environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct VM;

pub struct PreparedVM {
    program: Program,
}

impl VM {
    pub fn new() -> Self {
        Self
    }

    /// Runs `program` to completion against `globals`, which may already hold
    /// bindings.
    pub fn execute(program: &Program, globals: VmGlobals) -> VmResult<Execution> {
        runtime::run_program(program, globals)
    }
}

impl Backend for VM {
    fn name(&self) -> &'static str {
        "vm"
    }

    fn prepare(&self, program: &Node) -> Result<Box<dyn PreparedBackend>> {
        Ok(Box::new(PreparedVM {
            program: compile(program)?,
        }))
    }
}

impl PreparedBackend for PreparedVM {
    fn run(&self) -> Result<String> {
        let execution = VM::execute(&self.program, VmGlobals::default())?;
        Ok(render_output(&execution.output))
    }
}

#[cfg(test)]
mod tests;
