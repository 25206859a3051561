use anyhow::Result;
use rustc_hash::FxHashMap;

use crate::ast::Node;
use crate::backend::{Backend, PreparedBackend, render_output};
use crate::runtime::error::RuntimeError;

mod runtime;

/// Comparison results are stored as `1`/`0`, the same as on the VM stack.
pub type Globals = FxHashMap<String, i64>;
pub type InterpreterResult<T> = std::result::Result<T, RuntimeError>;

/// AST-walking backend that executes programs directly without compilation.
///
/// One flat environment holds every variable; printed values are collected
/// in execution order.
#[derive(Debug, Default)]
pub struct Interpreter {
    globals: Globals,
    output: Vec<i64>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all state, then evaluates `program` to completion.
    pub fn execute(&mut self, program: &Node) -> InterpreterResult<i64> {
        self.globals.clear();
        self.output.clear();
        self.eval(program)
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn output(&self) -> &[i64] {
        &self.output
    }
}

/// Prepared executable program for the tree-walking interpreter.
pub struct PreparedInterpreter {
    program: Node,
}

impl PreparedBackend for PreparedInterpreter {
    fn run(&self) -> Result<String> {
        let mut interpreter = Interpreter::new();
        interpreter.execute(&self.program)?;
        Ok(render_output(interpreter.output()))
    }
}

impl Backend for Interpreter {
    fn name(&self) -> &'static str {
        "interpreter"
    }

    fn prepare(&self, program: &Node) -> Result<Box<dyn PreparedBackend>> {
        Ok(Box::new(PreparedInterpreter {
            program: program.clone(),
        }))
    }
}
