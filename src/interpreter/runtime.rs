use tracing::{debug, trace};

use crate::ast::{BinaryOperator, Node};
use crate::runtime::error::RuntimeError;
use crate::runtime::{Arithmetic, Comparison};

use super::{Interpreter, InterpreterResult};

/// Result of `if` without a taken branch, of an empty block and of a loop
/// that never ran.
const NEUTRAL: i64 = 0;

impl Interpreter {
    /// Evaluates `node` against this interpreter's environment.
    ///
    /// Recursion depth equals the nesting depth of the tree.
    pub fn eval(&mut self, node: &Node) -> InterpreterResult<i64> {
        match node {
            Node::Literal(value) => Ok(*value),
            Node::Identifier(name) => {
                self.globals
                    .get(name)
                    .copied()
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.to_string(),
                    })
            }
            Node::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                eval_binary(*op, left, right)
            }
            Node::Assignment { name, value } => {
                let value = self.eval(value)?;
                trace!(name = name.as_str(), value, "assigned");
                self.globals.insert(name.to_string(), value);
                Ok(value)
            }
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition = self.eval(condition)?;
                if condition != 0 {
                    trace!("condition true, executing then-branch");
                    self.eval(then_branch)
                } else if let Some(else_branch) = else_branch {
                    trace!("condition false, executing else-branch");
                    self.eval(else_branch)
                } else {
                    Ok(NEUTRAL)
                }
            }
            Node::While { condition, body } => {
                let mut last = NEUTRAL;
                let mut iterations = 0usize;
                while self.eval(condition)? != 0 {
                    last = self.eval(body)?;
                    iterations += 1;
                }
                debug!(iterations, "exited while loop");
                Ok(last)
            }
            Node::Block(statements) => {
                let mut last = NEUTRAL;
                for statement in statements {
                    last = self.eval(statement)?;
                }
                Ok(last)
            }
            Node::Print(expr) => {
                let value = self.eval(expr)?;
                trace!(value, "print");
                self.output.push(value);
                Ok(value)
            }
        }
    }
}

/// Applies `op` to already evaluated operands.
///
/// Comparisons yield `1` or `0`, matching `GT`/`LT`/`EQ` on the VM.
fn eval_binary(op: BinaryOperator, left: i64, right: i64) -> InterpreterResult<i64> {
    if let Some(arithmetic) = Arithmetic::from_operator(op) {
        return arithmetic.apply(left, right);
    }
    if let Some(comparison) = Comparison::from_operator(op) {
        return Ok(i64::from(comparison.apply(left, right)));
    }
    Err(RuntimeError::UnknownOperator { op })
}
