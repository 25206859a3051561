use thiserror::Error;

use crate::ast::BinaryOperator;

/// Execution failures shared by the interpreter and the VM.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'")]
    UndefinedVariable { name: String },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Unknown operator '{op}'")]
    UnknownOperator { op: BinaryOperator },
}
