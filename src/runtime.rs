//! Integer semantics shared by constant folding, the interpreter and the VM.

use crate::ast::BinaryOperator;

pub mod error;

use error::RuntimeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Arithmetic {
    Add,
    Sub,
    Mul,
    Div,
}

impl Arithmetic {
    pub(crate) fn from_operator(op: BinaryOperator) -> Option<Self> {
        match op {
            BinaryOperator::Add => Some(Arithmetic::Add),
            BinaryOperator::Sub => Some(Arithmetic::Sub),
            BinaryOperator::Mul => Some(Arithmetic::Mul),
            BinaryOperator::Div => Some(Arithmetic::Div),
            _ => None,
        }
    }

    /// Wrapping two's-complement arithmetic; division truncates toward zero.
    pub(crate) fn apply(self, left: i64, right: i64) -> Result<i64, RuntimeError> {
        match self {
            Arithmetic::Add => Ok(left.wrapping_add(right)),
            Arithmetic::Sub => Ok(left.wrapping_sub(right)),
            Arithmetic::Mul => Ok(left.wrapping_mul(right)),
            Arithmetic::Div if right == 0 => Err(RuntimeError::DivisionByZero),
            Arithmetic::Div => Ok(left.wrapping_div(right)),
        }
    }
}

/// The comparisons both back ends can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Comparison {
    Equal,
    Less,
    Greater,
}

impl Comparison {
    pub(crate) fn from_operator(op: BinaryOperator) -> Option<Self> {
        match op {
            BinaryOperator::Equal => Some(Comparison::Equal),
            BinaryOperator::Less => Some(Comparison::Less),
            BinaryOperator::Greater => Some(Comparison::Greater),
            _ => None,
        }
    }

    pub(crate) fn apply(self, left: i64, right: i64) -> bool {
        match self {
            Comparison::Equal => left == right,
            Comparison::Less => left < right,
            Comparison::Greater => left > right,
        }
    }
}
