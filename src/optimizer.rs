//! Constant folding and dead-branch/dead-loop elimination.
//!
//! The optimizer never mutates its input; it builds a new tree bottom-up.
//! `None` stands for "no node", e.g. a loop whose condition is literal zero.

use thiserror::Error;
use tracing::debug;

use crate::ast::Node;
use crate::runtime::Arithmetic;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("Division by zero in constant folding: {left} / 0")]
    DivisionByZero { left: i64 },
}

pub type OptimizeResult<T> = Result<T, OptimizeError>;

/// Optimizes a whole program. An eliminated root becomes an empty block.
pub fn optimize_program(root: &Node) -> OptimizeResult<Node> {
    Ok(optimize(root)?.unwrap_or_else(empty_block))
}

pub fn optimize(node: &Node) -> OptimizeResult<Option<Node>> {
    match node {
        Node::Literal(_) | Node::Identifier(_) => Ok(Some(node.clone())),
        Node::Binary { op, left, right } => {
            let left = optimize_required(left)?;
            let right = optimize_required(right)?;
            // Comparisons are rebuilt over folded operands, never folded.
            if let (Node::Literal(l), Node::Literal(r)) = (&left, &right)
                && let Some(arithmetic) = Arithmetic::from_operator(*op)
            {
                // Integer arithmetic only fails on a zero divisor.
                let folded = arithmetic
                    .apply(*l, *r)
                    .map_err(|_| OptimizeError::DivisionByZero { left: *l })?;
                debug!(%op, left = l, right = r, folded, "folded constant expression");
                return Ok(Some(Node::Literal(folded)));
            }
            Ok(Some(Node::binary(*op, left, right)))
        }
        Node::Assignment { name, value } => Ok(Some(Node::assignment(
            name.clone(),
            optimize_required(value)?,
        ))),
        Node::Print(expr) => Ok(Some(Node::print(optimize_required(expr)?))),
        Node::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition = optimize_required(condition)?;
            let then_branch = optimize(then_branch)?;
            let else_branch = match else_branch {
                Some(branch) => optimize(branch)?,
                None => None,
            };
            if let Node::Literal(value) = condition {
                debug!(condition = value, "collapsed if with constant condition");
                return Ok(if value != 0 { then_branch } else { else_branch });
            }
            Ok(Some(Node::if_else(
                condition,
                then_branch.unwrap_or_else(empty_block),
                else_branch,
            )))
        }
        Node::While { condition, body } => {
            let condition = optimize_required(condition)?;
            let body = optimize(body)?;
            if condition == Node::Literal(0) {
                debug!("eliminated while loop with zero condition");
                return Ok(None);
            }
            Ok(Some(Node::while_loop(
                condition,
                body.unwrap_or_else(empty_block),
            )))
        }
        Node::Block(statements) => {
            let mut optimized = Vec::with_capacity(statements.len());
            for statement in statements {
                if let Some(statement) = optimize(statement)? {
                    optimized.push(statement);
                }
            }
            Ok(Some(Node::Block(optimized)))
        }
    }
}

/// Optimizes a child that must exist; an eliminated child becomes an empty block.
fn optimize_required(node: &Node) -> OptimizeResult<Node> {
    Ok(optimize(node)?.unwrap_or_else(empty_block))
}

fn empty_block() -> Node {
    Node::Block(Vec::new())
}
