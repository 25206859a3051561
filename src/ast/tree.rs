//! Indented, one-node-per-line dump of a syntax tree.

use std::fmt::Write;

use super::Node;

const INDENT: &str = "    ";

pub fn render_tree(node: &Node) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

fn line(out: &mut String, depth: usize, text: &str) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(text);
    out.push('\n');
}

fn write_node(out: &mut String, node: &Node, depth: usize) {
    match node {
        Node::Literal(value) => line(out, depth, &format!("Literal: {value}")),
        Node::Identifier(name) => line(out, depth, &format!("Identifier: {name}")),
        Node::Binary { op, left, right } => {
            line(out, depth, &format!("BinaryExpr: {op}"));
            write_node(out, left, depth + 1);
            write_node(out, right, depth + 1);
        }
        Node::Assignment { name, value } => {
            line(out, depth, &format!("Assignment: {name}"));
            write_node(out, value, depth + 1);
        }
        Node::If {
            condition,
            then_branch,
            else_branch,
        } => {
            line(out, depth, "IfStmt");
            labeled(out, depth, "Condition:", condition);
            labeled(out, depth, "Then:", then_branch);
            if let Some(else_branch) = else_branch {
                labeled(out, depth, "Else:", else_branch);
            }
        }
        Node::While { condition, body } => {
            line(out, depth, "WhileStmt");
            labeled(out, depth, "Condition:", condition);
            labeled(out, depth, "Body:", body);
        }
        Node::Block(statements) => {
            line(out, depth, "Block");
            for statement in statements {
                write_node(out, statement, depth + 1);
            }
        }
        Node::Print(expr) => {
            line(out, depth, "PrintStmt");
            write_node(out, expr, depth + 1);
        }
    }
}

fn labeled(out: &mut String, depth: usize, label: &str, child: &Node) {
    let _ = writeln!(out, "{}  {label}", INDENT.repeat(depth));
    write_node(out, child, depth + 2);
}
