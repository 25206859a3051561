use std::fmt;

pub mod tree;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::Greater => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A node of the syntax tree.
///
/// Every composite node owns its children. A missing `else_branch` is a
/// distinct state from an empty block.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Node {
    Literal(i64),
    Identifier(String),
    Binary {
        op: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    Assignment {
        name: String,
        value: Box<Node>,
    },
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    While {
        condition: Box<Node>,
        body: Box<Node>,
    },
    Block(Vec<Node>),
    Print(Box<Node>),
}

impl Node {
    pub fn identifier(name: impl Into<String>) -> Self {
        Node::Identifier(name.into())
    }

    pub fn binary(op: BinaryOperator, left: Node, right: Node) -> Self {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn assignment(name: impl Into<String>, value: Node) -> Self {
        Node::Assignment {
            name: name.into(),
            value: Box::new(value),
        }
    }

    pub fn if_else(condition: Node, then_branch: Node, else_branch: Option<Node>) -> Self {
        Node::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        }
    }

    pub fn while_loop(condition: Node, body: Node) -> Self {
        Node::While {
            condition: Box::new(condition),
            body: Box::new(body),
        }
    }

    pub fn print(expr: Node) -> Self {
        Node::Print(Box::new(expr))
    }

    /// True for nodes that may appear in expression position.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Node::Literal(_) | Node::Identifier(_) | Node::Binary { .. }
        )
    }
}

/// Renders a parsed program back to source text.
///
/// The root block's statements are written without surrounding braces, so
/// the output parses back into the same tree. Fails on trees the parser
/// cannot produce, such as a statement in expression position.
pub fn to_source(root: &Node) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let mut printer = SourcePrinter {
        out: &mut out,
        indent: 0,
    };
    match root {
        Node::Block(statements) => statements
            .iter()
            .try_for_each(|statement| printer.statement(statement))?,
        other => printer.statement(other)?,
    }
    Ok(out)
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_expression() {
            write_top(f, self)
        } else {
            let mut out = String::new();
            let mut printer = SourcePrinter {
                out: &mut out,
                indent: 0,
            };
            printer.statement(self)?;
            f.write_str(out.trim_end())
        }
    }
}

/// Writes an expression, leaving the outermost binary operation bare.
fn write_top(out: &mut impl fmt::Write, node: &Node) -> fmt::Result {
    match node {
        Node::Binary { op, left, right } => {
            write_expression(out, left)?;
            write!(out, " {op} ")?;
            write_expression(out, right)
        }
        other => write_expression(out, other),
    }
}

fn write_expression(out: &mut impl fmt::Write, node: &Node) -> fmt::Result {
    match node {
        Node::Literal(value) => write!(out, "{value}"),
        Node::Identifier(name) => out.write_str(name),
        Node::Binary { op, left, right } => {
            out.write_char('(')?;
            write_expression(out, left)?;
            write!(out, " {op} ")?;
            write_expression(out, right)?;
            out.write_char(')')
        }
        // Statements never appear in expression position in parsed trees.
        Node::Assignment { .. }
        | Node::If { .. }
        | Node::While { .. }
        | Node::Block(_)
        | Node::Print(_) => Err(fmt::Error),
    }
}

struct SourcePrinter<'a> {
    out: &'a mut String,
    indent: usize,
}

impl SourcePrinter<'_> {
    fn pad(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str("    ");
        }
    }

    fn statement(&mut self, node: &Node) -> fmt::Result {
        self.pad();
        self.statement_body(node)?;
        self.out.push('\n');
        Ok(())
    }

    /// Writes a statement that starts at the current column.
    fn statement_body(&mut self, node: &Node) -> fmt::Result {
        match node {
            Node::Literal(_) | Node::Identifier(_) | Node::Binary { .. } => {
                write_top(&mut *self.out, node)?;
                self.out.push(';');
            }
            Node::Assignment { name, value } => {
                self.out.push_str(name);
                self.out.push_str(" = ");
                write_top(&mut *self.out, value)?;
                self.out.push(';');
            }
            Node::Print(expr) => {
                self.out.push_str("print ");
                write_top(&mut *self.out, expr)?;
                self.out.push(';');
            }
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.out.push_str("if (");
                write_top(&mut *self.out, condition)?;
                self.out.push_str(") ");
                self.statement_body(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.out.push_str(" else ");
                    self.statement_body(else_branch)?;
                }
            }
            Node::While { condition, body } => {
                self.out.push_str("while (");
                write_top(&mut *self.out, condition)?;
                self.out.push_str(") ");
                self.statement_body(body)?;
            }
            Node::Block(statements) => {
                self.out.push('{');
                if !statements.is_empty() {
                    self.out.push('\n');
                    self.indent += 1;
                    for statement in statements {
                        self.statement(statement)?;
                    }
                    self.indent -= 1;
                    self.pad();
                }
                self.out.push('}');
            }
        }
        Ok(())
    }
}
