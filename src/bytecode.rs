//! Lowering of syntax trees to the stack-machine instruction set.
//!
//! Jump targets are symbolic: `JZ` and `JMP` name a `LABEL` marker and the VM
//! resolves them to instruction indices before execution.

use std::fmt;

use thiserror::Error;
use tracing::{debug, trace};

use crate::ast::{BinaryOperator, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Push,
    Load,
    Store,
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Eq,
    Jz,
    Jmp,
    Label,
    Nop,
    Print,
    Pop,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Gt => "GT",
            Opcode::Lt => "LT",
            Opcode::Eq => "EQ",
            Opcode::Jz => "JZ",
            Opcode::Jmp => "JMP",
            Opcode::Label => "LABEL",
            Opcode::Nop => "NOP",
            Opcode::Print => "PRINT",
            Opcode::Pop => "POP",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Push(i64),
    Load(String),
    Store(String),
    Add,
    Sub,
    Mul,
    Div,
    Gt,
    Lt,
    Eq,
    Jz(String),
    Jmp(String),
    Label(String),
    Nop,
    Print,
    /// Discards the value of an expression statement.
    Pop,
}

impl Instruction {
    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::Push(_) => Opcode::Push,
            Instruction::Load(_) => Opcode::Load,
            Instruction::Store(_) => Opcode::Store,
            Instruction::Add => Opcode::Add,
            Instruction::Sub => Opcode::Sub,
            Instruction::Mul => Opcode::Mul,
            Instruction::Div => Opcode::Div,
            Instruction::Gt => Opcode::Gt,
            Instruction::Lt => Opcode::Lt,
            Instruction::Eq => Opcode::Eq,
            Instruction::Jz(_) => Opcode::Jz,
            Instruction::Jmp(_) => Opcode::Jmp,
            Instruction::Label(_) => Opcode::Label,
            Instruction::Nop => Opcode::Nop,
            Instruction::Print => Opcode::Print,
            Instruction::Pop => Opcode::Pop,
        }
    }

    /// Textual operand, `None` for opcodes that take no argument.
    pub fn operand(&self) -> Option<String> {
        match self {
            Instruction::Push(value) => Some(value.to_string()),
            Instruction::Load(name)
            | Instruction::Store(name)
            | Instruction::Jz(name)
            | Instruction::Jmp(name)
            | Instruction::Label(name) => Some(name.clone()),
            Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Gt
            | Instruction::Lt
            | Instruction::Eq
            | Instruction::Nop
            | Instruction::Print
            | Instruction::Pop => None,
        }
    }

    fn for_operator(op: BinaryOperator) -> Option<Self> {
        match op {
            BinaryOperator::Add => Some(Instruction::Add),
            BinaryOperator::Sub => Some(Instruction::Sub),
            BinaryOperator::Mul => Some(Instruction::Mul),
            BinaryOperator::Div => Some(Instruction::Div),
            BinaryOperator::Greater => Some(Instruction::Gt),
            BinaryOperator::Less => Some(Instruction::Lt),
            BinaryOperator::Equal => Some(Instruction::Eq),
            BinaryOperator::NotEqual
            | BinaryOperator::LessEqual
            | BinaryOperator::GreaterEqual => None,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand() {
            Some(operand) => write!(f, "{} {operand}", self.opcode()),
            None => write!(f, "{}", self.opcode()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

/// Numbered listing, one `index: OPCODE [operand]` line per instruction.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, instruction) in self.instructions.iter().enumerate() {
            writeln!(f, "{index}: {instruction}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("Operator '{op}' has no bytecode equivalent")]
    UnsupportedOperator { op: BinaryOperator },
}

pub type CompileResult<T> = Result<T, CompileError>;

pub fn compile(program: &Node) -> CompileResult<Program> {
    let mut compiler = Compiler::default();
    compiler.compile_statement(program)?;
    debug!(
        instructions = compiler.code.len(),
        labels = compiler.label_count,
        "compiled program"
    );
    Ok(Program::new(compiler.code))
}

/// Emission state for one compilation; labels are numbered from zero each time.
#[derive(Default)]
struct Compiler {
    code: Vec<Instruction>,
    label_count: usize,
}

impl Compiler {
    /// Compiles `node` in statement position, where an expression's value is
    /// unused and must not stay on the stack.
    fn compile_statement(&mut self, node: &Node) -> CompileResult<()> {
        self.compile_node(node)?;
        if node.is_expression() {
            self.emit(Instruction::Pop);
        }
        Ok(())
    }

    fn compile_node(&mut self, node: &Node) -> CompileResult<()> {
        match node {
            Node::Literal(value) => self.emit(Instruction::Push(*value)),
            Node::Identifier(name) => self.emit(Instruction::Load(name.clone())),
            Node::Binary { op, left, right } => {
                let instruction = Instruction::for_operator(*op)
                    .ok_or(CompileError::UnsupportedOperator { op: *op })?;
                self.compile_node(left)?;
                self.compile_node(right)?;
                self.emit(instruction);
            }
            Node::Assignment { name, value } => {
                self.compile_node(value)?;
                self.emit(Instruction::Store(name.clone()));
            }
            Node::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let else_label = self.fresh_label("else");
                let end_label = self.fresh_label("end");
                self.compile_node(condition)?;
                self.emit(Instruction::Jz(else_label.clone()));
                self.compile_statement(then_branch)?;
                self.emit(Instruction::Jmp(end_label.clone()));
                self.emit(Instruction::Label(else_label));
                if let Some(else_branch) = else_branch {
                    self.compile_statement(else_branch)?;
                }
                self.emit(Instruction::Label(end_label));
            }
            Node::While { condition, body } => {
                let start_label = self.fresh_label("start");
                let end_label = self.fresh_label("end");
                self.emit(Instruction::Label(start_label.clone()));
                self.compile_node(condition)?;
                self.emit(Instruction::Jz(end_label.clone()));
                self.compile_statement(body)?;
                self.emit(Instruction::Jmp(start_label));
                self.emit(Instruction::Label(end_label));
            }
            Node::Block(statements) => {
                for statement in statements {
                    self.compile_statement(statement)?;
                }
            }
            Node::Print(expr) => {
                self.compile_node(expr)?;
                self.emit(Instruction::Print);
            }
        }
        Ok(())
    }

    fn fresh_label(&mut self, kind: &str) -> String {
        let label = format!("L_{kind}_{}", self.label_count);
        self.label_count += 1;
        label
    }

    fn emit(&mut self, instruction: Instruction) {
        trace!(index = self.code.len(), %instruction, "emit");
        self.code.push(instruction);
    }
}
