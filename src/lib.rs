pub mod ast;
pub mod backend;
pub mod bytecode;
pub mod interpreter;
pub mod lexer;
pub mod optimizer;
pub mod parser;
pub mod runtime;
pub mod token;
pub mod vm;
