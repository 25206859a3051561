use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result, anyhow, bail};
use tracing_subscriber::EnvFilter;

use ministack::ast::{Node, tree::render_tree};
use ministack::bytecode::{Program, compile};
use ministack::interpreter::Interpreter;
use ministack::vm::{VM, VmGlobals};
use ministack::{lexer, optimizer, parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Interpret,
    Compile,
    Both,
}

impl Mode {
    fn from_name(name: &str) -> Result<Self> {
        match name {
            "interpret" => Ok(Mode::Interpret),
            "compile" => Ok(Mode::Compile),
            "both" => Ok(Mode::Both),
            _ => bail!("Unknown mode '{name}' (expected interpret, compile or both)"),
        }
    }

    fn interprets(self) -> bool {
        matches!(self, Mode::Interpret | Mode::Both)
    }

    fn compiles(self) -> bool {
        matches!(self, Mode::Compile | Mode::Both)
    }
}

#[derive(Debug)]
struct Options {
    mode: Mode,
    optimize: bool,
    show_tokens: bool,
    show_tree: bool,
    show_ir: bool,
    trace: bool,
    input_path: Option<String>,
}

impl Options {
    /// Sectioned output with banners and the final variable state, instead of
    /// bare program output.
    fn is_verbose(&self) -> bool {
        self.mode == Mode::Both || self.show_tokens || self.show_tree || self.show_ir
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options> {
    let mut options = Options {
        mode: Mode::Interpret,
        optimize: false,
        show_tokens: false,
        show_tree: false,
        show_ir: false,
        trace: false,
        input_path: None,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" | "-m" => {
                let name = args
                    .next()
                    .ok_or_else(|| anyhow!("Missing mode after {arg}"))?;
                options.mode = Mode::from_name(&name)?;
            }
            "--optimize" | "-O" => options.optimize = true,
            "--tokens" => options.show_tokens = true,
            "--tree" => options.show_tree = true,
            "--ir" => options.show_ir = true,
            "--trace" => options.trace = true,
            _ if arg.starts_with('-') => bail!("Unknown flag '{arg}'"),
            _ => {
                if options.input_path.is_some() {
                    bail!("Only one input file is supported");
                }
                options.input_path = Some(arg);
            }
        }
    }

    Ok(options)
}

fn init_tracing(trace: bool) {
    let filter = if trace {
        EnvFilter::new("ministack=trace")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ministack=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_source(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Reading {path}")),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Reading stdin")?;
            Ok(buffer)
        }
    }
}

fn banner(title: &str) {
    println!("\n=== {title} ===");
}

fn print_output(output: &[i64]) {
    for value in output {
        println!("{value}");
    }
}

fn print_variables(variables: impl IntoIterator<Item = (String, i64)>) {
    let mut variables = variables.into_iter().collect::<Vec<_>>();
    variables.sort_by(|(left, _), (right, _)| left.cmp(right));
    for (name, value) in variables {
        println!("{name} = {value}");
    }
}

fn interpret(program: &Node, verbose: bool) -> Result<()> {
    if verbose {
        banner("INTERPRETER OUTPUT");
    }
    let mut interpreter = Interpreter::new();
    let result = interpreter.execute(program);
    print_output(interpreter.output());
    result.context("Interpreter error")?;
    if verbose {
        banner("Interpreter Variable State");
        print_variables(
            interpreter
                .globals()
                .iter()
                .map(|(name, value)| (name.clone(), *value)),
        );
    }
    Ok(())
}

fn execute(program: &Program, verbose: bool) -> Result<()> {
    if verbose {
        banner("VM OUTPUT");
    }
    let execution = VM::execute(program, VmGlobals::default()).context("VM error")?;
    print_output(&execution.output);
    if verbose {
        banner("VM Variable State");
        print_variables(execution.globals);
    }
    Ok(())
}

fn main() -> Result<()> {
    let options = parse_args(std::env::args().skip(1))?;
    init_tracing(options.trace);
    let verbose = options.is_verbose();

    let source = read_source(options.input_path.as_deref())?;

    if options.show_tokens {
        banner("TOKENS");
        for token in lexer::tokenize(&source) {
            println!("{token}");
        }
    }

    let mut program = parser::parse(&source).context("Syntax error")?;
    if options.show_tree {
        banner("PARSE TREE");
        print!("{}", render_tree(&program));
    }

    if options.optimize {
        program = optimizer::optimize_program(&program).context("Optimizer error")?;
        if options.show_tree {
            banner("OPTIMIZED TREE");
            print!("{}", render_tree(&program));
        }
    }

    let mut interpreter_failed = false;
    if options.mode.interprets()
        && let Err(error) = interpret(&program, verbose)
    {
        if options.mode != Mode::Both {
            return Err(error);
        }
        // Both mode still compiles and runs the VM after an interpreter failure.
        eprintln!("{error:#}");
        interpreter_failed = true;
    }

    if options.mode.compiles() {
        let compiled = compile(&program).context("Compile error")?;
        if options.show_ir {
            banner("COMPILATION TO IR");
            print!("{compiled}");
        }
        execute(&compiled, verbose)?;
    }

    if interpreter_failed {
        bail!("Interpreter failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> impl Iterator<Item = String> {
        values
            .iter()
            .map(|value| value.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn parses_flags_and_input_path() {
        let options = parse_args(args(&["-m", "both", "-O", "--ir", "prog.ms"])).expect("args");
        assert_eq!(options.mode, Mode::Both);
        assert!(options.optimize);
        assert!(options.show_ir);
        assert!(!options.show_tokens);
        assert_eq!(options.input_path.as_deref(), Some("prog.ms"));
        assert!(options.is_verbose());
    }

    #[test]
    fn defaults_to_quiet_interpretation() {
        let options = parse_args(args(&[])).expect("args");
        assert_eq!(options.mode, Mode::Interpret);
        assert!(options.input_path.is_none());
        assert!(!options.is_verbose());
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(args(&["--mode"])).is_err());
        assert!(parse_args(args(&["--mode", "jit"])).is_err());
        assert!(parse_args(args(&["--fast"])).is_err());
        assert!(parse_args(args(&["a.ms", "b.ms"])).is_err());
    }
}
