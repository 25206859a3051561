use anyhow::Result;

use crate::ast::Node;

/// Executable artifact produced by a backend `prepare` step.
///
/// This keeps translation and execution separated so benchmarks and tests can
/// measure/validate prepare-vs-run phases independently.
pub trait PreparedBackend {
    /// Runs to completion and returns the printed values, one per line.
    fn run(&self) -> Result<String>;
}

/// Common interface implemented by each execution backend.
///
/// `prepare` translates the syntax tree into backend-owned executable state,
/// while `run` offers the convenience path for one-shot execution.
pub trait Backend {
    fn name(&self) -> &'static str;
    fn prepare(&self, program: &Node) -> Result<Box<dyn PreparedBackend>>;

    fn run(&self, program: &Node) -> Result<String> {
        self.prepare(program)?.run()
    }
}

pub fn backends() -> Vec<Box<dyn Backend>> {
    vec![
        Box::new(crate::interpreter::Interpreter::new()),
        Box::new(crate::vm::VM::new()),
    ]
}

pub(crate) fn render_output(output: &[i64]) -> String {
    output
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
