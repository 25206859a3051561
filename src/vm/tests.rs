use indoc::indoc;

use super::*;
use crate::bytecode::Instruction;
use crate::parser::parse;

fn execute_source(source: &str) -> VmResult<Execution> {
    let tree = parse(source).expect("parse failed");
    let program = compile(&tree).expect("compile failed");
    VM::execute(&program, VmGlobals::default())
}

fn execute(instructions: Vec<Instruction>) -> VmResult<Execution> {
    VM::execute(&Program::new(instructions), VmGlobals::default())
}

fn label(name: &str) -> String {
    name.to_string()
}

#[test]
fn executes_branching_scenario() {
    let execution = execute_source(indoc! {"
        x = 3;
        y = 5;
        if (x < y) { print x + y; } else { print 0; }
    "})
    .expect("vm failed");
    assert_eq!(execution.output, vec![8]);
    assert_eq!(execution.globals.get("x"), Some(&3));
    assert_eq!(execution.globals.get("y"), Some(&5));
}

#[test]
fn executes_while_loop() {
    let execution = execute_source(indoc! {"
        i = 0;
        s = 0;
        while (i < 5) {
            s = s + i;
            i = i + 1;
        }
        print s;
    "})
    .expect("vm failed");
    assert_eq!(execution.output, vec![10]);
    assert_eq!(execution.globals.get("i"), Some(&5));
}

#[test]
fn pops_right_operand_first() {
    let execution = execute_source("print 10 - 3 - 2; print 7 / 2;").expect("vm failed");
    assert_eq!(execution.output, vec![5, 3]);
}

#[test]
fn comparisons_push_one_or_zero() {
    let execution = execute_source("a = 2 > 1; b = 2 < 1; c = 4 == 4;").expect("vm failed");
    assert_eq!(execution.globals.get("a"), Some(&1));
    assert_eq!(execution.globals.get("b"), Some(&0));
    assert_eq!(execution.globals.get("c"), Some(&1));
}

#[test]
fn comparisons_print_as_integers() {
    let execution = execute_source("print 1 < 2;").expect("vm failed");
    assert_eq!(execution.output, vec![1]);
}

#[test]
fn runs_with_prepopulated_environment() {
    let tree = parse("print n * 2; n = n + 1;").expect("parse failed");
    let program = compile(&tree).expect("compile failed");
    let mut globals = VmGlobals::default();
    globals.insert("n".to_string(), 21);

    let execution = VM::execute(&program, globals).expect("vm failed");
    assert_eq!(execution.output, vec![42]);
    assert_eq!(execution.globals.get("n"), Some(&22));
}

#[test]
fn loading_an_unbound_name_fails() {
    assert_eq!(
        execute_source("print q;"),
        Err(VmError::Runtime(RuntimeError::UndefinedVariable {
            name: "q".to_string()
        }))
    );
}

#[test]
fn division_by_zero_fails_at_runtime() {
    assert_eq!(
        execute_source("z = 0; print 1 / z;"),
        Err(VmError::Runtime(RuntimeError::DivisionByZero))
    );
}

#[test]
fn empty_stack_underflows() {
    assert_eq!(execute(vec![Instruction::Print]), Err(VmError::StackUnderflow));
    assert_eq!(
        execute(vec![Instruction::Push(1), Instruction::Add]),
        Err(VmError::StackUnderflow)
    );
    assert_eq!(
        execute(vec![Instruction::Store("x".to_string())]),
        Err(VmError::StackUnderflow)
    );
}

#[test]
fn jump_to_missing_label_fails() {
    assert_eq!(
        execute(vec![Instruction::Jmp(label("nowhere"))]),
        Err(VmError::UndefinedLabel {
            label: label("nowhere")
        })
    );
}

#[test]
fn duplicate_labels_are_rejected_before_running() {
    assert_eq!(
        execute(vec![
            Instruction::Push(1),
            Instruction::Print,
            Instruction::Label(label("L")),
            Instruction::Label(label("L")),
        ]),
        Err(VmError::DuplicateLabel { label: label("L") })
    );
}

#[test]
fn jz_only_jumps_on_zero() {
    let execution = execute(vec![
        Instruction::Push(7),
        Instruction::Jz(label("skip")),
        Instruction::Push(1),
        Instruction::Print,
        Instruction::Label(label("skip")),
        Instruction::Push(0),
        Instruction::Jz(label("end")),
        Instruction::Push(2),
        Instruction::Print,
        Instruction::Label(label("end")),
        Instruction::Nop,
    ])
    .expect("vm failed");
    assert_eq!(execution.output, vec![1]);
}

#[test]
fn backward_jump_resumes_after_label() {
    // Counts down from 2, printing each value.
    let execution = execute(vec![
        Instruction::Push(2),
        Instruction::Store("n".to_string()),
        Instruction::Label(label("top")),
        Instruction::Load("n".to_string()),
        Instruction::Jz(label("done")),
        Instruction::Load("n".to_string()),
        Instruction::Print,
        Instruction::Load("n".to_string()),
        Instruction::Push(1),
        Instruction::Sub,
        Instruction::Store("n".to_string()),
        Instruction::Jmp(label("top")),
        Instruction::Label(label("done")),
    ])
    .expect("vm failed");
    assert_eq!(execution.output, vec![2, 1]);
}

#[test]
fn expression_statements_leave_the_stack_empty() {
    let execution = execute_source(indoc! {"
        i = 0;
        while (i < 50) {
            i;
            i * 2 + 1;
            i = i + 1;
        }
        if (i) i; else 0;
    "})
    .expect("vm failed");
    assert_eq!(execution.stack_depth, 0);
    assert_eq!(execution.globals.get("i"), Some(&50));
}

#[test]
fn pop_on_empty_stack_underflows() {
    assert_eq!(execute(vec![Instruction::Pop]), Err(VmError::StackUnderflow));
}

#[test]
fn empty_program_does_nothing() {
    assert_eq!(execute(Vec::new()), Ok(Execution::default()));
}

#[test]
fn backend_renders_output_lines() {
    let tree = parse("print 1; print 2 + 2;").expect("parse failed");
    let output = VM::new().run(&tree).expect("run failed");
    assert_eq!(output, "1\n4");
}

#[test]
fn backend_surfaces_compile_errors() {
    let tree = parse("print 1 != 2;").expect("parse failed");
    let error = VM::new().run(&tree).expect_err("expected compile error");
    assert!(error.downcast_ref::<crate::bytecode::CompileError>().is_some());
}
