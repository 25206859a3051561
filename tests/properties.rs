//! Property-based tests over the whole pipeline.
use ministack::ast::{self, BinaryOperator, Node};
use ministack::bytecode::compile;
use ministack::interpreter::Interpreter;
use ministack::optimizer::{optimize, optimize_program};
use ministack::parser::parse;
use ministack::runtime::error::RuntimeError;
use ministack::vm::{VM, VmError, VmGlobals};
use proptest::prelude::*;

mod strategies {
    use super::*;

    const VARIABLES: [&str; 3] = ["a", "b", "c"];

    /// Identifiers that never collide with a keyword.
    pub fn ident() -> impl Strategy<Value = String> {
        "[a-z_][a-z0-9_]{0,6}".prop_filter("Avoid reserved keywords", |s| {
            !matches!(s.as_str(), "if" | "else" | "while" | "print")
        })
    }

    /// Non-negative literals; the grammar has no unary minus.
    pub fn literal() -> impl Strategy<Value = Node> {
        (0i64..=1000).prop_map(Node::Literal)
    }

    pub fn operator() -> impl Strategy<Value = BinaryOperator> {
        prop_oneof![
            Just(BinaryOperator::Add),
            Just(BinaryOperator::Sub),
            Just(BinaryOperator::Mul),
            Just(BinaryOperator::Div),
            Just(BinaryOperator::Equal),
            Just(BinaryOperator::NotEqual),
            Just(BinaryOperator::Less),
            Just(BinaryOperator::Greater),
            Just(BinaryOperator::LessEqual),
            Just(BinaryOperator::GreaterEqual),
        ]
    }

    pub fn arithmetic_operator() -> impl Strategy<Value = BinaryOperator> {
        prop_oneof![
            Just(BinaryOperator::Add),
            Just(BinaryOperator::Sub),
            Just(BinaryOperator::Mul),
            Just(BinaryOperator::Div),
        ]
    }

    pub fn comparison_operator() -> impl Strategy<Value = BinaryOperator> {
        prop_oneof![
            Just(BinaryOperator::Equal),
            Just(BinaryOperator::Less),
            Just(BinaryOperator::Greater),
        ]
    }

    /// Any expression the parser can produce.
    pub fn expr() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![literal(), ident().prop_map(Node::Identifier)];
        leaf.prop_recursive(4, 24, 2, |inner| {
            (operator(), inner.clone(), inner)
                .prop_map(|(op, left, right)| Node::binary(op, left, right))
        })
    }

    /// Arithmetic over literals only.
    pub fn constant_expr() -> impl Strategy<Value = Node> {
        literal().prop_recursive(4, 24, 2, |inner| {
            (arithmetic_operator(), inner.clone(), inner)
                .prop_map(|(op, left, right)| Node::binary(op, left, right))
        })
    }

    /// Arithmetic and comparisons over literals and the pre-assigned
    /// variables, so comparison results also reach `print` and `STORE`.
    pub fn int_expr() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![
            2 => (0i64..=20).prop_map(Node::Literal),
            1 => prop::sample::select(VARIABLES.to_vec()).prop_map(Node::identifier),
        ];
        leaf.prop_recursive(3, 12, 2, |inner| {
            let operator = prop_oneof![3 => arithmetic_operator(), 1 => comparison_operator()];
            (operator, inner.clone(), inner)
                .prop_map(|(op, left, right)| Node::binary(op, left, right))
        })
    }

    pub fn condition() -> impl Strategy<Value = Node> {
        prop_oneof![
            (comparison_operator(), int_expr(), int_expr())
                .prop_map(|(op, left, right)| Node::binary(op, left, right)),
            int_expr(),
        ]
    }

    /// Any statement the parser can produce. Ambiguous dangling-else shapes
    /// get a braced then-branch.
    pub fn statement() -> impl Strategy<Value = Node> {
        let leaf = prop_oneof![
            (ident(), expr()).prop_map(|(name, value)| Node::assignment(name, value)),
            expr().prop_map(Node::print),
            expr(),
        ];
        leaf.prop_recursive(3, 16, 3, |inner| {
            prop_oneof![
                (expr(), inner.clone(), prop::option::of(inner.clone())).prop_map(
                    |(condition, then_branch, else_branch)| {
                        let needs_braces =
                            else_branch.is_some() && !matches!(then_branch, Node::Block(_));
                        let then_branch = if needs_braces {
                            Node::Block(vec![then_branch])
                        } else {
                            then_branch
                        };
                        Node::if_else(condition, then_branch, else_branch)
                    }
                ),
                (expr(), inner.clone()).prop_map(|(condition, body)| Node::while_loop(condition, body)),
                prop::collection::vec(inner, 0..3).prop_map(Node::Block),
            ]
        })
    }

    pub fn program() -> impl Strategy<Value = Node> {
        prop::collection::vec(statement(), 0..6).prop_map(Node::Block)
    }

    /// Statements whose loops are bounded, including bare expression
    /// statements.
    fn simple_statement() -> impl Strategy<Value = Node> {
        prop_oneof![
            (prop::sample::select(VARIABLES.to_vec()), int_expr())
                .prop_map(|(name, value)| Node::assignment(name, value)),
            int_expr().prop_map(Node::print),
            int_expr(),
        ]
    }

    fn branch() -> impl Strategy<Value = Node> {
        prop::collection::vec(simple_statement(), 0..3).prop_map(Node::Block)
    }

    fn if_statement() -> impl Strategy<Value = Node> {
        (condition(), branch(), prop::option::of(branch())).prop_map(
            |(condition, then_branch, else_branch)| {
                Node::if_else(condition, then_branch, else_branch)
            },
        )
    }

    /// `i = 0; while (i < n) { ...; i = i + 1; }` with a body that never
    /// touches `i`.
    fn counted_loop() -> impl Strategy<Value = Node> {
        (
            0i64..5,
            prop::collection::vec(prop_oneof![simple_statement(), if_statement()], 0..3),
        )
            .prop_map(|(bound, mut body)| {
                body.push(Node::assignment(
                    "i",
                    Node::binary(BinaryOperator::Add, Node::identifier("i"), Node::Literal(1)),
                ));
                Node::Block(vec![
                    Node::assignment("i", Node::Literal(0)),
                    Node::while_loop(
                        Node::binary(BinaryOperator::Less, Node::identifier("i"), Node::Literal(bound)),
                        Node::Block(body),
                    ),
                ])
            })
    }

    pub fn terminating_program() -> impl Strategy<Value = Node> {
        (
            prop::collection::vec(0i64..=20, 3),
            prop::collection::vec(
                prop_oneof![
                    3 => simple_statement(),
                    2 => if_statement(),
                    1 => counted_loop(),
                ],
                0..8,
            ),
        )
            .prop_map(|(initial, statements)| {
                let mut program = VARIABLES
                    .iter()
                    .zip(initial)
                    .map(|(name, value)| Node::assignment(*name, Node::Literal(value)))
                    .collect::<Vec<_>>();
                program.extend(statements);
                Node::Block(program)
            })
    }
}

/// Printed values and final bindings, or the runtime error that stopped the run.
type Outcome = Result<(Vec<i64>, Vec<(String, i64)>), RuntimeError>;

fn sorted(globals: impl IntoIterator<Item = (String, i64)>) -> Vec<(String, i64)> {
    let mut globals = globals.into_iter().collect::<Vec<_>>();
    globals.sort();
    globals
}

fn interpret(program: &Node) -> Outcome {
    let mut interpreter = Interpreter::new();
    interpreter.execute(program)?;
    let globals = interpreter
        .globals()
        .iter()
        .map(|(name, value)| (name.clone(), *value));
    Ok((interpreter.output().to_vec(), sorted(globals)))
}

fn execute(program: &Node) -> Outcome {
    let compiled = compile(program).expect("generated programs only use compilable operators");
    match VM::execute(&compiled, VmGlobals::default()) {
        Ok(execution) => Ok((execution.output, sorted(execution.globals))),
        Err(VmError::Runtime(error)) => Err(error),
        Err(other) => panic!("compiled program failed inside the VM: {other}"),
    }
}

proptest! {
    #[test]
    fn printed_programs_parse_back_to_the_same_tree(program in strategies::program()) {
        let source = ast::to_source(&program).expect("generated trees print");
        let reparsed = parse(&source);
        prop_assert_eq!(reparsed.as_ref(), Ok(&program), "source:\n{}", source);
    }

    #[test]
    fn optimizing_twice_changes_nothing(program in strategies::program()) {
        if let Ok(once) = optimize_program(&program) {
            prop_assert_eq!(optimize_program(&once), Ok(once.clone()));
        }
    }

    #[test]
    fn interpreter_and_vm_agree(program in strategies::terminating_program()) {
        prop_assert_eq!(interpret(&program), execute(&program));
    }

    #[test]
    fn optimization_preserves_behavior(program in strategies::terminating_program()) {
        if let Ok(optimized) = optimize_program(&program) {
            prop_assert_eq!(interpret(&program), interpret(&optimized));
            prop_assert_eq!(execute(&program), execute(&optimized));
        }
    }

    #[test]
    fn folding_matches_evaluation(expr in strategies::constant_expr()) {
        let folded = optimize(&expr);
        let evaluated = Interpreter::new().eval(&expr);
        match (folded, evaluated) {
            (Ok(Some(Node::Literal(folded))), Ok(evaluated)) => {
                prop_assert_eq!(folded, evaluated);
            }
            (Err(_), Err(RuntimeError::DivisionByZero)) => {}
            (folded, evaluated) => {
                prop_assert!(false, "folded {:?}, evaluated {:?}", folded, evaluated);
            }
        }
    }
}
