use crate::ast::{BinaryOperator, Node};

mod error;

pub use error::{Found, ParseError, ParseResult, Position};

const KEYWORDS: [&str; 4] = ["if", "else", "while", "print"];

/// Recursive-descent parser reading characters directly from the source.
///
/// Whitespace is skipped before every token read; there is no separate
/// tokenization pass.
pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parses the whole input into a root `Block`.
    pub fn parse_program(mut self) -> ParseResult<Node> {
        let statements = self.parse_statements()?;
        // A stray '}' at top level ends `parse_statements` early.
        if let Some(ch) = self.peek() {
            return Err(ParseError::UnexpectedCharacter {
                found: Found::Char(ch),
                position: self.position(),
            });
        }
        Ok(Node::Block(statements))
    }

    fn parse_statements(&mut self) -> ParseResult<Vec<Node>> {
        let mut statements = Vec::new();
        while !matches!(self.peek(), None | Some('}')) {
            statements.push(self.parse_statement()?);
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> ParseResult<Node> {
        if self.match_keyword("if") {
            return self.parse_if();
        }
        if self.match_keyword("while") {
            return self.parse_while();
        }
        if self.match_keyword("print") {
            return self.parse_print();
        }
        if self.peek() == Some('{') {
            return self.parse_block();
        }
        if self.peek().is_some_and(is_identifier_start) {
            // One identifier of lookahead: `name =` is an assignment,
            // anything else is rewound and reparsed as an expression.
            let saved = self.pos;
            self.parse_identifier()?;
            let is_assignment = self.peek() == Some('=') && !self.rest().starts_with("==");
            self.pos = saved;
            if is_assignment {
                return self.parse_assignment();
            }
        }
        let expr = self.parse_expression()?;
        self.expect(';')?;
        Ok(expr)
    }

    fn parse_assignment(&mut self) -> ParseResult<Node> {
        let name = self.parse_identifier()?;
        self.expect('=')?;
        let value = self.parse_expression()?;
        self.expect(';')?;
        Ok(Node::assignment(name, value))
    }

    fn parse_if(&mut self) -> ParseResult<Node> {
        self.expect('(')?;
        let condition = self.parse_expression()?;
        self.expect(')')?;
        let then_branch = self.parse_statement()?;
        let else_branch = if self.match_keyword("else") {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(Node::if_else(condition, then_branch, else_branch))
    }

    fn parse_while(&mut self) -> ParseResult<Node> {
        self.expect('(')?;
        let condition = self.parse_expression()?;
        self.expect(')')?;
        let body = self.parse_statement()?;
        Ok(Node::while_loop(condition, body))
    }

    fn parse_print(&mut self) -> ParseResult<Node> {
        let expr = self.parse_expression()?;
        self.expect(';')?;
        Ok(Node::print(expr))
    }

    fn parse_block(&mut self) -> ParseResult<Node> {
        self.expect('{')?;
        let statements = self.parse_statements()?;
        self.expect('}')?;
        Ok(Node::Block(statements))
    }

    fn parse_expression(&mut self) -> ParseResult<Node> {
        self.parse_equality()
    }

    fn parse_equality(&mut self) -> ParseResult<Node> {
        self.parse_left_associative(
            &[
                ("==", BinaryOperator::Equal),
                ("!=", BinaryOperator::NotEqual),
            ],
            Self::parse_relational,
        )
    }

    fn parse_relational(&mut self) -> ParseResult<Node> {
        // Two-character operators first, so `<=` never reads as `<`.
        self.parse_left_associative(
            &[
                ("<=", BinaryOperator::LessEqual),
                (">=", BinaryOperator::GreaterEqual),
                ("<", BinaryOperator::Less),
                (">", BinaryOperator::Greater),
            ],
            Self::parse_additive,
        )
    }

    fn parse_additive(&mut self) -> ParseResult<Node> {
        self.parse_left_associative(
            &[("+", BinaryOperator::Add), ("-", BinaryOperator::Sub)],
            Self::parse_term,
        )
    }

    fn parse_term(&mut self) -> ParseResult<Node> {
        self.parse_left_associative(
            &[("*", BinaryOperator::Mul), ("/", BinaryOperator::Div)],
            Self::parse_factor,
        )
    }

    fn parse_left_associative(
        &mut self,
        operators: &[(&str, BinaryOperator)],
        operand: fn(&mut Self) -> ParseResult<Node>,
    ) -> ParseResult<Node> {
        let mut node = operand(self)?;
        'fold: loop {
            for (symbol, op) in operators {
                if self.match_symbol(symbol) {
                    let right = operand(self)?;
                    node = Node::binary(*op, node, right);
                    continue 'fold;
                }
            }
            return Ok(node);
        }
    }

    fn parse_factor(&mut self) -> ParseResult<Node> {
        match self.peek() {
            Some(ch) if ch.is_ascii_digit() => self.parse_integer(),
            Some('(') => {
                self.bump();
                let expr = self.parse_expression()?;
                self.expect(')')?;
                Ok(expr)
            }
            Some(ch) if is_identifier_start(ch) => Ok(Node::Identifier(self.parse_identifier()?)),
            found => Err(ParseError::UnexpectedCharacter {
                found: found.into(),
                position: self.position(),
            }),
        }
    }

    fn parse_integer(&mut self) -> ParseResult<Node> {
        self.skip_whitespace();
        let start = self.pos;
        let digits = self.take_while(|ch| ch.is_ascii_digit());
        digits
            .parse::<i64>()
            .map(Node::Literal)
            .map_err(|_| ParseError::IntegerOutOfRange {
                literal: digits.to_string(),
                position: Position::locate(self.input, start),
            })
    }

    fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(ch) if is_identifier_start(ch) => {
                Ok(self.take_while(is_identifier_continue).to_string())
            }
            found => Err(ParseError::ExpectedIdentifier {
                found: found.into(),
                position: self.position(),
            }),
        }
    }

    fn expect(&mut self, expected: char) -> ParseResult<()> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            found => Err(ParseError::ExpectedCharacter {
                expected,
                found: found.into(),
                position: self.position(),
            }),
        }
    }

    /// Consumes `keyword` only when it is a whole word.
    fn match_keyword(&mut self, keyword: &str) -> bool {
        debug_assert!(KEYWORDS.contains(&keyword));
        self.skip_whitespace();
        let rest = self.rest();
        let whole_word = rest.starts_with(keyword)
            && !rest[keyword.len()..]
                .chars()
                .next()
                .is_some_and(is_identifier_continue);
        if whole_word {
            self.pos += keyword.len();
        }
        whole_word
    }

    fn match_symbol(&mut self, symbol: &str) -> bool {
        self.skip_whitespace();
        if self.rest().starts_with(symbol) {
            self.pos += symbol.len();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        let len = self
            .rest()
            .find(|ch: char| !predicate(ch))
            .unwrap_or(self.rest().len());
        self.pos += len;
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.rest().chars().next() {
            self.pos += ch.len_utf8();
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn position(&self) -> Position {
        Position::locate(self.input, self.pos)
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

pub fn parse(input: &str) -> ParseResult<Node> {
    Parser::new(input).parse_program()
}
