//! Diagnostic tokenizer.
//!
//! Classifies source text into display categories for inspection. The parser
//! reads characters directly and never consumes these tokens, so the lexer
//! never fails: anything it cannot classify becomes an `Unknown` token.

use std::{iter::Peekable, str::CharIndices};

use crate::token::{Span, Token, TokenCategory};

const KEYWORDS: [&str; 4] = ["if", "else", "while", "print"];
const TWO_CHAR_OPERATORS: [&str; 4] = ["==", "!=", "<=", ">="];

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        self.skip_whitespace();
        let &(start, ch) = self.chars.peek()?;
        let line = self.line;
        let column = self.column;
        let input = self.input;
        let rest = &input[start..];

        let category = if rest.starts_with("//") {
            self.advance_while(|c| c != '\n');
            TokenCategory::Comment
        } else if ch.is_alphabetic() || ch == '_' {
            self.advance_while(|c| c.is_alphanumeric() || c == '_');
            let end = self.current_index();
            if KEYWORDS.contains(&&self.input[start..end]) {
                TokenCategory::Keyword
            } else {
                TokenCategory::Identifier
            }
        } else if ch.is_ascii_digit() {
            self.read_number();
            TokenCategory::Number
        } else if TWO_CHAR_OPERATORS.iter().any(|op| rest.starts_with(op)) {
            self.advance_char();
            self.advance_char();
            TokenCategory::Operator
        } else if "+-*/=<>".contains(ch) {
            self.advance_char();
            TokenCategory::Operator
        } else if "(){}[],;".contains(ch) {
            self.advance_char();
            TokenCategory::Separator
        } else if ch == '"' && self.read_string() {
            TokenCategory::String
        } else {
            self.advance_char();
            TokenCategory::Unknown
        };

        let end = self.current_index();
        Some(Token::new(
            category,
            &self.input[start..end],
            Span {
                start,
                end,
                line,
                column,
            },
        ))
    }

    fn read_number(&mut self) {
        self.advance_while(|c| c.is_ascii_digit());
        // A fractional part only counts when a digit follows the dot.
        let mut lookahead = self.chars.clone();
        if matches!(lookahead.next(), Some((_, '.')))
            && lookahead.next().is_some_and(|(_, c)| c.is_ascii_digit())
        {
            self.advance_char();
            self.advance_while(|c| c.is_ascii_digit());
        }
    }

    /// Consumes a string literal closed on the same line. Leaves the input
    /// untouched and returns false when there is no closing quote.
    fn read_string(&mut self) -> bool {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        let mut escaped = false;
        let mut len = 1;
        for (_, c) in lookahead {
            len += 1;
            match c {
                '\n' => return false,
                '\\' if !escaped => escaped = true,
                '"' if !escaped => {
                    for _ in 0..len {
                        self.advance_char();
                    }
                    return true;
                }
                _ => escaped = false,
            }
        }
        false
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }

    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(&(_, c)) = self.chars.peek() {
            if !predicate(c) {
                break;
            }
            self.advance_char();
        }
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}
