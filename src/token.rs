use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

/// Display categories of the diagnostic tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Keyword,
    Identifier,
    Number,
    Operator,
    Separator,
    String,
    Comment,
    Unknown,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenCategory::Keyword => "Keyword",
            TokenCategory::Identifier => "Identifier",
            TokenCategory::Number => "Number",
            TokenCategory::Operator => "Operator",
            TokenCategory::Separator => "Separator",
            TokenCategory::String => "String",
            TokenCategory::Comment => "Comment",
            TokenCategory::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub category: TokenCategory,
    pub lexeme: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(category: TokenCategory, lexeme: &'a str, span: Span) -> Self {
        Self {
            category,
            lexeme,
            span,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Line {}: {} [{}]",
            self.span.line, self.lexeme, self.category
        )
    }
}
