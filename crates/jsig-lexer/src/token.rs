use jsig_ast::Span;

/// Token kinds of the header (`.hjs`) signature language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Type,
    Import,
    From,

    // Literals
    NumberLiteral,
    StringLiteral,

    // Identifier
    Identifier,

    // Operators
    Pipe,              // |
    Amp,               // &
    FatArrow,          // =>
    Question,          // ?

    // Delimiters
    LParen,            // (
    RParen,            // )
    LBrace,            // {
    RBrace,            // }
    LBracket,          // [
    RBracket,          // ]
    Lt,                // <
    Gt,                // >
    Comma,             // ,
    Colon,             // :
    Semicolon,         // ;

    // Special
    Eof,
    Error,
}

impl TokenKind {
    /// Keywords may still be used as field and parameter names
    pub fn is_keyword(&self) -> bool {
        matches!(self, TokenKind::Type | TokenKind::Import | TokenKind::From)
    }
}

/// Represents a token with its kind, span, and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, value: String) -> Self {
        Self { kind, span, value }
    }
}
