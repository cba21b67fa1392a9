//! Core Parser struct and statement parsing

use super::*;

/// Recursive descent parser for header signature files
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) current: usize,
}

impl Parser {
    /// Creates a new parser from a token stream
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let end = tokens.last().map(|t| t.span.end).unwrap_or(0);
            tokens.push(Token::new(TokenKind::Eof, Span::new(end, end, 0), String::new()));
        }
        Self { tokens, current: 0 }
    }

    /// Parses a complete header file
    pub fn parse_program(&mut self) -> Result<HeaderProgram, Vec<ParseError>> {
        let mut statements = Vec::new();
        let mut errors = Vec::new();

        while !self.is_at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    errors.push(err);
                    self.synchronize();
                }
            }
        }

        if errors.is_empty() {
            Ok(HeaderProgram { statements })
        } else {
            Err(errors)
        }
    }

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        let is_name = self.peek_kind(1) == Some(&TokenKind::Colon);

        let stmt = match self.current_token().kind {
            TokenKind::Import if !is_name => Statement::Import(self.parse_import()?),
            TokenKind::Type if !is_name => Statement::TypeDeclaration(self.parse_type_declaration()?),
            _ if self.is_name_token() => Statement::Assignment(self.parse_assignment()?),
            _ => {
                return Err(self.error(format!(
                    "Expected statement, found {:?}",
                    self.current_token().kind
                )))
            }
        };

        self.consume_semicolon();
        Ok(stmt)
    }

    /// import { A, B } from "dep"
    pub(crate) fn parse_import(&mut self) -> ParseResult<Import> {
        self.consume(TokenKind::Import)?;
        self.consume(TokenKind::LBrace)?;

        let mut types = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let name = self.parse_name()?;
            types.push(Arc::new(TypeNode::literal(name)));

            if !self.check(&TokenKind::RBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBrace)?;

        self.consume(TokenKind::From)?;
        let dependency = self.consume(TokenKind::StringLiteral)?.value.clone();

        Ok(Import { dependency, types })
    }

    /// type Name<T> : expr
    pub(crate) fn parse_type_declaration(&mut self) -> ParseResult<TypeDeclaration> {
        self.consume(TokenKind::Type)?;
        let identifier = self.parse_name()?;

        let mut generics = Vec::new();
        if self.check(&TokenKind::Lt) {
            self.advance();
            loop {
                let name = self.parse_name()?;
                generics.push(Arc::new(TypeNode::literal(name)));
                if !self.check(&TokenKind::Comma) {
                    break;
                }
                self.advance();
            }
            self.consume(TokenKind::Gt)?;
        }

        self.consume(TokenKind::Colon)?;
        let type_expression = Arc::new(self.parse_type()?);

        Ok(TypeDeclaration {
            identifier,
            generics,
            type_expression,
        })
    }

    /// name : expr
    pub(crate) fn parse_assignment(&mut self) -> ParseResult<Assignment> {
        let identifier = self.parse_name()?;
        self.consume(TokenKind::Colon)?;
        let type_expression = Arc::new(self.parse_type()?);

        Ok(Assignment {
            identifier,
            type_expression,
        })
    }
}
