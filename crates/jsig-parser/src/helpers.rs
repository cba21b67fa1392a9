//! Helper methods and utilities

use super::*;

impl Parser {
    /// Identifier, or a keyword used in name position
    pub(crate) fn parse_name(&mut self) -> ParseResult<String> {
        if self.is_name_token() {
            Ok(self.advance().value.clone())
        } else {
            Err(self.error(format!(
                "Expected name, found {:?}",
                self.current_token().kind
            )))
        }
    }

    pub(crate) fn is_name_token(&self) -> bool {
        let kind = &self.current_token().kind;
        *kind == TokenKind::Identifier || kind.is_keyword()
    }

    pub(crate) fn consume_question(&mut self) -> bool {
        if self.check(&TokenKind::Question) {
            self.advance();
            true
        } else {
            false
        }
    }

    // =========================================================================
    // Utility Methods (Token Manipulation)
    // =========================================================================

    pub(crate) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(crate) fn previous_token(&self) -> &Token {
        &self.tokens[(self.current.saturating_sub(1)).min(self.tokens.len() - 1)]
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous_token()
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        !self.is_at_end() && &self.current_token().kind == kind
    }

    pub(crate) fn peek_kind(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.current + offset).map(|t| &t.kind)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.current_token().kind == TokenKind::Eof
    }

    pub(crate) fn consume(&mut self, kind: TokenKind) -> ParseResult<&Token> {
        if self.check(&kind) {
            Ok(self.advance())
        } else {
            Err(self.error(format!("Expected {:?}, found {:?}", kind, self.current_token().kind)))
        }
    }

    pub(crate) fn consume_semicolon(&mut self) {
        if self.check(&TokenKind::Semicolon) {
            self.advance();
        }
    }

    pub(crate) fn error(&self, message: String) -> ParseError {
        let token = self.current_token();
        // Lexer errors carry their own message
        let message = if token.kind == TokenKind::Error {
            token.value.clone()
        } else {
            message
        };

        ParseError {
            message,
            span: token.span,
        }
    }

    /// Skip ahead to something that looks like the start of a statement
    pub(crate) fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous_token().kind == TokenKind::Semicolon {
                return;
            }

            match self.current_token().kind {
                TokenKind::Type | TokenKind::Import
                    if self.peek_kind(1) != Some(&TokenKind::Colon) =>
                {
                    return
                }
                TokenKind::Identifier if self.peek_kind(1) == Some(&TokenKind::Colon) => {
                    if !matches!(
                        self.previous_token().kind,
                        TokenKind::LBrace | TokenKind::Comma | TokenKind::LParen
                    ) {
                        return;
                    }
                }
                _ => {}
            }

            self.advance();
        }
    }
}
