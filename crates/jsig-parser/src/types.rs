//! Type expression parsing

use super::*;

impl Parser {
    pub(crate) fn parse_type(&mut self) -> ParseResult<TypeNode> {
        self.parse_union_type()
    }

    pub(crate) fn parse_union_type(&mut self) -> ParseResult<TypeNode> {
        let first = self.parse_intersection_type()?;
        if !self.check(&TokenKind::Pipe) {
            return Ok(first);
        }

        let mut unions = vec![Arc::new(first)];
        while self.check(&TokenKind::Pipe) {
            self.advance();
            unions.push(Arc::new(self.parse_intersection_type()?));
        }

        Ok(TypeNode::union(unions))
    }

    pub(crate) fn parse_intersection_type(&mut self) -> ParseResult<TypeNode> {
        let first = self.parse_primary_type()?;
        if !self.check(&TokenKind::Amp) {
            return Ok(first);
        }

        let mut intersections = vec![Arc::new(first)];
        while self.check(&TokenKind::Amp) {
            self.advance();
            intersections.push(Arc::new(self.parse_primary_type()?));
        }

        Ok(TypeNode::intersection(intersections))
    }

    pub(crate) fn parse_primary_type(&mut self) -> ParseResult<TypeNode> {
        match self.current_token().kind {
            TokenKind::Identifier => {
                let name = self.advance().value.clone();
                match name.as_str() {
                    "true" | "false" => Ok(TypeNode::value(name)),
                    _ if self.check(&TokenKind::Lt) => self.parse_generic(name),
                    _ => Ok(TypeNode::literal(name)),
                }
            }
            TokenKind::StringLiteral => {
                let value = self.advance().value.clone();
                Ok(TypeNode::value(format!("\"{}\"", value)))
            }
            TokenKind::NumberLiteral => {
                let value = self.advance().value.clone();
                Ok(TypeNode::value(value))
            }
            TokenKind::LBrace => self.parse_object_type(),
            TokenKind::LBracket => self.parse_tuple_type(),
            TokenKind::LParen => self.parse_function_type(),
            _ => Err(self.error(format!(
                "Expected type, found {:?}",
                self.current_token().kind
            ))),
        }
    }

    /// Name<A, B>
    fn parse_generic(&mut self, name: String) -> ParseResult<TypeNode> {
        self.consume(TokenKind::Lt)?;

        let mut generics = Vec::new();
        loop {
            generics.push(Arc::new(self.parse_type()?));
            if !self.check(&TokenKind::Comma) {
                break;
            }
            self.advance();
        }
        self.consume(TokenKind::Gt)?;

        Ok(TypeNode::generic(TypeNode::literal(name), generics))
    }

    /// { key: T, other?: U }
    fn parse_object_type(&mut self) -> ParseResult<TypeNode> {
        self.consume(TokenKind::LBrace)?;

        let mut key_values = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let key = if self.check(&TokenKind::StringLiteral) {
                self.advance().value.clone()
            } else {
                self.parse_name()?
            };
            let optional = self.consume_question();
            self.consume(TokenKind::Colon)?;
            let value = self.parse_type()?;
            key_values.push(KeyValue::new(key, value).optional(optional));

            // Fields are separated by `,` or `;`; a trailing separator is fine
            if self.check(&TokenKind::Comma) || self.check(&TokenKind::Semicolon) {
                self.advance();
            } else if !self.check(&TokenKind::RBrace) {
                return Err(self.error(format!(
                    "Expected ',' or '}}' in object type, found {:?}",
                    self.current_token().kind
                )));
            }
        }
        self.consume(TokenKind::RBrace)?;

        Ok(TypeNode::object(key_values))
    }

    /// [A, B]
    fn parse_tuple_type(&mut self) -> ParseResult<TypeNode> {
        self.consume(TokenKind::LBracket)?;

        let mut values = Vec::new();
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            values.push(Arc::new(self.parse_type()?));
            if !self.check(&TokenKind::RBracket) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RBracket)?;

        Ok(TypeNode::tuple(values))
    }

    /// (this: T, a: A, b?: B) => R, or a parenthesized type
    fn parse_function_type(&mut self) -> ParseResult<TypeNode> {
        self.consume(TokenKind::LParen)?;

        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_function_arg()?);
            if !self.check(&TokenKind::RParen) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RParen)?;

        if !self.check(&TokenKind::FatArrow) {
            return match args.pop() {
                Some(inner) if args.is_empty() && inner.label.is_none() && !inner.optional => {
                    Ok(inner)
                }
                _ => Err(self.error("Expected '=>' after argument list".to_string())),
            };
        }
        self.consume(TokenKind::FatArrow)?;
        let result = self.parse_type()?;

        let has_this = args
            .first()
            .is_some_and(|first| first.label.as_deref() == Some("this"));
        let this_arg = if has_this {
            Some(Arc::new(args.remove(0)))
        } else {
            None
        };

        Ok(TypeNode::function(
            args.into_iter().map(Arc::new).collect(),
            this_arg,
            result,
        ))
    }

    fn parse_function_arg(&mut self) -> ParseResult<TypeNode> {
        let labelled = self.is_name_token()
            && match self.peek_kind(1) {
                Some(TokenKind::Colon) => true,
                Some(TokenKind::Question) => self.peek_kind(2) == Some(&TokenKind::Colon),
                _ => false,
            };

        if !labelled {
            return self.parse_type();
        }

        let label = self.parse_name()?;
        let optional = self.consume_question();
        self.consume(TokenKind::Colon)?;

        Ok(self.parse_type()?.with_label(label).with_optional(optional))
    }
}
