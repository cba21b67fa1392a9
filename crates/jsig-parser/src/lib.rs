//! # Jsig Parser
//!
//! Recursive descent parser for header (`.hjs`) signature files.

use std::sync::Arc;

use jsig_ast::*;
use jsig_lexer::{Lexer, Token, TokenKind};

// Module declarations
mod error;
mod parser;
mod types;
mod helpers;

// Re-export public types
pub use error::{ParseError, ParseResult};
pub use parser::Parser;

/// Lex and parse a header file in one step
pub fn parse_header(source: &str) -> Result<HeaderProgram, Vec<ParseError>> {
    let tokens = Lexer::new(source).tokenize();
    Parser::new(tokens).parse_program()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<HeaderProgram, Vec<ParseError>> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize();
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn assignment(source: &str) -> Arc<TypeNode> {
        let program = parse(source).unwrap();
        let ty = program.assignments().next().unwrap().type_expression.clone();
        ty
    }

    #[test]
    fn test_parse_assignment() {
        let program = parse("add : (a: Number, b: Number) => Number").unwrap();
        assert_eq!(program.statements.len(), 1);

        let Statement::Assignment(assignment) = &program.statements[0] else {
            panic!("expected assignment");
        };
        assert_eq!(assignment.identifier, "add");
        let TypeKind::Function { args, this_arg, result } = &assignment.type_expression.kind else {
            panic!("expected function type");
        };
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].label.as_deref(), Some("a"));
        assert!(this_arg.is_none());
        assert_eq!(result.literal_name(), Some("Number"));
    }

    #[test]
    fn test_parse_this_arg() {
        let ty = assignment("greet : (this: Person, greeting?: String) => void");
        let TypeKind::Function { args, this_arg, .. } = &ty.kind else {
            panic!("expected function type");
        };
        assert_eq!(args.len(), 1);
        assert!(args[0].optional);
        let this_arg = this_arg.as_ref().unwrap();
        assert_eq!(this_arg.label.as_deref(), Some("this"));
        assert_eq!(this_arg.literal_name(), Some("Person"));
    }

    #[test]
    fn test_parse_constructor_object() {
        let ty = assignment("Point : (x: Number, y: Number) => { x: Number; y: Number; }");
        let TypeKind::Function { result, .. } = &ty.kind else {
            panic!("expected function type");
        };
        assert!(result.is_non_empty_object());
        assert_eq!(result.field("y").map(|kv| kv.value.literal_name()), Some(Some("Number")));
    }

    #[test]
    fn test_parse_type_declaration_with_generics() {
        let program = parse("type Pair<A, B> : [A, B]\npair : Pair<String, Number>").unwrap();
        let decl = program.type_declarations().next().unwrap();
        assert_eq!(decl.identifier, "Pair");
        assert_eq!(decl.generics.len(), 2);
        assert!(matches!(decl.type_expression.kind, TypeKind::Tuple { ref values } if values.len() == 2));

        let assignment = program.assignments().next().unwrap();
        let TypeKind::Generic { value, generics } = &assignment.type_expression.kind else {
            panic!("expected generic type");
        };
        assert_eq!(value.literal_name(), Some("Pair"));
        assert_eq!(generics.len(), 2);
    }

    #[test]
    fn test_parse_import() {
        let program = parse("import { Widget, Gadget } from \"./widgets\"").unwrap();
        let Statement::Import(import) = &program.statements[0] else {
            panic!("expected import");
        };
        assert_eq!(import.dependency, "./widgets");
        assert_eq!(import.types[1].literal_name(), Some("Gadget"));
    }

    #[test]
    fn test_parse_unions_and_values() {
        let ty = assignment("mode : \"read\" | \"write\" & Flag | 42 | true");
        let TypeKind::Union { unions } = &ty.kind else {
            panic!("expected union");
        };
        assert_eq!(unions.len(), 4);
        assert!(matches!(&unions[0].kind, TypeKind::Value { value } if value == "\"read\""));
        assert!(matches!(&unions[1].kind, TypeKind::Intersection { intersections } if intersections.len() == 2));
        assert!(matches!(&unions[2].kind, TypeKind::Value { value } if value == "42"));
        assert!(matches!(&unions[3].kind, TypeKind::Value { value } if value == "true"));
    }

    #[test]
    fn test_parse_parenthesized_type() {
        let ty = assignment("maybe : (String | Number)");
        assert!(matches!(ty.kind, TypeKind::Union { .. }));
    }

    #[test]
    fn test_keywords_as_names() {
        let program = parse("type : String\nopts : { from: String, \"import\": Number }").unwrap();
        let names: Vec<&str> = program.assignments().map(|a| a.identifier.as_str()).collect();
        assert_eq!(names, vec!["type", "opts"]);

        let opts = &program.assignments().nth(1).unwrap().type_expression;
        assert!(opts.field("from").is_some());
        assert!(opts.field("import").is_some());
    }

    #[test]
    fn test_comments_and_semicolons() {
        let source = "-- math helpers\nadd : (Number, Number) => Number;\n// negation\nneg : (Number) => Number";
        let program = parse(source).unwrap();
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_render_round_trip() {
        let source = "add : (a: Number, b?: Number) => Number";
        let program = parse(source).unwrap();
        assert_eq!(render_program(&program, RenderOptions::default()), source);
    }

    #[test]
    fn test_error_recovery() {
        let errors = parse("broken : (a: Number\nfine : String\nalso broken : ").unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_lexer_error_message() {
        let errors = parse("foo : \"unterminated").unwrap_err();
        assert_eq!(errors[0].message, "Unterminated string literal");
    }

    #[test]
    fn test_parse_header_helper() {
        let program = parse_header("").unwrap();
        assert!(program.statements.is_empty());
    }
}
