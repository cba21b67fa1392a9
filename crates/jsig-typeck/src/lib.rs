//! # Jsig Type Checker
//!
//! Checks an ESTree program against the signatures declared in its sibling
//! header file. Mismatches are collected as [`Diagnostic`]s; states the
//! checker cannot reason about abort the pass with an [`InternalFault`].

mod error;
mod header;
mod program;
mod scope;
mod sub_type;
mod verifiers;

#[cfg(test)]
mod testing;

// Re-export public API
pub use error::{CheckResult, Diagnostic, DiagnosticKind, InternalFault};
pub use header::{header_file_name, HeaderFile, HeaderLoadError, HeaderLoader};
pub use program::{ProgramMeta, VerifyResult};
pub use scope::{
    is_constructor_name, Binding, BindingOrigin, FunctionScope, Scope, ScopeId, ScopeKind,
    MODULE_TYPE, REQUIRE_TYPE,
};
pub use sub_type::SubTypeChecker;

use jsig_ast::Node;

// =============================================================================
// Public API
// =============================================================================

/// Verify a program against its header and return every diagnostic
pub fn check_program(
    ast: Node,
    file_name: &str,
    loader: Box<dyn HeaderLoader>,
) -> Result<Vec<Diagnostic>, InternalFault> {
    let mut meta = ProgramMeta::new(ast, file_name, loader);
    meta.verify()?;
    Ok(meta.into_errors())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn check(header: &str, body: Vec<Node>) -> Result<Vec<Diagnostic>, InternalFault> {
        let loader = MemoryLoader::new().with("add.hjs", header);
        check_program(program(body), "add.js", Box::new(loader))
    }

    fn tags(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
        diagnostics.iter().map(Diagnostic::tag).collect()
    }

    const POINT: &str = "Point : (x: Number, y: Number) => { x: Number, y: Number }";

    #[test]
    fn test_clean_program() {
        let errors = check(
            "add : (a: Number, b: Number) => Number",
            vec![
                function("add", &["a", "b"], vec![ret(Some(ident("a", 2)), 2)], 1),
                exports(ident("add", 4), 4),
            ],
        )
        .unwrap();

        assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);
    }

    #[test]
    fn test_untyped_function() {
        let errors = check("", vec![function("sub", &["a"], vec![], 3)]).unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            DiagnosticKind::UntypedFunctionFound {
                func_name: "sub".to_string()
            }
        );
        assert_eq!(errors[0].line, 3);
    }

    #[test]
    fn test_function_arity() {
        let header = "add : (a: Number, b: Number) => Number";

        let errors = check(header, vec![function("add", &["a"], vec![ret(Some(ident("a", 2)), 2)], 1)]).unwrap();
        assert_eq!(
            errors[0].kind,
            DiagnosticKind::TooFewArgsInFunc {
                func_name: "add".to_string(),
                expected_args: 2,
                actual_args: 1,
            }
        );

        let errors = check(
            header,
            vec![function("add", &["a", "b", "c"], vec![ret(Some(ident("a", 2)), 2)], 1)],
        )
        .unwrap();
        assert_eq!(tags(&errors), vec!["jsig.verify.too-many-function-args"]);
    }

    #[test]
    fn test_missing_return_statement() {
        let errors = check("name : () => String", vec![function("name", &[], vec![], 1)]).unwrap();

        assert_eq!(
            errors[0].kind,
            DiagnosticKind::MissingReturnStatement {
                expected: "String".to_string(),
                actual: "void".to_string(),
                func_name: "name".to_string(),
            }
        );
    }

    #[test]
    fn test_return_type_mismatch() {
        let errors = check(
            "name : () => String",
            vec![function("name", &[], vec![ret(Some(literal("42", 2)), 2)], 1)],
        )
        .unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "@2: Got unexpected type class. Expected String but got Number"
        );
    }

    #[test]
    fn test_non_void_return() {
        let errors = check(
            "log : (msg: String) => void",
            vec![function("log", &["msg"], vec![ret(Some(ident("msg", 2)), 2)], 1)],
        )
        .unwrap();

        assert_eq!(
            errors[0].kind,
            DiagnosticKind::NonVoidReturnType {
                expected: "void".to_string(),
                actual: "msg: String".to_string(),
                func_name: "log".to_string(),
            }
        );

        // A bare return is fine
        let errors = check(
            "log : (msg: String) => void",
            vec![function("log", &["msg"], vec![ret(None, 2)], 1)],
        )
        .unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_returns_inside_if_else() {
        let body = vec![if_stmt(
            ident("a", 2),
            vec![ret(Some(literal("'s'", 3)), 3)],
            Some(vec![ret(Some(ident("a", 5)), 5)]),
            2,
        )];
        let errors = check("pick : (a: Number) => Number", vec![function("pick", &["a"], body, 1)])
            .unwrap();

        // Both branches return, and each return is checked
        assert_eq!(errors.len(), 1, "unexpected diagnostics: {:?}", errors);
        assert_eq!(
            errors[0].to_string(),
            "@3: Got unexpected type class. Expected Number but got String"
        );
    }

    #[test]
    fn test_returns_inside_loops_and_try() {
        let errors = check(
            "log : (msg: String) => void",
            vec![function(
                "log",
                &["msg"],
                vec![try_stmt(vec![], vec![ret(Some(ident("msg", 3)), 3)], 2)],
                1,
            )],
        )
        .unwrap();
        assert_eq!(tags(&errors), vec!["jsig.verify.non-void-return-type"]);
        assert_eq!(errors[0].line, 3);

        let body = vec![
            stmt(assign(member(this(2), "x", 2), ident("x", 2), 2)),
            stmt(assign(member(this(3), "y", 3), ident("y", 3), 3)),
            while_stmt(ident("x", 4), vec![ret(None, 5)], 4),
        ];
        let errors = check(POINT, vec![function("Point", &["x", "y"], body, 1)]).unwrap();
        assert_eq!(tags(&errors), vec!["jsig.verify.return-statement-in-constructor"]);
        assert_eq!(errors[0].line, 5);
    }

    #[test]
    fn test_control_flow_tests_are_verified() {
        let errors = check(
            "shape : { r: Number }",
            vec![if_stmt(member(ident("shape", 1), "w", 1), vec![], None, 1)],
        )
        .unwrap();

        assert_eq!(tags(&errors), vec!["jsig.verify.non-existant-field"]);
    }

    #[test]
    fn test_hex_literal_is_checked() {
        let errors = check(
            "name : () => String",
            vec![function("name", &[], vec![ret(Some(literal("0x1F", 2)), 2)], 1)],
        )
        .unwrap();

        assert_eq!(
            errors[0].kind,
            DiagnosticKind::TypeClassMismatch {
                expected: "String".to_string(),
                actual: "Number".to_string(),
            }
        );
    }

    #[test]
    fn test_constructor_rules() {
        let body = vec![
            stmt(assign(member(this(2), "x", 2), ident("x", 2), 2)),
            stmt(assign(member(this(3), "y", 3), ident("y", 3), 3)),
        ];
        let errors = check(POINT, vec![function("Point", &["x", "y"], body, 1)]).unwrap();
        assert!(errors.is_empty(), "unexpected diagnostics: {:?}", errors);

        // Out of order field assignments
        let body = vec![
            stmt(assign(member(this(2), "y", 2), ident("y", 2), 2)),
            stmt(assign(member(this(3), "x", 3), ident("x", 3), 3)),
        ];
        let errors = check(POINT, vec![function("Point", &["x", "y"], body, 1)]).unwrap();
        assert_eq!(
            errors[0].kind,
            DiagnosticKind::MissingFieldInConstr {
                field_name: "x".to_string(),
                other_field: "y".to_string(),
                func_name: "Point".to_string(),
            }
        );

        // Returning from a constructor
        let body = vec![
            stmt(assign(member(this(2), "x", 2), ident("x", 2), 2)),
            stmt(assign(member(this(3), "y", 3), ident("y", 3), 3)),
            ret(Some(ident("x", 4)), 4),
        ];
        let errors = check(POINT, vec![function("Point", &["x", "y"], body, 1)]).unwrap();
        assert_eq!(tags(&errors), vec!["jsig.verify.return-statement-in-constructor"]);
        assert_eq!(errors[0].line, 4);
    }

    #[test]
    fn test_constructor_this_type_must_be_object() {
        let errors = check("Thing : () => void", vec![function("Thing", &[], vec![], 1)]).unwrap();

        assert_eq!(
            errors[0].kind,
            DiagnosticKind::ConstructorThisTypeMustBeObject {
                func_name: "Thing".to_string(),
                this_type: "void".to_string(),
            }
        );
    }

    #[test]
    fn test_new_expressions() {
        let header = format!(
            "{}\nadd : (a: Number, b: Number) => Number\nAdd : (a: Number) => Number",
            POINT
        );

        let errors = check(
            &header,
            vec![
                var("p", new_expr("Point", vec![literal("1", 2)], 2), 2),
                stmt(new_expr("add", vec![literal("1", 3), literal("2", 3)], 3)),
                stmt(new_expr("Add", vec![literal("1", 4)], 4)),
                var("q", new_expr("Point", vec![literal("1", 5), literal("2", 5)], 5), 5),
            ],
        )
        .unwrap();

        assert_eq!(
            tags(&errors),
            vec![
                "jsig.verify.too-few-args-in-new-expression",
                "jsig.verify.constructor-must-be-pascal-case",
                "jsig.verify.calling-new-on-plain-function",
            ]
        );
        assert_eq!(
            errors[1].kind,
            DiagnosticKind::ConstructorMustBePascalCase {
                func_name: "add".to_string(),
                func_type: "(a: Number, b: Number) => Number".to_string(),
            }
        );
    }

    #[test]
    fn test_field_access() {
        let errors = check(
            "Box : (v: Number) => { v: Number }\nshape : { r: Number } | { w: Number }",
            vec![
                var("b", new_expr("Box", vec![literal("1", 2)], 2), 2),
                var("v", member(ident("b", 3), "v", 3), 3),
                stmt(member(ident("b", 4), "z", 4)),
                stmt(member(ident("shape", 5), "r", 5)),
            ],
        )
        .unwrap();

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].kind,
            DiagnosticKind::NonExistentField {
                field_name: "z".to_string(),
                obj_name: "{ v: Number }".to_string(),
            }
        );
        assert_eq!(
            errors[1].kind,
            DiagnosticKind::UnionFieldAccess {
                field_name: "r".to_string(),
                union_type: "{ r: Number } | { w: Number }".to_string(),
            }
        );
    }

    #[test]
    fn test_call_arguments_checked() {
        let errors = check(
            "add : (a: Number, b: Number) => Number",
            vec![
                function("add", &["a", "b"], vec![ret(Some(ident("a", 2)), 2)], 1),
                stmt(call(ident("add", 4), vec![literal("'one'", 4), literal("2", 4)], 4)),
            ],
        )
        .unwrap();

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].kind,
            DiagnosticKind::TypeClassMismatch {
                expected: "a: Number".to_string(),
                actual: "String".to_string(),
            }
        );
        assert_eq!(errors[0].line, 4);
    }

    #[test]
    fn test_local_and_header_variables() {
        let errors = check(
            "limit : Number",
            vec![
                var("limit", literal("'ten'", 1), 1),
                var("count", literal("3", 2), 2),
                stmt(assign(ident("count", 3), literal("'three'", 3), 3)),
            ],
        )
        .unwrap();

        assert_eq!(
            tags(&errors),
            vec!["jsig.sub-type.type-class-mismatch", "jsig.sub-type.type-class-mismatch"]
        );
        assert_eq!(errors[0].line, 1);
        assert_eq!(errors[1].line, 3);
    }

    #[test]
    fn test_function_expression_takes_declarator_name() {
        let errors = check(
            "add : (a: Number, b: Number) => Number",
            vec![var("add", function_expr(&["a"], vec![ret(Some(ident("a", 2)), 2)], 1), 1)],
        )
        .unwrap();

        assert_eq!(tags(&errors), vec!["jsig.verify.too-few-function-args"]);
    }

    #[test]
    fn test_unsupported_nodes_are_skipped() {
        let errors = check("", vec![unsupported(1), stmt(unsupported(2))]).unwrap();
        assert!(errors.is_empty());
    }

    #[test]
    fn test_header_load_failure() {
        let errors = check_program(
            program(vec![function("sub", &[], vec![], 1)]),
            "lib/sub.js",
            Box::new(MemoryLoader::new()),
        )
        .unwrap();

        // Nothing past the header failure is verified
        assert_eq!(tags(&errors), vec!["jsig.verify.header-load-failed"]);
    }

    #[test]
    fn test_header_parse_failure() {
        let errors = check("add : (a: Number", vec![]).unwrap();
        assert_eq!(tags(&errors), vec!["jsig.verify.header-load-failed"]);
    }

    #[test]
    fn test_fault_aborts_check() {
        let result = check(
            "flag : (b: Boolean) => Boolean",
            vec![function("flag", &["b"], vec![ret(Some(ident("b", 2)), 2)], 1)],
        );

        assert_eq!(
            result,
            Err(InternalFault::UnknownBuiltin {
                name: "Boolean".to_string()
            })
        );
    }

    #[test]
    fn test_aliases_render_as_written() {
        let errors = check(
            "type Name : String\ngreet : () => Name",
            vec![function("greet", &[], vec![ret(Some(literal("1", 2)), 2)], 1)],
        )
        .unwrap();

        assert_eq!(
            errors[0].kind,
            DiagnosticKind::TypeClassMismatch {
                expected: "Name".to_string(),
                actual: "Number".to_string(),
            }
        );
    }
}
