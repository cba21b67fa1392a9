//! Diagnostics reported to the user and faults that abort a check.

use std::fmt;

use jsig_ast::{Node, SourceLocation};
use thiserror::Error;

/// Every user-facing error the checker can report
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticKind {
    #[error("Got unexpected type class. Expected {expected} but got {actual}")]
    TypeClassMismatch { expected: String, actual: String },

    #[error(
        "Expected the field: {field_name} to be defined in constructor {func_name} but instead found: {other_field}."
    )]
    MissingFieldInConstr {
        field_name: String,
        other_field: String,
        func_name: String,
    },

    #[error(
        "Expected the function {func_name} to have exactly {expected_args} arguments but instead has {actual_args}."
    )]
    TooManyArgsInFunc {
        func_name: String,
        expected_args: usize,
        actual_args: usize,
    },

    #[error(
        "Expected the function {func_name} to have exactly {expected_args} arguments but instead has {actual_args}."
    )]
    TooFewArgsInFunc {
        func_name: String,
        expected_args: usize,
        actual_args: usize,
    },

    #[error(
        "Expected the new call on constructor {func_name} to have exactly {expected_args} arguments but instead has {actual_args}."
    )]
    TooManyArgsInNewExpression {
        func_name: String,
        expected_args: usize,
        actual_args: usize,
    },

    #[error(
        "Expected the new call on constructor {func_name} to have exactly {expected_args} arguments but instead has {actual_args}."
    )]
    TooFewArgsInNewExpression {
        func_name: String,
        expected_args: usize,
        actual_args: usize,
    },

    #[error("Object {obj_name} does not have field {field_name}.")]
    NonExistentField { field_name: String, obj_name: String },

    #[error("Expected function {func_name} to return void but found: {actual}.")]
    NonVoidReturnType {
        expected: String,
        actual: String,
        func_name: String,
    },

    #[error("Expected function {func_name} to return {expected} but found no return statement.")]
    MissingReturnStatement {
        expected: String,
        actual: String,
        func_name: String,
    },

    #[error("Expected the function {func_name} to have type but could not find one.")]
    UntypedFunctionFound { func_name: String },

    #[error(
        "Cannot call `new` on plain function {func_name}. The function type {func_type} is not a constructor."
    )]
    CallingNewOnPlainFunction { func_name: String, func_type: String },

    #[error(
        "Constructor function {func_name} must be pascal case. Cannot call `new` on function type {func_type}."
    )]
    ConstructorMustBePascalCase { func_name: String, func_type: String },

    #[error(
        "Constructor {func_name} must have non-empty thisType. Cannot have non-object or empty object this ({this_type})."
    )]
    ConstructorThisTypeMustBeObject { func_name: String, this_type: String },

    #[error("Constructor {func_name} must return void. Cannot return type: {return_type}.")]
    ConstructorMustReturnVoid { func_name: String, return_type: String },

    #[error(
        "Constructor {func_name} has unexpected return statement. Expected no return but found type: {return_type}."
    )]
    ReturnStatementInConstructor { func_name: String, return_type: String },

    #[error(
        "Cannot read field {field_name} of union. Expected an object type but found {union_type}."
    )]
    UnionFieldAccess { field_name: String, union_type: String },

    #[error("Could not load header file {file_name}: {reason}")]
    HeaderLoadFailed { file_name: String, reason: String },
}

impl DiagnosticKind {
    /// Stable namespaced tag, suitable for filtering and tests
    pub fn tag(&self) -> &'static str {
        match self {
            DiagnosticKind::TypeClassMismatch { .. } => "jsig.sub-type.type-class-mismatch",
            DiagnosticKind::MissingFieldInConstr { .. } => "jsig.verify.missing-field-in-constructor",
            DiagnosticKind::TooManyArgsInFunc { .. } => "jsig.verify.too-many-function-args",
            DiagnosticKind::TooFewArgsInFunc { .. } => "jsig.verify.too-few-function-args",
            DiagnosticKind::TooManyArgsInNewExpression { .. } => {
                "jsig.verify.too-many-args-in-new-expression"
            }
            DiagnosticKind::TooFewArgsInNewExpression { .. } => {
                "jsig.verify.too-few-args-in-new-expression"
            }
            DiagnosticKind::NonExistentField { .. } => "jsig.verify.non-existant-field",
            DiagnosticKind::NonVoidReturnType { .. } => "jsig.verify.non-void-return-type",
            DiagnosticKind::MissingReturnStatement { .. } => "jsig.verify.missing-return-statement",
            DiagnosticKind::UntypedFunctionFound { .. } => "jsig.verify.untyped-function-found",
            DiagnosticKind::CallingNewOnPlainFunction { .. } => {
                "jsig.verify.calling-new-on-plain-function"
            }
            DiagnosticKind::ConstructorMustBePascalCase { .. } => {
                "jsig.verify.constructor-must-be-pascal-case"
            }
            DiagnosticKind::ConstructorThisTypeMustBeObject { .. } => {
                "jsig.verify.constructor-this-type-must-be-object"
            }
            DiagnosticKind::ConstructorMustReturnVoid { .. } => {
                "jsig.verify.constructor-must-return-void"
            }
            DiagnosticKind::ReturnStatementInConstructor { .. } => {
                "jsig.verify.return-statement-in-constructor"
            }
            DiagnosticKind::UnionFieldAccess { .. } => "jsig.verify.accessing-field-on-union",
            DiagnosticKind::HeaderLoadFailed { .. } => "jsig.verify.header-load-failed",
        }
    }
}

/// A reported type error with its source location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub loc: SourceLocation,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, loc: SourceLocation) -> Self {
        Self {
            kind,
            line: loc.start.line,
            loc,
        }
    }

    /// Diagnostic located at a source node
    pub fn at(kind: DiagnosticKind, node: &Node) -> Self {
        Self::new(kind, node.loc)
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}: {}", self.line, self.kind)
    }
}

impl std::error::Error for Diagnostic {}

/// The checker reached a state it cannot reason about.
///
/// Faults are never collected; they abort the whole verification pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalFault {
    #[error("sub-type check is not implemented for {kind} parents")]
    UnsupportedParent { kind: &'static str },

    #[error("sub-type check is not implemented for non-builtin literal {name}")]
    NonBuiltinLiteral { name: String },

    #[error("impossible builtin mismatch: expected {expected} but got {actual}")]
    BuiltinMismatch { expected: String, actual: String },

    #[error("sub-type check is not implemented for builtin {name}")]
    UnknownBuiltin { name: String },

    #[error("generic arity mismatch: expected {expected} parameters but got {actual}")]
    GenericArityMismatch { expected: usize, actual: usize },

    #[error("function argument count mismatch: expected {expected} but got {actual}")]
    FunctionArgsMismatch { expected: usize, actual: usize },

    #[error("object field count mismatch: expected {expected} but got {actual}")]
    ObjectFieldsMismatch { expected: usize, actual: usize },
}

/// Outcome of a compatibility check: `Ok(None)` when compatible
pub type CheckResult = Result<Option<Diagnostic>, InternalFault>;
