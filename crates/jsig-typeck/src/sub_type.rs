//! Structural subtype checking between a declared (parent) type and an
//! inferred (child) type.

use std::sync::Arc;

use jsig_ast::{render, KeyValue, Node, RenderOptions, TypeKind, TypeNode, MODULE_EXPORTS_WILDCARD};

use crate::error::{CheckResult, Diagnostic, DiagnosticKind, InternalFault};

/// Decides whether a child type satisfies a parent type.
///
/// Dispatch happens on the parent's shape only. A compatible pair yields
/// `Ok(None)`, a user-facing mismatch yields `Ok(Some(..))`, and a pair the
/// checker cannot reason about yields an [`InternalFault`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SubTypeChecker;

impl SubTypeChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check_sub_type(&self, node: &Node, parent: &TypeNode, child: &TypeNode) -> CheckResult {
        match &parent.kind {
            TypeKind::Literal { name, builtin } => {
                self.check_literal(node, parent, name, *builtin, child)
            }
            TypeKind::Generic { value, generics } => {
                self.check_generic(node, parent, value, generics, child)
            }
            TypeKind::Function {
                args,
                this_arg,
                result,
            } => self.check_function(node, parent, args, this_arg.as_deref(), result, child),
            TypeKind::Object { key_values } => self.check_object(node, parent, key_values, child),
            TypeKind::Value { .. }
            | TypeKind::Union { .. }
            | TypeKind::Intersection { .. }
            | TypeKind::Tuple { .. } => Err(InternalFault::UnsupportedParent {
                kind: parent.kind_name(),
            }),
        }
    }

    fn check_literal(
        &self,
        node: &Node,
        parent: &TypeNode,
        name: &str,
        builtin: bool,
        child: &TypeNode,
    ) -> CheckResult {
        if !builtin {
            return Err(InternalFault::NonBuiltinLiteral {
                name: name.to_string(),
            });
        }

        if name == MODULE_EXPORTS_WILDCARD {
            return Ok(None);
        }

        let Some(child_name) = child.literal_name() else {
            return Ok(Some(type_mismatch(node, parent, child)));
        };

        match name {
            "Object" | "Array" | "void" if child_name != name => Err(InternalFault::BuiltinMismatch {
                expected: name.to_string(),
                actual: child_name.to_string(),
            }),
            "String" | "Number" if child_name != name => Ok(Some(type_mismatch(node, parent, child))),
            "Object" | "Array" | "void" | "String" | "Number" => Ok(None),
            _ => Err(InternalFault::UnknownBuiltin {
                name: name.to_string(),
            }),
        }
    }

    fn check_generic(
        &self,
        node: &Node,
        parent: &TypeNode,
        value: &TypeNode,
        generics: &[Arc<TypeNode>],
        child: &TypeNode,
    ) -> CheckResult {
        let TypeKind::Generic {
            value: child_value,
            generics: child_generics,
        } = &child.kind
        else {
            return Ok(Some(type_mismatch(node, parent, child)));
        };

        if let Some(diagnostic) = self.check_sub_type(node, value, child_value)? {
            return Ok(Some(diagnostic));
        }

        if generics.len() != child_generics.len() {
            return Err(InternalFault::GenericArityMismatch {
                expected: generics.len(),
                actual: child_generics.len(),
            });
        }

        for (expected, actual) in generics.iter().zip(child_generics) {
            // Only the outer pair is surfaced
            if self.check_sub_type(node, expected, actual)?.is_some() {
                return Ok(Some(type_mismatch(node, parent, child)));
            }
        }

        Ok(None)
    }

    fn check_function(
        &self,
        node: &Node,
        parent: &TypeNode,
        args: &[Arc<TypeNode>],
        this_arg: Option<&TypeNode>,
        result: &TypeNode,
        child: &TypeNode,
    ) -> CheckResult {
        let TypeKind::Function {
            args: child_args,
            this_arg: child_this,
            result: child_result,
        } = &child.kind
        else {
            return Ok(Some(type_mismatch(node, parent, child)));
        };

        if let Some(diagnostic) = self.check_sub_type(node, result, child_result)? {
            return Ok(Some(diagnostic));
        }

        match (this_arg, child_this.as_deref()) {
            (Some(expected), Some(actual)) => {
                if let Some(diagnostic) = self.check_sub_type(node, expected, actual)? {
                    return Ok(Some(diagnostic));
                }
            }
            (None, None) => {}
            // Receiver declared on one side only
            _ => return Ok(Some(type_mismatch(node, parent, child))),
        }

        if args.len() != child_args.len() {
            return Err(InternalFault::FunctionArgsMismatch {
                expected: args.len(),
                actual: child_args.len(),
            });
        }

        for (expected, actual) in args.iter().zip(child_args) {
            if let Some(diagnostic) = self.check_sub_type(node, expected, actual)? {
                return Ok(Some(diagnostic));
            }
        }

        Ok(None)
    }

    fn check_object(
        &self,
        node: &Node,
        parent: &TypeNode,
        key_values: &[KeyValue],
        child: &TypeNode,
    ) -> CheckResult {
        let TypeKind::Object {
            key_values: child_key_values,
        } = &child.kind
        else {
            return Ok(Some(type_mismatch(node, parent, child)));
        };

        if std::ptr::eq(parent, child) {
            return Ok(None);
        }

        if key_values.len() != child_key_values.len() {
            return Err(InternalFault::ObjectFieldsMismatch {
                expected: key_values.len(),
                actual: child_key_values.len(),
            });
        }

        for (expected, actual) in key_values.iter().zip(child_key_values) {
            if let Some(diagnostic) = self.check_sub_type(node, &expected.value, &actual.value)? {
                return Ok(Some(diagnostic));
            }
        }

        Ok(None)
    }
}

/// Mismatch on the whole pair, rendered as the author wrote it
pub(crate) fn type_mismatch(node: &Node, parent: &TypeNode, child: &TypeNode) -> Diagnostic {
    Diagnostic::at(
        DiagnosticKind::TypeClassMismatch {
            expected: render(parent, RenderOptions::default()),
            actual: render(child, RenderOptions::default()),
        },
        node,
    )
}
