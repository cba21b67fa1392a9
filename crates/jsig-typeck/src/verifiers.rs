//! Per-node verification rules.
//!
//! Each rule reports diagnostics into the [`ProgramMeta`] and yields the
//! type it could infer for the node, if any.

use std::sync::Arc;

use jsig_ast::{render, Node, NodeKind, RenderOptions, TypeKind, TypeNode};
use log::warn;

use crate::error::{Diagnostic, DiagnosticKind, InternalFault};
use crate::program::{ProgramMeta, VerifyResult};
use crate::scope::{is_constructor_name, BindingOrigin};

pub(crate) fn verify(node: &Node, meta: &mut ProgramMeta) -> VerifyResult {
    match &node.kind {
        NodeKind::Program { body } => verify_program(body, meta),
        NodeKind::FunctionDeclaration { id, params, body } => {
            verify_function(node, &id.name, params, body, meta)?;
            Ok(None)
        }
        NodeKind::FunctionExpression { id, params, body } => match id {
            Some(id) => verify_function(node, &id.name, params, body, meta),
            None => {
                warn!("skipping anonymous function expression at line {}", node.line());
                Ok(None)
            }
        },
        NodeKind::BlockStatement { body } => {
            for stmt in body {
                meta.verify_node(stmt)?;
            }
            Ok(None)
        }
        NodeKind::ExpressionStatement { expression } => {
            meta.verify_node(expression)?;
            Ok(None)
        }
        NodeKind::ReturnStatement { argument } => verify_return(node, argument.as_deref(), meta),
        NodeKind::IfStatement {
            test,
            consequent,
            alternate,
        } => verify_children(
            [Some(test.as_ref()), Some(consequent.as_ref()), alternate.as_deref()],
            meta,
        ),
        NodeKind::ForStatement {
            init,
            test,
            update,
            body,
        } => verify_children(
            [init.as_deref(), test.as_deref(), update.as_deref(), Some(body.as_ref())],
            meta,
        ),
        NodeKind::ForInStatement { left, right, body }
        | NodeKind::ForOfStatement { left, right, body } => {
            verify_children([Some(left.as_ref()), Some(right.as_ref()), Some(body.as_ref())], meta)
        }
        NodeKind::WhileStatement { test, body } => {
            verify_children([Some(test.as_ref()), Some(body.as_ref())], meta)
        }
        NodeKind::DoWhileStatement { body, test } => {
            verify_children([Some(body.as_ref()), Some(test.as_ref())], meta)
        }
        NodeKind::SwitchStatement {
            discriminant,
            cases,
        } => {
            meta.verify_node(discriminant)?;
            for case in cases {
                meta.verify_node(case)?;
            }
            Ok(None)
        }
        NodeKind::SwitchCase { test, consequent } => {
            if let Some(test) = test {
                meta.verify_node(test)?;
            }
            for stmt in consequent {
                meta.verify_node(stmt)?;
            }
            Ok(None)
        }
        NodeKind::TryStatement {
            block,
            handler,
            finalizer,
        } => verify_children(
            [Some(block.as_ref()), handler.as_deref(), finalizer.as_deref()],
            meta,
        ),
        NodeKind::CatchClause { body, .. } | NodeKind::LabeledStatement { body } => {
            meta.verify_node(body)?;
            Ok(None)
        }
        NodeKind::VariableDeclaration { declarations, .. } => {
            for declarator in declarations {
                meta.verify_node(declarator)?;
            }
            Ok(None)
        }
        NodeKind::VariableDeclarator { id, init } => {
            verify_declarator(node, id, init.as_deref(), meta)?;
            Ok(None)
        }
        NodeKind::AssignmentExpression { left, right, .. } => {
            verify_assignment(node, left, right, meta)
        }
        NodeKind::MemberExpression { object, .. } => match node.member_property() {
            Some((object, field_name)) => verify_member(node, object, field_name, meta),
            None => {
                meta.verify_node(object)?;
                Ok(None)
            }
        },
        NodeKind::CallExpression { callee, arguments } => {
            verify_call(callee, arguments, meta)
        }
        NodeKind::NewExpression { callee, arguments } => {
            verify_new(node, callee, arguments, meta)
        }
        NodeKind::Identifier { name } => Ok(meta.get_var(name).map(|b| Arc::clone(&b.defn))),
        NodeKind::ThisExpression => Ok(meta
            .current_function()
            .and_then(|func| func.this_value_type.clone())),
        NodeKind::Literal { raw } => Ok(raw.as_deref().and_then(literal_type)),
        NodeKind::Unsupported => {
            warn!("skipping unsupported node at line {}", node.line());
            Ok(None)
        }
    }
}

fn verify_program(body: &[Node], meta: &mut ProgramMeta) -> VerifyResult {
    meta.set_module_exports_node(body);
    meta.load_header_file();
    if meta.is_fatal() {
        return Ok(None);
    }

    for stmt in body {
        meta.verify_node(stmt)?;
    }
    Ok(None)
}

/// Visit the present children of a statement in source order
fn verify_children<const N: usize>(
    children: [Option<&Node>; N],
    meta: &mut ProgramMeta,
) -> VerifyResult {
    for child in children.into_iter().flatten() {
        meta.verify_node(child)?;
    }
    Ok(None)
}

fn verify_function(
    node: &Node,
    func_name: &str,
    params: &[Node],
    body: &Node,
    meta: &mut ProgramMeta,
) -> VerifyResult {
    let defn = match meta.get_var(func_name) {
        Some(binding) if matches!(binding.defn.kind, TypeKind::Function { .. }) => {
            Arc::clone(&binding.defn)
        }
        _ => {
            meta.add_error(Diagnostic::at(
                DiagnosticKind::UntypedFunctionFound {
                    func_name: func_name.to_string(),
                },
                node,
            ));
            return Ok(None);
        }
    };
    let TypeKind::Function { args, result, .. } = &defn.kind else {
        return Ok(None);
    };

    let expected_args = args.len();
    let actual_args = params.len();
    if actual_args > expected_args {
        meta.add_error(Diagnostic::at(
            DiagnosticKind::TooManyArgsInFunc {
                func_name: func_name.to_string(),
                expected_args,
                actual_args,
            },
            node,
        ));
    } else if actual_args < expected_args {
        meta.add_error(Diagnostic::at(
            DiagnosticKind::TooFewArgsInFunc {
                func_name: func_name.to_string(),
                expected_args,
                actual_args,
            },
            node,
        ));
    }

    if is_constructor_name(func_name) && !result.is_non_empty_object() {
        meta.add_error(Diagnostic::at(
            DiagnosticKind::ConstructorThisTypeMustBeObject {
                func_name: func_name.to_string(),
                this_type: render_type(result),
            },
            node,
        ));
        return Ok(Some(defn));
    }

    meta.enter_function_scope(func_name, params, &defn);
    let outcome = meta.verify_node(body);
    let func = meta.exit_function_scope();
    outcome?;

    let Some(func) = func else {
        return Ok(Some(defn));
    };

    if let Some(this_type) = &func.this_value_type {
        if let TypeKind::Object { key_values } = &this_type.kind {
            // Fields must be assigned in declaration order
            let deviation = key_values
                .iter()
                .enumerate()
                .find(|(i, kv)| func.this_fields.get(*i) != Some(&kv.key));
            if let Some((i, kv)) = deviation {
                meta.add_error(Diagnostic::at(
                    DiagnosticKind::MissingFieldInConstr {
                        field_name: kv.key.clone(),
                        other_field: func
                            .this_fields
                            .get(i)
                            .cloned()
                            .unwrap_or_else(|| "nothing".to_string()),
                        func_name: func.func_name.clone(),
                    },
                    node,
                ));
            }
        }
    }

    if let Some(return_type) = &func.return_value_type {
        if !return_type.is_void() && !func.found_return {
            meta.add_error(Diagnostic::at(
                DiagnosticKind::MissingReturnStatement {
                    expected: render_type(return_type),
                    actual: "void".to_string(),
                    func_name: func.func_name.clone(),
                },
                node,
            ));
        }
    }

    Ok(Some(defn))
}

fn verify_return(node: &Node, argument: Option<&Node>, meta: &mut ProgramMeta) -> VerifyResult {
    let actual = match argument {
        Some(argument) => meta.verify_node(argument)?,
        None => None,
    };

    let Some(func) = meta.current_function_mut() else {
        return Ok(None);
    };
    func.found_return = true;
    let func_name = func.func_name.clone();
    let is_constructor = func.is_constructor;
    let return_type = func.return_value_type.clone();

    if is_constructor {
        meta.add_error(Diagnostic::at(
            DiagnosticKind::ReturnStatementInConstructor {
                func_name,
                return_type: actual
                    .as_deref()
                    .map_or_else(|| "void".to_string(), render_type),
            },
            node,
        ));
        return Ok(None);
    }

    let Some(return_type) = return_type else {
        return Ok(None);
    };

    if return_type.is_void() {
        if argument.is_some() {
            meta.add_error(Diagnostic::at(
                DiagnosticKind::NonVoidReturnType {
                    expected: "void".to_string(),
                    actual: actual
                        .as_deref()
                        .map_or_else(|| "unknown".to_string(), render_type),
                    func_name,
                },
                node,
            ));
        }
        return Ok(None);
    }

    let actual = match (argument, actual) {
        (None, _) => Arc::new(TypeNode::literal("void")),
        (Some(_), Some(actual)) => actual,
        // Nothing inferred for the returned value
        (Some(_), None) => return Ok(None),
    };
    meta.check_sub_type(node, &return_type, &actual)?;
    Ok(None)
}

fn verify_declarator(
    node: &Node,
    id: &Node,
    init: Option<&Node>,
    meta: &mut ProgramMeta,
) -> VerifyResult {
    let Some(init) = init else {
        return Ok(None);
    };
    let name = id.identifier_name();

    let inferred = match (&init.kind, name) {
        (NodeKind::FunctionExpression { params, body, .. }, Some(name)) => {
            verify_function(init, name, params, body, meta)?;
            return Ok(None);
        }
        _ => meta.verify_node(init)?,
    };

    let (Some(name), Some(inferred)) = (name, inferred) else {
        return Ok(None);
    };

    let declared = meta
        .get_var(name)
        .filter(|binding| binding.origin == BindingOrigin::Header)
        .map(|binding| Arc::clone(&binding.defn));
    match declared {
        Some(declared) => meta.check_sub_type(node, &declared, &inferred)?,
        None => meta.add_var(name, inferred, BindingOrigin::Local),
    }
    Ok(None)
}

fn verify_assignment(node: &Node, left: &Node, right: &Node, meta: &mut ProgramMeta) -> VerifyResult {
    if let (NodeKind::FunctionExpression { id: None, params, body }, Some(name)) =
        (&right.kind, left.identifier_name())
    {
        return verify_function(right, name, params, body, meta);
    }

    if let Some((object, field_name)) = left.member_property() {
        if matches!(object.kind, NodeKind::ThisExpression) {
            if let Some(func) = meta.current_function_mut() {
                if func.is_constructor {
                    func.this_fields.push(field_name.to_string());
                }
            }
        }
    }

    let expected = meta.verify_node(left)?;
    let actual = meta.verify_node(right)?;

    if let (Some(expected), Some(actual)) = (&expected, &actual) {
        meta.check_sub_type(node, expected, actual)?;
    }
    Ok(actual)
}

fn verify_member(
    node: &Node,
    object: &Node,
    field_name: &str,
    meta: &mut ProgramMeta,
) -> VerifyResult {
    let Some(object_type) = meta.verify_node(object)? else {
        return Ok(None);
    };

    match &object_type.kind {
        TypeKind::Union { .. } => {
            meta.add_error(Diagnostic::at(
                DiagnosticKind::UnionFieldAccess {
                    field_name: field_name.to_string(),
                    union_type: render_type(&object_type),
                },
                node,
            ));
            Ok(None)
        }
        TypeKind::Object { .. } => match object_type.field(field_name) {
            Some(kv) => Ok(Some(Arc::clone(&kv.value))),
            None => {
                meta.add_error(Diagnostic::at(
                    DiagnosticKind::NonExistentField {
                        field_name: field_name.to_string(),
                        obj_name: render_type(&object_type),
                    },
                    node,
                ));
                Ok(None)
            }
        },
        _ => Ok(None),
    }
}

fn verify_call(callee: &Node, arguments: &[Node], meta: &mut ProgramMeta) -> VerifyResult {
    let callee_type = meta.verify_node(callee)?;

    let Some(TypeKind::Function { args, result, .. }) = callee_type.as_deref().map(|t| &t.kind)
    else {
        for argument in arguments {
            meta.verify_node(argument)?;
        }
        return Ok(None);
    };

    verify_arguments(args, arguments, meta)?;
    Ok(Some(Arc::clone(result)))
}

fn verify_new(node: &Node, callee: &Node, arguments: &[Node], meta: &mut ProgramMeta) -> VerifyResult {
    let callee_type = meta.verify_node(callee)?;

    let Some(callee_type) = callee_type else {
        for argument in arguments {
            meta.verify_node(argument)?;
        }
        return Ok(None);
    };
    let TypeKind::Function { args, result, .. } = &callee_type.kind else {
        return Ok(None);
    };

    let func_name = callee
        .identifier_name()
        .or_else(|| callee.member_property().map(|(_, name)| name))
        .unwrap_or_default()
        .to_string();

    if !is_constructor_name(&func_name) {
        meta.add_error(Diagnostic::at(
            DiagnosticKind::ConstructorMustBePascalCase {
                func_name,
                func_type: render_type(&callee_type),
            },
            node,
        ));
        return Ok(None);
    }

    if !result.is_non_empty_object() {
        meta.add_error(Diagnostic::at(
            DiagnosticKind::CallingNewOnPlainFunction {
                func_name,
                func_type: render_type(&callee_type),
            },
            node,
        ));
        return Ok(None);
    }

    let expected_args = args.len();
    let actual_args = arguments.len();
    if actual_args > expected_args {
        meta.add_error(Diagnostic::at(
            DiagnosticKind::TooManyArgsInNewExpression {
                func_name,
                expected_args,
                actual_args,
            },
            node,
        ));
    } else if actual_args < expected_args {
        meta.add_error(Diagnostic::at(
            DiagnosticKind::TooFewArgsInNewExpression {
                func_name,
                expected_args,
                actual_args,
            },
            node,
        ));
    }

    verify_arguments(args, arguments, meta)?;
    Ok(Some(Arc::clone(result)))
}

/// Check call arguments position by position against declared arguments
fn verify_arguments(
    declared: &[Arc<TypeNode>],
    arguments: &[Node],
    meta: &mut ProgramMeta,
) -> Result<(), InternalFault> {
    for (i, argument) in arguments.iter().enumerate() {
        let actual = meta.verify_node(argument)?;
        if let (Some(expected), Some(actual)) = (declared.get(i), actual) {
            meta.check_sub_type(argument, expected, &actual)?;
        }
    }
    Ok(())
}

/// `"..."`/`'...'` literals are strings, numeric literals are numbers
fn literal_type(raw: &str) -> Option<Arc<TypeNode>> {
    if raw.starts_with('"') || raw.starts_with('\'') {
        Some(Arc::new(TypeNode::literal("String")))
    } else if is_number_literal(raw) {
        Some(Arc::new(TypeNode::literal("Number")))
    } else {
        None
    }
}

/// Decimal, hex, octal and binary numerals, with optional `_` separators
fn is_number_literal(raw: &str) -> bool {
    let text = raw.replace('_', "").to_ascii_lowercase();

    let (radix, digits) = match text.get(..2) {
        Some("0x") => (16, &text[2..]),
        Some("0o") => (8, &text[2..]),
        Some("0b") => (2, &text[2..]),
        _ => {
            return text.starts_with(|c: char| c.is_ascii_digit() || c == '.')
                && text.parse::<f64>().is_ok();
        }
    };
    !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix))
}

fn render_type(node: &TypeNode) -> String {
    render(node, RenderOptions::default())
}
