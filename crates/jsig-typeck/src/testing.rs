//! Source AST builders and an in-memory header loader for tests

use std::collections::HashMap;

use jsig_ast::{HeaderProgram, Identifier, Node, NodeKind, SourceLocation};
use jsig_parser::parse_header;

use crate::header::{HeaderLoadError, HeaderLoader};

#[derive(Default)]
pub struct MemoryLoader {
    files: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, file_name: &str, source: &str) -> Self {
        self.files.insert(file_name.to_string(), source.to_string());
        self
    }
}

impl HeaderLoader for MemoryLoader {
    fn load(&self, file_name: &str) -> Result<HeaderProgram, HeaderLoadError> {
        let source = self.files.get(file_name).ok_or_else(|| HeaderLoadError::Missing {
            file_name: file_name.to_string(),
        })?;

        parse_header(source).map_err(|errors| HeaderLoadError::Parse {
            messages: errors.iter().map(|e| e.to_string()).collect(),
        })
    }
}

fn at(line: usize, kind: NodeKind) -> Node {
    Node::new(kind, SourceLocation::on_line(line, 0, 1))
}

pub fn program(body: Vec<Node>) -> Node {
    at(1, NodeKind::Program { body })
}

pub fn ident(name: &str, line: usize) -> Node {
    at(line, NodeKind::Identifier { name: name.to_string() })
}

pub fn literal(raw: &str, line: usize) -> Node {
    at(line, NodeKind::Literal { raw: Some(raw.to_string()) })
}

pub fn this(line: usize) -> Node {
    at(line, NodeKind::ThisExpression)
}

pub fn unsupported(line: usize) -> Node {
    at(line, NodeKind::Unsupported)
}

pub fn function(name: &str, params: &[&str], body: Vec<Node>, line: usize) -> Node {
    at(
        line,
        NodeKind::FunctionDeclaration {
            id: Identifier { name: name.to_string() },
            params: params.iter().map(|p| ident(p, line)).collect(),
            body: Box::new(at(line, NodeKind::BlockStatement { body })),
        },
    )
}

pub fn function_expr(params: &[&str], body: Vec<Node>, line: usize) -> Node {
    at(
        line,
        NodeKind::FunctionExpression {
            id: None,
            params: params.iter().map(|p| ident(p, line)).collect(),
            body: Box::new(at(line, NodeKind::BlockStatement { body })),
        },
    )
}

pub fn ret(argument: Option<Node>, line: usize) -> Node {
    at(line, NodeKind::ReturnStatement { argument: argument.map(Box::new) })
}

fn block(body: Vec<Node>, line: usize) -> Box<Node> {
    Box::new(at(line, NodeKind::BlockStatement { body }))
}

/// `if (test) { consequent } else { alternate }`
pub fn if_stmt(test: Node, consequent: Vec<Node>, alternate: Option<Vec<Node>>, line: usize) -> Node {
    at(
        line,
        NodeKind::IfStatement {
            test: Box::new(test),
            consequent: block(consequent, line),
            alternate: alternate.map(|body| block(body, line)),
        },
    )
}

pub fn while_stmt(test: Node, body: Vec<Node>, line: usize) -> Node {
    at(
        line,
        NodeKind::WhileStatement {
            test: Box::new(test),
            body: block(body, line),
        },
    )
}

/// `try { block } catch (err) { handler }`
pub fn try_stmt(body: Vec<Node>, handler: Vec<Node>, line: usize) -> Node {
    at(
        line,
        NodeKind::TryStatement {
            block: block(body, line),
            handler: Some(Box::new(at(
                line,
                NodeKind::CatchClause {
                    param: Some(Box::new(ident("err", line))),
                    body: block(handler, line),
                },
            ))),
            finalizer: None,
        },
    )
}

pub fn stmt(expression: Node) -> Node {
    let line = expression.line();
    at(line, NodeKind::ExpressionStatement { expression: Box::new(expression) })
}

pub fn member(object: Node, property: &str, line: usize) -> Node {
    at(
        line,
        NodeKind::MemberExpression {
            object: Box::new(object),
            property: Box::new(ident(property, line)),
            computed: false,
        },
    )
}

pub fn assign(left: Node, right: Node, line: usize) -> Node {
    at(
        line,
        NodeKind::AssignmentExpression {
            operator: "=".to_string(),
            left: Box::new(left),
            right: Box::new(right),
        },
    )
}

pub fn call(callee: Node, arguments: Vec<Node>, line: usize) -> Node {
    at(line, NodeKind::CallExpression { callee: Box::new(callee), arguments })
}

pub fn new_expr(callee: &str, arguments: Vec<Node>, line: usize) -> Node {
    at(
        line,
        NodeKind::NewExpression {
            callee: Box::new(ident(callee, line)),
            arguments,
        },
    )
}

pub fn var(name: &str, init: Node, line: usize) -> Node {
    at(
        line,
        NodeKind::VariableDeclaration {
            declarations: vec![at(
                line,
                NodeKind::VariableDeclarator {
                    id: Box::new(ident(name, line)),
                    init: Some(Box::new(init)),
                },
            )],
            kind: "var".to_string(),
        },
    )
}

/// `module.exports = value`
pub fn exports(value: Node, line: usize) -> Node {
    stmt(assign(member(ident("module", line), "exports", line), value, line))
}
