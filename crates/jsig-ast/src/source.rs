//! ESTree-shaped source AST.
//!
//! Only the node types the checker reasons about are modelled; every other
//! ESTree node deserializes as [`NodeKind::Unsupported`].

use serde::{Deserialize, Deserializer};

/// 1-based line, 0-based column (ESTree convention)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SourceLocation {
    pub start: Position,
    pub end: Position,
}

impl SourceLocation {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Location covering `line` from `start_column` to `end_column`
    pub fn on_line(line: usize, start_column: usize, end_column: usize) -> Self {
        Self {
            start: Position { line, column: start_column },
            end: Position { line, column: end_column },
        }
    }
}

/// Source AST node
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    #[serde(default, deserialize_with = "nullable_loc")]
    pub loc: SourceLocation,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    Program {
        body: Vec<Node>,
    },
    FunctionDeclaration {
        id: Identifier,
        params: Vec<Node>,
        body: Box<Node>,
    },
    FunctionExpression {
        #[serde(default)]
        id: Option<Identifier>,
        params: Vec<Node>,
        body: Box<Node>,
    },
    BlockStatement {
        body: Vec<Node>,
    },
    ExpressionStatement {
        expression: Box<Node>,
    },
    ReturnStatement {
        #[serde(default)]
        argument: Option<Box<Node>>,
    },
    IfStatement {
        test: Box<Node>,
        consequent: Box<Node>,
        #[serde(default)]
        alternate: Option<Box<Node>>,
    },
    ForStatement {
        #[serde(default)]
        init: Option<Box<Node>>,
        #[serde(default)]
        test: Option<Box<Node>>,
        #[serde(default)]
        update: Option<Box<Node>>,
        body: Box<Node>,
    },
    ForInStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },
    ForOfStatement {
        left: Box<Node>,
        right: Box<Node>,
        body: Box<Node>,
    },
    WhileStatement {
        test: Box<Node>,
        body: Box<Node>,
    },
    DoWhileStatement {
        body: Box<Node>,
        test: Box<Node>,
    },
    SwitchStatement {
        discriminant: Box<Node>,
        cases: Vec<Node>,
    },
    SwitchCase {
        #[serde(default)]
        test: Option<Box<Node>>,
        consequent: Vec<Node>,
    },
    TryStatement {
        block: Box<Node>,
        #[serde(default)]
        handler: Option<Box<Node>>,
        #[serde(default)]
        finalizer: Option<Box<Node>>,
    },
    CatchClause {
        #[serde(default)]
        param: Option<Box<Node>>,
        body: Box<Node>,
    },
    LabeledStatement {
        body: Box<Node>,
    },
    VariableDeclaration {
        declarations: Vec<Node>,
        kind: String,
    },
    VariableDeclarator {
        id: Box<Node>,
        #[serde(default)]
        init: Option<Box<Node>>,
    },
    AssignmentExpression {
        operator: String,
        left: Box<Node>,
        right: Box<Node>,
    },
    MemberExpression {
        object: Box<Node>,
        property: Box<Node>,
        #[serde(default)]
        computed: bool,
    },
    CallExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    NewExpression {
        callee: Box<Node>,
        arguments: Vec<Node>,
    },
    Identifier {
        name: String,
    },
    ThisExpression,
    Literal {
        #[serde(default)]
        raw: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

impl Node {
    pub fn new(kind: NodeKind, loc: SourceLocation) -> Self {
        Self { loc, kind }
    }

    pub fn line(&self) -> usize {
        self.loc.start.line
    }

    /// ESTree `type` of this node
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Program { .. } => "Program",
            NodeKind::FunctionDeclaration { .. } => "FunctionDeclaration",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::BlockStatement { .. } => "BlockStatement",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::ReturnStatement { .. } => "ReturnStatement",
            NodeKind::IfStatement { .. } => "IfStatement",
            NodeKind::ForStatement { .. } => "ForStatement",
            NodeKind::ForInStatement { .. } => "ForInStatement",
            NodeKind::ForOfStatement { .. } => "ForOfStatement",
            NodeKind::WhileStatement { .. } => "WhileStatement",
            NodeKind::DoWhileStatement { .. } => "DoWhileStatement",
            NodeKind::SwitchStatement { .. } => "SwitchStatement",
            NodeKind::SwitchCase { .. } => "SwitchCase",
            NodeKind::TryStatement { .. } => "TryStatement",
            NodeKind::CatchClause { .. } => "CatchClause",
            NodeKind::LabeledStatement { .. } => "LabeledStatement",
            NodeKind::VariableDeclaration { .. } => "VariableDeclaration",
            NodeKind::VariableDeclarator { .. } => "VariableDeclarator",
            NodeKind::AssignmentExpression { .. } => "AssignmentExpression",
            NodeKind::MemberExpression { .. } => "MemberExpression",
            NodeKind::CallExpression { .. } => "CallExpression",
            NodeKind::NewExpression { .. } => "NewExpression",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::ThisExpression => "ThisExpression",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::Unsupported => "Unsupported",
        }
    }

    pub fn identifier_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    /// Non-computed property name of a member expression
    pub fn member_property(&self) -> Option<(&Node, &str)> {
        match &self.kind {
            NodeKind::MemberExpression {
                object,
                property,
                computed: false,
            } => property.identifier_name().map(|name| (object.as_ref(), name)),
            _ => None,
        }
    }

    /// Right-hand side of a `module.exports = value` statement
    pub fn module_exports_value(&self) -> Option<&Node> {
        let NodeKind::ExpressionStatement { expression } = &self.kind else {
            return None;
        };
        let NodeKind::AssignmentExpression { left, right, .. } = &expression.kind else {
            return None;
        };

        match left.member_property() {
            Some((object, "exports")) if object.identifier_name() == Some("module") => {
                Some(right.as_ref())
            }
            _ => None,
        }
    }
}

fn nullable_loc<'de, D>(deserializer: D) -> Result<SourceLocation, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<SourceLocation>::deserialize(deserializer)?.unwrap_or_default())
}
