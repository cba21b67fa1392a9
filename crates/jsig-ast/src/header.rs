//! Top-level containers of a header (`.hjs`) file

use std::sync::Arc;

use crate::types::TypeNode;

/// Root of a parsed header file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderProgram {
    pub statements: Vec<Statement>,
}

impl HeaderProgram {
    /// `name : type` statements in declaration order
    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::Assignment(assignment) => Some(assignment),
            _ => None,
        })
    }

    /// `type Name : type` statements in declaration order
    pub fn type_declarations(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.statements.iter().filter_map(|stmt| match stmt {
            Statement::TypeDeclaration(decl) => Some(decl),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// import { A, B } from "dep"
    Import(Import),

    /// type Name<T> : expr
    TypeDeclaration(TypeDeclaration),

    /// name : expr
    Assignment(Assignment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub dependency: String,
    pub types: Vec<Arc<TypeNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDeclaration {
    pub identifier: String,
    pub generics: Vec<Arc<TypeNode>>,
    pub type_expression: Arc<TypeNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub identifier: String,
    pub type_expression: Arc<TypeNode>,
}
