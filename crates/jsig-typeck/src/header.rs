//! Header files: loading and alias resolution

use std::collections::HashMap;
use std::sync::Arc;

use jsig_ast::{HeaderProgram, KeyValue, TypeDeclaration, TypeKind, TypeNode};
use thiserror::Error;

/// Why a header file could not be produced
#[derive(Debug, Error)]
pub enum HeaderLoadError {
    #[error("{source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("{}", .messages.join("; "))]
    Parse { messages: Vec<String> },

    #[error("no header named {file_name}")]
    Missing { file_name: String },
}

/// Source of parsed header programs
pub trait HeaderLoader {
    fn load(&self, file_name: &str) -> Result<HeaderProgram, HeaderLoadError>;
}

/// Header name for a source file: `foo.js` → `foo.hjs`
pub fn header_file_name(file_name: &str) -> String {
    match file_name.strip_suffix(".js") {
        Some(stem) => format!("{}.hjs", stem),
        None => format!("{}.hjs", file_name),
    }
}

/// A parsed header with its `type` aliases indexed by name
#[derive(Debug, Clone)]
pub struct HeaderFile {
    program: HeaderProgram,
    aliases: HashMap<String, TypeDeclaration>,
}

impl HeaderFile {
    pub fn new(program: HeaderProgram) -> Self {
        let aliases = program
            .type_declarations()
            .map(|decl| (decl.identifier.clone(), decl.clone()))
            .collect();

        Self { program, aliases }
    }

    pub fn program(&self) -> &HeaderProgram {
        &self.program
    }

    pub fn type_declaration(&self, name: &str) -> Option<&TypeDeclaration> {
        self.aliases.get(name)
    }

    /// Top-level assignments with alias references expanded.
    ///
    /// An expanded node keeps the reference it replaced in `raw`, so
    /// diagnostics print the alias name the header author wrote.
    pub fn assignments(&self) -> Vec<(String, Arc<TypeNode>)> {
        self.program
            .assignments()
            .map(|assignment| {
                let mut visiting = Vec::new();
                (
                    assignment.identifier.clone(),
                    self.resolve(&assignment.type_expression, &mut visiting),
                )
            })
            .collect()
    }

    fn resolve(&self, node: &Arc<TypeNode>, visiting: &mut Vec<String>) -> Arc<TypeNode> {
        let kind = match &node.kind {
            TypeKind::Literal {
                name,
                builtin: false,
            } => return self.resolve_alias(node, name, visiting),
            TypeKind::Literal { .. } | TypeKind::Value { .. } => return Arc::clone(node),
            TypeKind::Generic { value, generics } => TypeKind::Generic {
                value: Arc::clone(value),
                generics: self.resolve_all(generics, visiting),
            },
            TypeKind::Function {
                args,
                this_arg,
                result,
            } => TypeKind::Function {
                args: self.resolve_all(args, visiting),
                this_arg: this_arg.as_ref().map(|this| self.resolve(this, visiting)),
                result: self.resolve(result, visiting),
            },
            TypeKind::Object { key_values } => TypeKind::Object {
                key_values: key_values
                    .iter()
                    .map(|kv| KeyValue {
                        key: kv.key.clone(),
                        optional: kv.optional,
                        value: self.resolve(&kv.value, visiting),
                    })
                    .collect(),
            },
            TypeKind::Union { unions } => TypeKind::Union {
                unions: self.resolve_all(unions, visiting),
            },
            TypeKind::Intersection { intersections } => TypeKind::Intersection {
                intersections: self.resolve_all(intersections, visiting),
            },
            TypeKind::Tuple { values } => TypeKind::Tuple {
                values: self.resolve_all(values, visiting),
            },
        };

        Arc::new(TypeNode {
            kind,
            label: node.label.clone(),
            optional: node.optional,
            raw: node.raw.clone(),
        })
    }

    fn resolve_all(&self, nodes: &[Arc<TypeNode>], visiting: &mut Vec<String>) -> Vec<Arc<TypeNode>> {
        nodes.iter().map(|node| self.resolve(node, visiting)).collect()
    }

    fn resolve_alias(
        &self,
        node: &Arc<TypeNode>,
        name: &str,
        visiting: &mut Vec<String>,
    ) -> Arc<TypeNode> {
        let decl = match self.type_declaration(name) {
            Some(decl) if decl.generics.is_empty() && !visiting.iter().any(|v| v == name) => decl,
            // Imported, generic or cyclic references stay as written
            _ => return Arc::clone(node),
        };

        visiting.push(name.to_string());
        let body = self.resolve(&decl.type_expression, visiting);
        visiting.pop();

        Arc::new(TypeNode {
            kind: body.kind.clone(),
            label: node.label.clone(),
            optional: node.optional,
            raw: Some(Arc::clone(node)),
        })
    }
}
