//! Type nodes as they appear in header signatures

use std::fmt;
use std::sync::Arc;

use crate::render::{render, RenderOptions};

/// Literal names recognized natively by the checker
pub const BUILTIN_TYPES: &[&str] = &[
    "String",
    "Number",
    "Boolean",
    "Object",
    "Array",
    "Function",
    "Error",
    "RegExp",
    "Date",
    "Buffer",
    "Any",
    "void",
    "null",
    "undefined",
    MODULE_EXPORTS_WILDCARD,
];

/// Builtin literal that accepts any value assigned to `module.exports`
pub const MODULE_EXPORTS_WILDCARD: &str = "Any:ModuleExports";

pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// A type expression.
///
/// Every variant may carry a label (parameter or field name) and an
/// optional flag. `raw` holds the alias reference this node was expanded
/// from, so diagnostics print what the author wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeNode {
    pub kind: TypeKind,
    pub label: Option<String>,
    pub optional: bool,
    pub raw: Option<Arc<TypeNode>>,
}

/// Closed vocabulary of type shapes
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind {
    /// Atomic nominal type: `String`, `Number`, `Widget`
    Literal { name: String, builtin: bool },

    /// Concrete value used as a type: `"x"`, `42`
    Value { value: String },

    /// Parametric instantiation: `Array<String>`
    Generic {
        value: Arc<TypeNode>,
        generics: Vec<Arc<TypeNode>>,
    },

    /// Callable signature: `(this: T, a: A) => R`
    Function {
        args: Vec<Arc<TypeNode>>,
        this_arg: Option<Arc<TypeNode>>,
        result: Arc<TypeNode>,
    },

    /// Structural record, field order is significant
    Object { key_values: Vec<KeyValue> },

    /// One-of: `A | B`
    Union { unions: Vec<Arc<TypeNode>> },

    /// All-of: `A & B`
    Intersection { intersections: Vec<Arc<TypeNode>> },

    /// Fixed-length sequence: `[A, B]`
    Tuple { values: Vec<Arc<TypeNode>> },
}

/// Object field
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub key: String,
    pub optional: bool,
    pub value: Arc<TypeNode>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Arc<TypeNode>>) -> Self {
        Self {
            key: key.into(),
            optional: false,
            value: value.into(),
        }
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }
}

impl TypeNode {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            label: None,
            optional: false,
            raw: None,
        }
    }

    /// Literal type; builtin-ness is derived from the name
    pub fn literal(name: impl Into<String>) -> Self {
        let name = name.into();
        let builtin = is_builtin_name(&name);
        Self::new(TypeKind::Literal { name, builtin })
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self::new(TypeKind::Value { value: value.into() })
    }

    pub fn generic(value: impl Into<Arc<TypeNode>>, generics: Vec<Arc<TypeNode>>) -> Self {
        Self::new(TypeKind::Generic {
            value: value.into(),
            generics,
        })
    }

    pub fn function(
        args: Vec<Arc<TypeNode>>,
        this_arg: Option<Arc<TypeNode>>,
        result: impl Into<Arc<TypeNode>>,
    ) -> Self {
        Self::new(TypeKind::Function {
            args,
            this_arg,
            result: result.into(),
        })
    }

    pub fn object(key_values: Vec<KeyValue>) -> Self {
        Self::new(TypeKind::Object { key_values })
    }

    pub fn union(unions: Vec<Arc<TypeNode>>) -> Self {
        Self::new(TypeKind::Union { unions })
    }

    pub fn intersection(intersections: Vec<Arc<TypeNode>>) -> Self {
        Self::new(TypeKind::Intersection { intersections })
    }

    pub fn tuple(values: Vec<Arc<TypeNode>>) -> Self {
        Self::new(TypeKind::Tuple { values })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub fn with_raw(mut self, raw: Arc<TypeNode>) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Literal name, if this is a literal
    pub fn literal_name(&self) -> Option<&str> {
        match &self.kind {
            TypeKind::Literal { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        self.literal_name() == Some("void")
    }

    /// An object type with at least one field
    pub fn is_non_empty_object(&self) -> bool {
        matches!(&self.kind, TypeKind::Object { key_values } if !key_values.is_empty())
    }

    /// Find an object field by key
    pub fn field(&self, key: &str) -> Option<&KeyValue> {
        match &self.kind {
            TypeKind::Object { key_values } => key_values.iter().find(|kv| kv.key == key),
            _ => None,
        }
    }

    /// Variant name used in fault messages
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            TypeKind::Literal { .. } => "typeLiteral",
            TypeKind::Value { .. } => "valueLiteral",
            TypeKind::Generic { .. } => "genericLiteral",
            TypeKind::Function { .. } => "function",
            TypeKind::Object { .. } => "object",
            TypeKind::Union { .. } => "unionType",
            TypeKind::Intersection { .. } => "intersectionType",
            TypeKind::Tuple { .. } => "tuple",
        }
    }
}

impl fmt::Display for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, RenderOptions::default()))
    }
}
