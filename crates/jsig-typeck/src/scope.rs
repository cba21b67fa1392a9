//! Scope chain: program → file → function

use std::collections::HashMap;
use std::sync::Arc;

use jsig_ast::{KeyValue, TypeNode, MODULE_EXPORTS_WILDCARD};
use once_cell::sync::Lazy;

/// `require : (String) => Any`
pub static REQUIRE_TYPE: Lazy<Arc<TypeNode>> = Lazy::new(|| {
    Arc::new(TypeNode::function(
        vec![Arc::new(TypeNode::literal("String"))],
        None,
        TypeNode::literal("Any"),
    ))
});

/// `module : { exports: Any:ModuleExports }`
pub static MODULE_TYPE: Lazy<Arc<TypeNode>> = Lazy::new(|| {
    Arc::new(TypeNode::object(vec![KeyValue::new(
        "exports",
        TypeNode::literal(MODULE_EXPORTS_WILDCARD),
    )]))
});

/// Index of a scope in its environment's scope arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) usize);

/// Where a binding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
    /// The implicit `require` function
    NodeRequire,
    /// The implicit `module` object
    NodeModule,
    /// A top-level assignment in the header file
    Header,
    Parameter,
    /// A `var` declared in the source
    Local,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub defn: Arc<TypeNode>,
    pub origin: BindingOrigin,
}

impl Binding {
    pub fn new(defn: Arc<TypeNode>, origin: BindingOrigin) -> Self {
        Self { defn, origin }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScopeKind {
    Program,
    File,
    Function(FunctionScope),
}

/// Per-function state collected while its body is verified
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionScope {
    pub func_name: String,
    pub is_constructor: bool,
    /// Declared result of a plain function
    pub return_value_type: Option<Arc<TypeNode>>,
    /// Declared receiver of a constructor
    pub this_value_type: Option<Arc<TypeNode>>,
    pub found_return: bool,
    /// Fields assigned through `this.field = ...`, in order
    pub this_fields: Vec<String>,
}

impl FunctionScope {
    pub fn new(func_name: impl Into<String>, result: Arc<TypeNode>) -> Self {
        let func_name = func_name.into();
        let is_constructor = is_constructor_name(&func_name);
        let (return_value_type, this_value_type) = if is_constructor {
            (None, Some(result))
        } else {
            (Some(result), None)
        };

        Self {
            func_name,
            is_constructor,
            return_value_type,
            this_value_type,
            found_return: false,
            this_fields: Vec::new(),
        }
    }
}

/// A function named with a leading uppercase letter is a constructor
pub fn is_constructor_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub identifiers: HashMap<String, Binding>,
    pub parent: Option<ScopeId>,
}

impl Scope {
    pub fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            identifiers: HashMap::new(),
            parent,
        }
    }

    /// The program scope, seeded with the module system bindings
    pub fn program() -> Self {
        let mut scope = Self::new(ScopeKind::Program, None);
        scope.add_var("require", Arc::clone(&REQUIRE_TYPE), BindingOrigin::NodeRequire);
        scope.add_var("module", Arc::clone(&MODULE_TYPE), BindingOrigin::NodeModule);
        scope
    }

    pub fn add_var(&mut self, id: impl Into<String>, defn: Arc<TypeNode>, origin: BindingOrigin) {
        self.identifiers.insert(id.into(), Binding::new(defn, origin));
    }

    pub fn get_local(&self, id: &str) -> Option<&Binding> {
        self.identifiers.get(id)
    }

    pub fn function(&self) -> Option<&FunctionScope> {
        match &self.kind {
            ScopeKind::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn function_mut(&mut self) -> Option<&mut FunctionScope> {
        match &mut self.kind {
            ScopeKind::Function(func) => Some(func),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_name() {
        assert!(is_constructor_name("Point"));
        assert!(is_constructor_name("Ünicode"));
        assert!(!is_constructor_name("point"));
        assert!(!is_constructor_name("_Point"));
        assert!(!is_constructor_name(""));
    }

    #[test]
    fn test_function_scope_classification() {
        let result = Arc::new(TypeNode::literal("Number"));

        let plain = FunctionScope::new("add", result.clone());
        assert!(!plain.is_constructor);
        assert_eq!(plain.return_value_type, Some(result.clone()));
        assert!(plain.this_value_type.is_none());

        let ctor = FunctionScope::new("Add", result.clone());
        assert!(ctor.is_constructor);
        assert_eq!(ctor.this_value_type, Some(result));
        assert!(ctor.return_value_type.is_none());
    }

    #[test]
    fn test_program_scope_seeds_module_bindings() {
        let scope = Scope::program();

        let require = scope.get_local("require").unwrap();
        assert_eq!(require.origin, BindingOrigin::NodeRequire);
        assert_eq!(require.defn.to_string(), "(String) => Any");

        let module = scope.get_local("module").unwrap();
        assert_eq!(module.origin, BindingOrigin::NodeModule);
        assert_eq!(module.defn.to_string(), "{ exports: Any:ModuleExports }");

        // Every environment shares the same constants
        assert!(Arc::ptr_eq(&Scope::program().get_local("module").unwrap().defn, &module.defn));
    }
}
