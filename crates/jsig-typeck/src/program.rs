//! Per-unit verification state: scopes, diagnostics and the header.

use std::sync::Arc;

use jsig_ast::{Node, TypeKind, TypeNode};
use log::debug;

use crate::error::{Diagnostic, DiagnosticKind, InternalFault};
use crate::header::{header_file_name, HeaderFile, HeaderLoader};
use crate::scope::{Binding, BindingOrigin, FunctionScope, Scope, ScopeId, ScopeKind};
use crate::sub_type::SubTypeChecker;
use crate::verifiers;

/// Inferred type of a visited node, if one could be derived
pub type VerifyResult = Result<Option<Arc<TypeNode>>, InternalFault>;

const PROGRAM_SCOPE: ScopeId = ScopeId(0);
const FILE_SCOPE: ScopeId = ScopeId(1);

/// Verification state for one source unit.
///
/// Owns the scope chain, the collected diagnostics and the fatal latch. Each
/// checked unit gets its own instance.
pub struct ProgramMeta {
    ast: Arc<Node>,
    file_name: String,
    scopes: Vec<Scope>,
    current_scope: ScopeId,
    errors: Vec<Diagnostic>,
    fatal_error: bool,
    header_file: Option<HeaderFile>,
    loader: Box<dyn HeaderLoader>,
    module_exports_node: Option<Node>,
    checker: SubTypeChecker,
}

impl ProgramMeta {
    pub fn new(ast: Node, file_name: impl Into<String>, loader: Box<dyn HeaderLoader>) -> Self {
        let scopes = vec![
            Scope::program(),
            Scope::new(ScopeKind::File, Some(PROGRAM_SCOPE)),
        ];

        Self {
            ast: Arc::new(ast),
            file_name: file_name.into(),
            scopes,
            current_scope: FILE_SCOPE,
            errors: Vec::new(),
            fatal_error: false,
            header_file: None,
            loader,
            module_exports_node: None,
            checker: SubTypeChecker::new(),
        }
    }

    /// Visit the whole program once
    pub fn verify(&mut self) -> Result<(), InternalFault> {
        let ast = Arc::clone(&self.ast);
        self.verify_node(&ast)?;
        Ok(())
    }

    /// Visit one node; a no-op once the fatal latch is set
    pub fn verify_node(&mut self, node: &Node) -> VerifyResult {
        if self.fatal_error {
            return Ok(None);
        }
        verifiers::verify(node, self)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn header_file(&self) -> Option<&HeaderFile> {
        self.header_file.as_ref()
    }

    pub fn module_exports_node(&self) -> Option<&Node> {
        self.module_exports_node.as_ref()
    }

    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<Diagnostic> {
        self.errors
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal_error
    }

    pub fn add_error(&mut self, error: Diagnostic) {
        self.errors.push(error);
    }

    /// Resolve an identifier through the scope chain
    pub fn get_var(&self, id: &str) -> Option<&Binding> {
        let mut scope_id = Some(self.current_scope);
        while let Some(ScopeId(index)) = scope_id {
            let scope = &self.scopes[index];
            if let Some(binding) = scope.get_local(id) {
                return Some(binding);
            }
            scope_id = scope.parent;
        }
        None
    }

    /// Bind a name in the current scope
    pub fn add_var(&mut self, id: impl Into<String>, defn: Arc<TypeNode>, origin: BindingOrigin) {
        self.scopes[self.current_scope.0].add_var(id, defn, origin);
    }

    pub fn current_scope(&self) -> &Scope {
        &self.scopes[self.current_scope.0]
    }

    /// The function whose body is being verified, if any
    pub fn current_function(&self) -> Option<&FunctionScope> {
        self.current_scope().function()
    }

    pub fn current_function_mut(&mut self) -> Option<&mut FunctionScope> {
        self.scopes[self.current_scope.0].function_mut()
    }

    /// Load `<name>.hjs` and register its assignments in the file scope.
    ///
    /// A load failure is reported and latches the program as fatal.
    pub fn load_header_file(&mut self) {
        let header_name = header_file_name(&self.file_name);
        debug!("loading header {}", header_name);

        match self.loader.load(&header_name) {
            Ok(program) => {
                let header = HeaderFile::new(program);
                for (identifier, defn) in header.assignments() {
                    self.add_var(identifier, defn, BindingOrigin::Header);
                }
                self.header_file = Some(header);
            }
            Err(err) => {
                debug!("header {} failed to load: {}", header_name, err);
                let diagnostic = Diagnostic::new(
                    DiagnosticKind::HeaderLoadFailed {
                        file_name: header_name,
                        reason: err.to_string(),
                    },
                    self.ast.loc,
                );
                self.add_error(diagnostic);
                self.fatal_error = true;
            }
        }
    }

    /// Push a function scope with its parameters bound to the declared
    /// argument types, position by position.
    pub fn enter_function_scope(
        &mut self,
        func_name: &str,
        params: &[Node],
        type_defn: &Arc<TypeNode>,
    ) -> ScopeId {
        let (args, result) = match &type_defn.kind {
            TypeKind::Function { args, result, .. } => (args.as_slice(), Arc::clone(result)),
            _ => (&[][..], Arc::clone(type_defn)),
        };

        let mut scope = Scope::new(
            ScopeKind::Function(FunctionScope::new(func_name, result)),
            Some(self.current_scope),
        );
        for (param, arg) in params.iter().zip(args) {
            if let Some(name) = param.identifier_name() {
                scope.add_var(name, Arc::clone(arg), BindingOrigin::Parameter);
            }
        }

        debug!("entering function scope {}", func_name);
        let id = ScopeId(self.scopes.len());
        self.scopes.push(scope);
        self.current_scope = id;
        id
    }

    /// Pop the current function scope and hand back its collected state
    pub fn exit_function_scope(&mut self) -> Option<FunctionScope> {
        // Function scopes are strictly nested, so the current one is the last
        if self.current_scope.0 + 1 != self.scopes.len() || self.current_function().is_none() {
            return None;
        }

        let scope = self.scopes.pop()?;
        self.current_scope = scope.parent.unwrap_or(FILE_SCOPE);
        match scope.kind {
            ScopeKind::Function(func) => {
                debug!("exiting function scope {}", func.func_name);
                Some(func)
            }
            _ => None,
        }
    }

    /// Remember the value of the last `module.exports = ...` statement
    pub fn set_module_exports_node(&mut self, program_body: &[Node]) {
        if let Some(value) = program_body.iter().filter_map(Node::module_exports_value).last() {
            self.module_exports_node = Some(value.clone());
        }
    }

    /// Check `child` against `parent`, collecting any mismatch
    pub fn check_sub_type(
        &mut self,
        node: &Node,
        parent: &TypeNode,
        child: &TypeNode,
    ) -> Result<(), InternalFault> {
        if let Some(diagnostic) = self.checker.check_sub_type(node, parent, child)? {
            self.add_error(diagnostic);
        }
        Ok(())
    }
}
