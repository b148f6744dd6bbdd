use oxc_ast::{
  ast::{BindingIdentifier, Program},
  AstKind,
};
use oxc_ast_visit::Visit;

use super::{scope_kind_of, shorthand_binding_flags, ReferenceFlags, ScopeId, ScopeKind, ScopeTree};

/// First pass: creates every scope and declares every binding, so the second pass can resolve
/// references to declarations that appear later in the source.
pub(crate) struct DeclarationCollector<'s, 'a> {
  tree: &'s mut ScopeTree,
  path: Vec<AstKind<'a>>,
  scope_stack: Vec<ScopeId>,
}

impl<'s, 'a> DeclarationCollector<'s, 'a> {
  pub fn new(tree: &'s mut ScopeTree) -> Self {
    Self { tree, path: vec![], scope_stack: vec![ScopeTree::WRAPPER_SCOPE_ID] }
  }

  pub fn collect(mut self, program: &Program<'a>) {
    self.visit_program(program);
  }

  fn current_scope(&self) -> ScopeId {
    self.scope_stack.last().copied().unwrap_or(ScopeTree::WRAPPER_SCOPE_ID)
  }

  fn push_scope(&mut self, kind: ScopeKind) -> ScopeId {
    let scope = self.tree.add_scope(Some(self.current_scope()), kind);
    self.scope_stack.push(scope);
    scope
  }

  fn declare(&mut self, scope: ScopeId, ident: &BindingIdentifier, flags: ReferenceFlags) {
    let at = self.current_scope();
    self.tree.declare(scope, &ident.name, ident.span, at, flags);
  }

  /// The scope a binding identifier outside of function and class names belongs to.
  fn binding_scope(&self) -> ScopeId {
    for kind in self.path.iter().rev() {
      match kind {
        AstKind::VariableDeclarator(declarator) => {
          return if declarator.kind.is_var() {
            self.tree.var_scope(self.current_scope())
          } else {
            self.current_scope()
          };
        }
        AstKind::FormalParameters(_) | AstKind::CatchParameter(_) => return self.current_scope(),
        _ => {}
      }
    }
    self.current_scope()
  }
}

impl<'a> Visit<'a> for DeclarationCollector<'_, 'a> {
  fn enter_node(&mut self, kind: AstKind<'a>) {
    match kind {
      AstKind::Function(func) => {
        if func.is_declaration() {
          if let Some(id) = &func.id {
            let scope = self.tree.var_scope(self.current_scope());
            self.declare(scope, id, ReferenceFlags::empty());
          }
        }
        let scope = self.push_scope(ScopeKind::Function);
        if func.is_expression() {
          if let Some(id) = &func.id {
            self.declare(scope, id, ReferenceFlags::empty());
          }
        }
      }
      AstKind::Class(class) => {
        if class.is_declaration() {
          if let Some(id) = &class.id {
            self.declare(self.current_scope(), id, ReferenceFlags::empty());
          }
        }
        let scope = self.push_scope(ScopeKind::Class);
        if class.is_expression() {
          if let Some(id) = &class.id {
            self.declare(scope, id, ReferenceFlags::empty());
          }
        }
      }
      _ => {
        if let Some(scope_kind) = scope_kind_of(&kind) {
          self.push_scope(scope_kind);
        }
      }
    }
    self.path.push(kind);
  }

  fn leave_node(&mut self, kind: AstKind<'a>) {
    self.path.pop();
    if scope_kind_of(&kind).is_some() {
      self.scope_stack.pop();
    }
  }

  fn visit_binding_identifier(&mut self, ident: &BindingIdentifier<'a>) {
    // Function and class names were declared on entering the node.
    if matches!(self.path.last(), Some(AstKind::Function(_) | AstKind::Class(_))) {
      return;
    }
    let flags = shorthand_binding_flags(self.path.last(), self.path.iter().rev().nth(1));
    let scope = self.binding_scope();
    self.declare(scope, ident, flags);
  }
}
