mod declaration_collector;
mod reference_resolver;

use bitflags::bitflags;
use oxc_index::IndexVec;
use oxc_span::{CompactStr, Span};
use packflat_utils::indexmap::FxIndexMap;

pub(crate) use self::{declaration_collector::DeclarationCollector, reference_resolver::ReferenceResolver};

oxc_index::define_index_type! {
  pub struct ScopeId = u32;
}

oxc_index::define_index_type! {
  pub struct BindingId = u32;
}

oxc_index::define_index_type! {
  pub struct ReferenceId = u32;
}

/// Names a CommonJS module receives from its function wrapper.
pub const WRAPPER_BINDINGS: [&str; 3] = ["require", "module", "exports"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
  /// The CommonJS function wrapper around the program.
  Wrapper,
  Program,
  Function,
  StaticBlock,
  Class,
  Catch,
  Block,
}

impl ScopeKind {
  /// `var` and function declarations bind in the nearest scope of these kinds.
  pub fn is_var_scope(self) -> bool {
    matches!(self, Self::Wrapper | Self::Program | Self::Function | Self::StaticBlock)
  }
}

#[derive(Debug)]
pub struct Scope {
  pub parent: Option<ScopeId>,
  pub kind: ScopeKind,
  /// In declaration order.
  pub bindings: FxIndexMap<CompactStr, BindingId>,
  /// Only populated on the wrapper scope, in order of first use.
  pub undeclared: FxIndexMap<CompactStr, BindingId>,
}

#[derive(Debug)]
pub struct Binding {
  pub name: CompactStr,
  pub scope: ScopeId,
  /// The first declaring occurrence. `None` for wrapper bindings and undeclared names.
  pub definition: Option<ReferenceId>,
  /// Every occurrence of the name: declarations first, in source order within each pass.
  pub references: Vec<ReferenceId>,
}

bitflags! {
  #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
  pub struct ReferenceFlags: u8 {
    /// The occurrence declares the binding.
    const Declaration = 1 << 0;
    /// `{ a }`, `({ a } = b)` or `var { a } = b`: renaming must keep the property key.
    const Shorthand = 1 << 1;
  }
}

/// The syntactic position of an identifier, as far as CommonJS rewriting cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceParent {
  None,
  /// `typeof <ident>`, with the span of the whole unary expression.
  Typeof(Span),
  Member(MemberParent),
}

/// `<ident>.property` or `<ident>["property"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberParent {
  pub span: Span,
  /// `None` for computed access with anything but a string literal.
  pub property: Option<CompactStr>,
  /// Set when the member expression is the target of a plain `=` assignment.
  pub assignment: Option<MemberAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberAssignment {
  /// The assignment is a statement on its own.
  pub is_statement: bool,
  /// Name of the assigned value when it is an identifier or a named function or class expression.
  pub value_name: Option<CompactStr>,
}

#[derive(Debug)]
pub struct Reference {
  pub span: Span,
  pub scope: ScopeId,
  pub binding: BindingId,
  pub flags: ReferenceFlags,
  pub parent: ReferenceParent,
}

impl Reference {
  pub fn is_shorthand(&self) -> bool {
    self.flags.contains(ReferenceFlags::Shorthand)
  }

  pub fn member(&self) -> Option<&MemberParent> {
    match &self.parent {
      ReferenceParent::Member(member) => Some(member),
      _ => None,
    }
  }

  pub fn member_property(&self) -> Option<&str> {
    self.member().and_then(|member| member.property.as_deref())
  }
}

/// Arena of every scope, binding and identifier occurrence of one module.
#[derive(Debug)]
pub struct ScopeTree {
  scopes: IndexVec<ScopeId, Scope>,
  bindings: IndexVec<BindingId, Binding>,
  references: IndexVec<ReferenceId, Reference>,
}

impl ScopeTree {
  pub const WRAPPER_SCOPE_ID: ScopeId = ScopeId::from_usize(0);
  pub const PROGRAM_SCOPE_ID: ScopeId = ScopeId::from_usize(1);

  pub(crate) fn new() -> Self {
    let mut tree =
      Self { scopes: IndexVec::new(), bindings: IndexVec::new(), references: IndexVec::new() };
    let wrapper = tree.add_scope(None, ScopeKind::Wrapper);
    for name in WRAPPER_BINDINGS {
      let binding = tree.bindings.push(Binding {
        name: CompactStr::new(name),
        scope: wrapper,
        definition: None,
        references: vec![],
      });
      tree.scopes[wrapper].bindings.insert(CompactStr::new(name), binding);
    }
    tree
  }

  pub(crate) fn add_scope(&mut self, parent: Option<ScopeId>, kind: ScopeKind) -> ScopeId {
    self.scopes.push(Scope {
      parent,
      kind,
      bindings: FxIndexMap::default(),
      undeclared: FxIndexMap::default(),
    })
  }

  /// Declares `name` in `scope`. Redeclaring a name adds the occurrence to the existing binding.
  pub(crate) fn declare(
    &mut self,
    scope: ScopeId,
    name: &str,
    span: Span,
    at: ScopeId,
    flags: ReferenceFlags,
  ) -> BindingId {
    if let Some(&binding) = self.scopes[scope].bindings.get(name) {
      self.add_reference(binding, span, at, flags | ReferenceFlags::Declaration, ReferenceParent::None);
      return binding;
    }
    let binding = self.bindings.push(Binding {
      name: CompactStr::new(name),
      scope,
      definition: None,
      references: vec![],
    });
    self.scopes[scope].bindings.insert(CompactStr::new(name), binding);
    let reference =
      self.add_reference(binding, span, at, flags | ReferenceFlags::Declaration, ReferenceParent::None);
    self.bindings[binding].definition = Some(reference);
    binding
  }

  pub(crate) fn add_reference(
    &mut self,
    binding: BindingId,
    span: Span,
    scope: ScopeId,
    flags: ReferenceFlags,
    parent: ReferenceParent,
  ) -> ReferenceId {
    let reference = self.references.push(Reference { span, scope, binding, flags, parent });
    self.bindings[binding].references.push(reference);
    reference
  }

  /// The binding for a name no scope declares, created on the wrapper scope on first use.
  pub(crate) fn undeclared_binding(&mut self, name: &str) -> BindingId {
    let wrapper = Self::WRAPPER_SCOPE_ID;
    if let Some(&binding) = self.scopes[wrapper].undeclared.get(name) {
      return binding;
    }
    let binding = self.bindings.push(Binding {
      name: CompactStr::new(name),
      scope: wrapper,
      definition: None,
      references: vec![],
    });
    self.scopes[wrapper].undeclared.insert(CompactStr::new(name), binding);
    binding
  }

  /// Resolves `name` as seen from `scope`, walking outwards.
  pub fn find_binding(&self, scope: ScopeId, name: &str) -> Option<BindingId> {
    let mut current = Some(scope);
    while let Some(scope_id) = current {
      let scope = &self.scopes[scope_id];
      if let Some(&binding) = scope.bindings.get(name) {
        return Some(binding);
      }
      current = scope.parent;
    }
    None
  }

  /// The nearest enclosing scope `var` declarations would bind in.
  pub fn var_scope(&self, scope: ScopeId) -> ScopeId {
    let mut current = scope;
    while !self.scopes[current].kind.is_var_scope() {
      match self.scopes[current].parent {
        Some(parent) => current = parent,
        None => break,
      }
    }
    current
  }

  pub fn scope(&self, id: ScopeId) -> &Scope {
    &self.scopes[id]
  }

  pub fn binding(&self, id: BindingId) -> &Binding {
    &self.bindings[id]
  }

  pub fn reference(&self, id: ReferenceId) -> &Reference {
    &self.references[id]
  }

  pub fn scopes_len(&self) -> usize {
    self.scopes.len()
  }

  /// One of `require`, `module` or `exports`.
  pub fn wrapper_binding(&self, name: &str) -> Option<BindingId> {
    self.scopes[Self::WRAPPER_SCOPE_ID].bindings.get(name).copied()
  }

  /// Names referenced anywhere in the module without a declaration.
  pub fn undeclared_names(&self) -> impl Iterator<Item = &CompactStr> {
    self.scopes[Self::WRAPPER_SCOPE_ID].undeclared.keys()
  }

  /// Top-level bindings of the module, in declaration order.
  pub fn program_bindings(&self) -> impl Iterator<Item = (&CompactStr, BindingId)> {
    self.scopes[Self::PROGRAM_SCOPE_ID].bindings.iter().map(|(name, id)| (name, *id))
  }

  /// References of `binding`, resolved.
  pub fn references_of(&self, binding: BindingId) -> impl Iterator<Item = &Reference> {
    self.bindings[binding].references.iter().map(|id| &self.references[*id])
  }
}

/// The kind of scope `kind` opens, if it opens one. Functions and classes are handled by the passes.
pub(crate) fn scope_kind_of(kind: &oxc_ast::AstKind) -> Option<ScopeKind> {
  use oxc_ast::AstKind;
  match kind {
    AstKind::Program(_) => Some(ScopeKind::Program),
    AstKind::Function(_) | AstKind::ArrowFunctionExpression(_) => Some(ScopeKind::Function),
    AstKind::Class(_) => Some(ScopeKind::Class),
    AstKind::StaticBlock(_) => Some(ScopeKind::StaticBlock),
    AstKind::CatchClause(_) => Some(ScopeKind::Catch),
    AstKind::BlockStatement(_)
    | AstKind::ForStatement(_)
    | AstKind::ForInStatement(_)
    | AstKind::ForOfStatement(_)
    | AstKind::SwitchStatement(_) => Some(ScopeKind::Block),
    _ => None,
  }
}

/// Shorthand flag for an identifier whose parent is `parent` and grandparent `grandparent`.
pub(crate) fn shorthand_binding_flags(
  parent: Option<&oxc_ast::AstKind>,
  grandparent: Option<&oxc_ast::AstKind>,
) -> ReferenceFlags {
  use oxc_ast::AstKind;
  let shorthand = match parent {
    Some(AstKind::BindingProperty(prop)) => prop.shorthand,
    Some(AstKind::AssignmentPattern(_)) => {
      matches!(grandparent, Some(AstKind::BindingProperty(prop)) if prop.shorthand)
    }
    _ => false,
  };
  if shorthand { ReferenceFlags::Shorthand } else { ReferenceFlags::empty() }
}
