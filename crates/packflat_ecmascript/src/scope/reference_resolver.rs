use oxc_ast::{
  ast::{AssignmentExpression, BindingPattern, CallExpression, Expression, IdentifierReference, Program},
  AstKind,
};
use oxc_ast_visit::Visit;
use oxc_span::{CompactStr, GetSpan, Span};
use oxc_syntax::operator::{AssignmentOperator, UnaryOperator};

use super::{
  scope_kind_of, MemberAssignment, MemberParent, ReferenceFlags, ReferenceParent, ScopeId,
  ScopeTree,
};
use crate::{
  commonjs::{is_order_unpredictable, RequireCall, RequireDeclarator},
  ecma_utils::{ArgumentsExt, ExpressionExt},
};

/// Second pass: replays the scopes created by [`super::DeclarationCollector`] and resolves every
/// identifier reference, collecting `require(...)` calls on the way.
pub(crate) struct ReferenceResolver<'s, 'a> {
  tree: &'s mut ScopeTree,
  path: Vec<AstKind<'a>>,
  scope_stack: Vec<ScopeId>,
  next_scope: usize,
  require_calls: Vec<RequireCall>,
}

impl<'s, 'a> ReferenceResolver<'s, 'a> {
  pub fn new(tree: &'s mut ScopeTree) -> Self {
    Self {
      tree,
      path: vec![],
      scope_stack: vec![ScopeTree::WRAPPER_SCOPE_ID],
      next_scope: ScopeTree::PROGRAM_SCOPE_ID.index(),
      require_calls: vec![],
    }
  }

  pub fn resolve(mut self, program: &Program<'a>) -> Vec<RequireCall> {
    self.visit_program(program);
    debug_assert_eq!(self.next_scope, self.tree.scopes_len());
    self.require_calls
  }

  fn current_scope(&self) -> ScopeId {
    self.scope_stack.last().copied().unwrap_or(ScopeTree::WRAPPER_SCOPE_ID)
  }

  fn ancestor(&self, depth: usize) -> Option<&AstKind<'a>> {
    self.path.iter().rev().nth(depth)
  }

  fn reference_context(&self, span: Span) -> (ReferenceFlags, ReferenceParent) {
    match self.ancestor(0) {
      Some(AstKind::ObjectProperty(prop)) if prop.shorthand => {
        (ReferenceFlags::Shorthand, ReferenceParent::None)
      }
      Some(AstKind::AssignmentTargetPropertyIdentifier(_)) => {
        (ReferenceFlags::Shorthand, ReferenceParent::None)
      }
      Some(AstKind::UnaryExpression(unary)) if unary.operator == UnaryOperator::Typeof => {
        (ReferenceFlags::empty(), ReferenceParent::Typeof(unary.span))
      }
      Some(AstKind::StaticMemberExpression(member)) if member.object.span() == span => {
        let parent = MemberParent {
          span: member.span,
          property: Some(CompactStr::new(&member.property.name)),
          assignment: self.member_assignment(member.span),
        };
        (ReferenceFlags::empty(), ReferenceParent::Member(parent))
      }
      Some(AstKind::ComputedMemberExpression(member)) if member.object.span() == span => {
        let property = member.expression.as_static_property_key().map(CompactStr::new);
        let parent = MemberParent {
          span: member.span,
          property,
          assignment: self.member_assignment(member.span),
        };
        (ReferenceFlags::empty(), ReferenceParent::Member(parent))
      }
      _ => (ReferenceFlags::empty(), ReferenceParent::None),
    }
  }

  /// `<member> = value`, where the member expression at `member_span` is the target.
  fn member_assignment(&self, member_span: Span) -> Option<MemberAssignment> {
    let Some(AstKind::AssignmentExpression(assign)) = self.ancestor(1) else {
      return None;
    };
    if assign.operator != AssignmentOperator::Assign || assign.left.span() != member_span {
      return None;
    }
    let is_statement = matches!(
      self.ancestor(2),
      Some(AstKind::ExpressionStatement(stmt)) if stmt.expression.span() == assign.span
    );
    Some(MemberAssignment { is_statement, value_name: assigned_value_name(assign) })
  }

  fn collect_require_call(&mut self, call: &CallExpression<'a>) {
    if !call.callee.is_require_identifier() {
      return;
    }
    let resolved = self.tree.find_binding(self.current_scope(), "require");
    if resolved.is_none() || resolved != self.tree.wrapper_binding("require") {
      return;
    }
    let Some(specifier) = call.arguments.first_static_string() else {
      return;
    };
    let request = RequireCall {
      span: call.span,
      specifier: CompactStr::new(specifier),
      unpredictable: is_order_unpredictable(&self.path, call.span),
      declarator: self.require_declarator(call.span),
    };
    self.require_calls.push(request);
  }

  /// `var name = require(...)` with the call as the whole initializer, outside of `for` heads.
  fn require_declarator(&self, call_span: Span) -> Option<RequireDeclarator> {
    let Some(AstKind::VariableDeclarator(declarator)) = self.ancestor(0) else {
      return None;
    };
    if declarator.init.as_ref().map(GetSpan::span) != Some(call_span) {
      return None;
    }
    let BindingPattern::BindingIdentifier(ident) = &declarator.id else {
      return None;
    };
    let Some(AstKind::VariableDeclaration(declaration)) = self.ancestor(1) else {
      return None;
    };
    if matches!(
      self.ancestor(2),
      Some(AstKind::ForStatement(_) | AstKind::ForInStatement(_) | AstKind::ForOfStatement(_))
    ) {
      return None;
    }
    let binding = self.tree.find_binding(self.current_scope(), &ident.name)?;
    let declarators = declaration.declarations.iter().map(|decl| decl.span).collect();
    let index = declaration.declarations.iter().position(|decl| decl.span == declarator.span)?;
    Some(RequireDeclarator { binding, declaration_span: declaration.span, declarators, index })
  }
}

fn assigned_value_name(assign: &AssignmentExpression) -> Option<CompactStr> {
  match &assign.right {
    Expression::FunctionExpression(func) => func.id.as_ref().map(|id| CompactStr::new(&id.name)),
    Expression::ClassExpression(class) => class.id.as_ref().map(|id| CompactStr::new(&id.name)),
    Expression::Identifier(ident) => Some(CompactStr::new(&ident.name)),
    _ => None,
  }
}

impl<'a> Visit<'a> for ReferenceResolver<'_, 'a> {
  fn enter_node(&mut self, kind: AstKind<'a>) {
    if let AstKind::CallExpression(call) = kind {
      self.collect_require_call(call);
    }
    if scope_kind_of(&kind).is_some() {
      self.scope_stack.push(ScopeId::from_usize(self.next_scope));
      self.next_scope += 1;
    }
    self.path.push(kind);
  }

  fn leave_node(&mut self, kind: AstKind<'a>) {
    self.path.pop();
    if scope_kind_of(&kind).is_some() {
      self.scope_stack.pop();
    }
  }

  fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
    let scope = self.current_scope();
    let binding = match self.tree.find_binding(scope, &ident.name) {
      Some(binding) => binding,
      None => self.tree.undeclared_binding(&ident.name),
    };
    let (flags, parent) = self.reference_context(ident.span);
    self.tree.add_reference(binding, ident.span, scope, flags, parent);
  }
}
