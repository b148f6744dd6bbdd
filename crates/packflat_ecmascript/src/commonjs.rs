use oxc_ast::AstKind;
use oxc_span::{CompactStr, GetSpan, Span};
use smallvec::SmallVec;

use crate::scope::BindingId;

/// A `require("...")` call with a static specifier, where `require` is the module's own.
#[derive(Debug, Clone)]
pub struct RequireCall {
  pub span: Span,
  pub specifier: CompactStr,
  /// The call may run conditionally, repeatedly or late, so its target can't be evaluated in
  /// dependency order.
  pub unpredictable: bool,
  pub declarator: Option<RequireDeclarator>,
}

/// `var name = require("...")`: the declarator the call initializes by itself.
#[derive(Debug, Clone)]
pub struct RequireDeclarator {
  pub binding: BindingId,
  pub declaration_span: Span,
  /// Spans of every declarator in the declaration, in source order.
  pub declarators: SmallVec<[Span; 2]>,
  /// Position of this declarator in `declarators`.
  pub index: usize,
}

impl RequireDeclarator {
  pub fn span(&self) -> Span {
    self.declarators[self.index]
  }
}

/// Whether the expression at `span` may run at a point other than its position in the module body.
///
/// `ancestors` is the path from the program down to the expression's parent. Functions invoked
/// where they are defined don't count, and neither does the test of an `if` statement.
pub fn is_order_unpredictable(ancestors: &[AstKind], span: Span) -> bool {
  let mut child = span;
  for (depth, kind) in ancestors.iter().enumerate().rev() {
    match kind {
      AstKind::Function(_) | AstKind::ArrowFunctionExpression(_) => {
        if !is_invoked_in_place(&ancestors[..depth], kind.span()) {
          return true;
        }
      }
      AstKind::IfStatement(stmt) => {
        if stmt.test.span() != child {
          return true;
        }
      }
      AstKind::WhileStatement(_)
      | AstKind::DoWhileStatement(_)
      | AstKind::ForStatement(_)
      | AstKind::ForInStatement(_)
      | AstKind::ForOfStatement(_) => return true,
      _ => {}
    }
    child = kind.span();
  }
  false
}

/// `(function () {})()`, `(function () {}).call(this)` or `.apply(...)`.
fn is_invoked_in_place(ancestors: &[AstKind], function_span: Span) -> bool {
  let mut outer = ancestors.iter().rev();
  match outer.next() {
    Some(AstKind::CallExpression(call)) => call.callee.span() == function_span,
    Some(AstKind::StaticMemberExpression(member)) => {
      member.object.span() == function_span
        && matches!(member.property.name.as_str(), "call" | "apply")
        && matches!(
          outer.next(),
          Some(AstKind::CallExpression(call)) if call.callee.span() == member.span
        )
    }
    _ => false,
  }
}

#[cfg(test)]
mod tests {
  use crate::EcmaCompiler;

  fn unpredictable(source: &str) -> Vec<bool> {
    let analysis = EcmaCompiler::analyze(source).unwrap();
    analysis.require_calls.iter().map(|call| call.unpredictable).collect()
  }

  #[test]
  fn top_level_calls_are_predictable() {
    assert_eq!(unpredictable("require('a'); var b = require('b').x;"), [false, false]);
  }

  #[test]
  fn deferred_calls() {
    assert_eq!(unpredictable("function f() { require('a') }"), [true]);
    assert_eq!(unpredictable("var f = () => require('a');"), [true]);
    assert_eq!(unpredictable("setTimeout(function () { require('a') });"), [true]);
  }

  #[test]
  fn functions_invoked_in_place() {
    assert_eq!(unpredictable("(function () { require('a') })();"), [false]);
    assert_eq!(unpredictable("(() => require('a'))();"), [false]);
    assert_eq!(unpredictable("(function () { require('a') }).call(this);"), [false]);
    assert_eq!(unpredictable("(function () { require('a') }).apply(this, []);"), [false]);
    assert_eq!(unpredictable("(function () { require('a') }).bind(this)();"), [true]);
  }

  #[test]
  fn conditionals_and_loops() {
    assert_eq!(unpredictable("if (require('a')) {}"), [false]);
    assert_eq!(unpredictable("if (x) require('a');"), [true]);
    assert_eq!(unpredictable("if (x) {} else { require('a') }"), [true]);
    assert_eq!(unpredictable("while (x) require('a');"), [true]);
    assert_eq!(unpredictable("do { require('a') } while (x);"), [true]);
    assert_eq!(unpredictable("for (const k of require('a')) {}"), [true]);
  }

  #[test]
  fn only_the_wrapper_require_counts() {
    assert!(unpredictable("function f(require) { require('a') }").is_empty());
    assert!(unpredictable("var require = load; require('a');").is_empty());
    assert!(unpredictable("require(name); require(`b${c}`);").is_empty());
  }

  #[test]
  fn template_specifiers() {
    let analysis = EcmaCompiler::analyze("require(`./a`);").unwrap();
    assert_eq!(analysis.require_calls[0].specifier.as_str(), "./a");
  }

  #[test]
  fn require_declarators() {
    let analysis =
      EcmaCompiler::analyze("var a = require('a'), b = 1, c = require('c'); var d = require('d').x;")
        .unwrap();
    let calls = &analysis.require_calls;
    let first = calls[0].declarator.as_ref().unwrap();
    assert_eq!((first.index, first.declarators.len()), (0, 3));
    let third = calls[1].declarator.as_ref().unwrap();
    assert_eq!(third.index, 2);
    assert_eq!(third.declaration_span, first.declaration_span);
    assert!(calls[2].declarator.is_none());
  }

  #[test]
  fn for_head_declarators_are_kept() {
    let analysis = EcmaCompiler::analyze("for (var a = require('a'); a; ) {}").unwrap();
    assert!(analysis.require_calls[0].declarator.is_none());
  }
}
