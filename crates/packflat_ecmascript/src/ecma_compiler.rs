use anyhow::bail;
use itertools::Itertools;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::{ParseOptions, Parser};
use oxc_span::{SourceType, Span};

use crate::{
  commonjs::RequireCall,
  scope::{DeclarationCollector, ReferenceResolver, ScopeTree},
};

/// Everything the bundler needs to know about one module's source, detached from its AST.
#[derive(Debug)]
pub struct ModuleAnalysis {
  pub scopes: ScopeTree,
  /// In source order.
  pub require_calls: Vec<RequireCall>,
  /// The last `//# sourceMappingURL=` line comment that starts its own line.
  pub sourcemap_comment: Option<Span>,
}

pub struct EcmaCompiler;

impl EcmaCompiler {
  /// Parses `source` as the body of a CommonJS function wrapper.
  pub fn parse<'a>(allocator: &'a Allocator, source: &'a str) -> anyhow::Result<Program<'a>> {
    let options = ParseOptions {
      allow_return_outside_function: true,
      preserve_parens: false,
      ..ParseOptions::default()
    };
    let ret = Parser::new(allocator, source, SourceType::cjs()).with_options(options).parse();
    if ret.panicked || !ret.errors.is_empty() {
      bail!("{}", ret.errors.iter().map(ToString::to_string).join("\n"));
    }
    Ok(ret.program)
  }

  pub fn analyze(source: &str) -> anyhow::Result<ModuleAnalysis> {
    let allocator = Allocator::default();
    let program = Self::parse(&allocator, source)?;
    let mut scopes = ScopeTree::new();
    DeclarationCollector::new(&mut scopes).collect(&program);
    let require_calls = ReferenceResolver::new(&mut scopes).resolve(&program);
    let sourcemap_comment = find_sourcemap_comment(&program, source);
    tracing::trace!(
      scopes = scopes.scopes_len(),
      require_calls = require_calls.len(),
      "analyzed module"
    );
    Ok(ModuleAnalysis { scopes, require_calls, sourcemap_comment })
  }
}

fn find_sourcemap_comment(program: &Program, source: &str) -> Option<Span> {
  let is_sourcemap_comment = |span: &Span| {
    let text = span.source_text(source);
    let before = &source[..span.start as usize];
    let line_start = before.rfind(['\n', '\r']).map_or(0, |index| index + 1);
    (text.starts_with("//# sourceMappingURL=") || text.starts_with("//@ sourceMappingURL="))
      && before[line_start..].trim().is_empty()
  };
  program
    .comments
    .iter()
    .rev()
    .filter(|comment| comment.is_line())
    .map(|comment| comment.span)
    .find(is_sourcemap_comment)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scope::{ReferenceParent, ScopeKind};

  fn names(analysis: &ModuleAnalysis) -> Vec<&str> {
    analysis.scopes.program_bindings().map(|(name, _)| name.as_str()).collect()
  }

  #[test]
  fn basic_test() {
    let analysis = EcmaCompiler::analyze("const a = 1;").unwrap();
    assert_eq!(names(&analysis), ["a"]);
  }

  #[test]
  fn syntax_error() {
    let err = EcmaCompiler::analyze("var = ;").unwrap_err();
    assert!(!err.to_string().is_empty());
  }

  #[test]
  fn return_at_top_level() {
    assert!(EcmaCompiler::analyze("if (x) return; var a;").is_ok());
  }

  #[test]
  fn var_hoists_out_of_blocks() {
    let analysis =
      EcmaCompiler::analyze("{ var a; let b; } function f() { var c; } for (var i;;) {}").unwrap();
    assert_eq!(names(&analysis), ["a", "f", "i"]);
  }

  #[test]
  fn function_declarations_hoist_and_expressions_do_not() {
    let analysis = EcmaCompiler::analyze("if (x) { function f() {} } var g = function h() {};")
      .unwrap();
    assert_eq!(names(&analysis), ["f", "g"]);
  }

  #[test]
  fn class_declarations_are_lexical() {
    let analysis = EcmaCompiler::analyze("class A {} { class B {} }").unwrap();
    assert_eq!(names(&analysis), ["A"]);
  }

  #[test]
  fn references_resolve_to_later_declarations() {
    let analysis = EcmaCompiler::analyze("use(a); var a = 1; a++;").unwrap();
    let scopes = &analysis.scopes;
    let binding = scopes.find_binding(ScopeTree::PROGRAM_SCOPE_ID, "a").unwrap();
    assert_eq!(scopes.references_of(binding).count(), 3);
    assert_eq!(scopes.undeclared_names().map(|name| name.as_str()).collect::<Vec<_>>(), ["use"]);
  }

  #[test]
  fn parameters_shadow_wrapper_bindings() {
    let analysis = EcmaCompiler::analyze("function f(module) { module.x = 1 } exports.y = 2;").unwrap();
    let scopes = &analysis.scopes;
    let module = scopes.wrapper_binding("module").unwrap();
    let exports = scopes.wrapper_binding("exports").unwrap();
    assert_eq!(scopes.references_of(module).count(), 0);
    assert_eq!(scopes.references_of(exports).count(), 1);
  }

  #[test]
  fn shorthand_occurrences() {
    let analysis = EcmaCompiler::analyze("var { a } = o; var { b = 1 } = o; x = { a, b }; ({ a } = o);").unwrap();
    let scopes = &analysis.scopes;
    for name in ["a", "b"] {
      let binding = scopes.find_binding(ScopeTree::PROGRAM_SCOPE_ID, name).unwrap();
      assert!(scopes.references_of(binding).all(|reference| reference.is_shorthand()));
    }
  }

  #[test]
  fn module_exports_assignment() {
    let analysis = EcmaCompiler::analyze("module.exports = function Foo() {};").unwrap();
    let scopes = &analysis.scopes;
    let module = scopes.wrapper_binding("module").unwrap();
    let reference = scopes.references_of(module).next().unwrap();
    let ReferenceParent::Member(member) = &reference.parent else { panic!("not a member") };
    assert_eq!(member.property.as_deref(), Some("exports"));
    let assignment = member.assignment.as_ref().unwrap();
    assert!(assignment.is_statement);
    assert_eq!(assignment.value_name.as_deref(), Some("Foo"));
    assert_eq!(scopes.var_scope(reference.scope), ScopeTree::PROGRAM_SCOPE_ID);
  }

  #[test]
  fn computed_and_typeof_parents() {
    let analysis = EcmaCompiler::analyze("module['exports'].a = 1; typeof module;").unwrap();
    let scopes = &analysis.scopes;
    let module = scopes.wrapper_binding("module").unwrap();
    let parents = scopes.references_of(module).map(|reference| &reference.parent).collect::<Vec<_>>();
    assert!(matches!(parents[0], ReferenceParent::Member(member) if member.property.as_deref() == Some("exports") && member.assignment.is_none()));
    assert!(matches!(parents[1], ReferenceParent::Typeof(_)));
  }

  #[test]
  fn sourcemap_comments_must_be_real_comments_on_their_own_line() {
    let comment = |source: &str| {
      EcmaCompiler::analyze(source).unwrap().sourcemap_comment.map(|span| span.source_text(source).to_string())
    };
    assert_eq!(
      comment("var a;\n//# sourceMappingURL=a.map\n").as_deref(),
      Some("//# sourceMappingURL=a.map")
    );
    assert_eq!(comment("var a;\n  //@ sourceMappingURL=b.map").as_deref(), Some("//@ sourceMappingURL=b.map"));
    assert_eq!(comment("var a; //# sourceMappingURL=a.map"), None);
    assert_eq!(comment("var banner = `\n//# sourceMappingURL=data:application/json;base64,e30=\n`;"), None);
    assert_eq!(comment("var s = '//# sourceMappingURL=a.map';"), None);
  }

  #[test]
  fn catch_and_static_block_scopes() {
    let analysis =
      EcmaCompiler::analyze("try {} catch (e) { var v; } class C { static { var s; } }").unwrap();
    assert_eq!(names(&analysis), ["v", "C"]);
    let kinds = (0..analysis.scopes.scopes_len())
      .map(|index| analysis.scopes.scope(crate::scope::ScopeId::from_usize(index)).kind)
      .collect::<Vec<_>>();
    assert!(kinds.contains(&ScopeKind::Catch));
    assert!(kinds.contains(&ScopeKind::StaticBlock));
  }
}
