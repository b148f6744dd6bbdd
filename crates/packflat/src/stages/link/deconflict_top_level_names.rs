use packflat_ecmascript::{BindingId, ScopeTree};
use rustc_hash::FxHashSet;

use super::LinkStage;

/// Names taken so far in the flattened scope, threaded through modules in emission order.
#[derive(Debug, Default)]
pub struct UsedNames<'a> {
  names: FxHashSet<&'a str>,
}

impl<'a> UsedNames<'a> {
  /// Globals every module sees. These are claimed before any module declares anything, so a
  /// declaration in an early module still yields to a global only a later module reads.
  pub fn with_globals(modules: impl IntoIterator<Item = &'a ScopeTree>) -> Self {
    let names = modules.into_iter().flat_map(ScopeTree::undeclared_names).map(|name| name.as_str()).collect();
    Self { names }
  }

  /// Claims the top-level names of `scopes`, returning the bindings whose name was already taken.
  pub fn claim_top_level(&mut self, scopes: &'a ScopeTree) -> Vec<BindingId> {
    scopes
      .program_bindings()
      .filter_map(|(name, binding)| (!self.names.insert(name.as_str())).then_some(binding))
      .collect()
  }
}

impl LinkStage {
  pub(super) fn deconflict_top_level_names(&mut self) {
    let analyses = &self.analyses;
    let mut used_names = UsedNames::with_globals(analyses.iter().map(|analysis| &analysis.scopes));
    for idx in &self.sorted_modules {
      let renamed = used_names.claim_top_level(&analyses[*idx].scopes);
      if !renamed.is_empty() {
        tracing::trace!(
          module = %self.module_table.modules[*idx].id,
          count = renamed.len(),
          "renaming colliding top-level bindings"
        );
      }
      self.renamed_bindings[*idx] = renamed;
    }
  }
}

#[cfg(test)]
mod tests {
  use packflat_ecmascript::EcmaCompiler;

  use super::*;

  fn names(scopes: &ScopeTree, bindings: &[BindingId]) -> Vec<String> {
    bindings.iter().map(|binding| scopes.binding(*binding).name.to_string()).collect()
  }

  #[test]
  fn later_declarations_are_renamed() {
    let first = EcmaCompiler::analyze("var a = 1; function b() {}").unwrap();
    let second = EcmaCompiler::analyze("var b = 2; var c = 3;").unwrap();
    let mut used = UsedNames::with_globals([&first.scopes, &second.scopes]);
    assert_eq!(names(&first.scopes, &used.claim_top_level(&first.scopes)), Vec::<String>::new());
    assert_eq!(names(&second.scopes, &used.claim_top_level(&second.scopes)), ["b"]);
  }

  #[test]
  fn globals_used_later_win() {
    let first = EcmaCompiler::analyze("var document = {};").unwrap();
    let second = EcmaCompiler::analyze("document.title = 'x';").unwrap();
    let mut used = UsedNames::with_globals([&first.scopes, &second.scopes]);
    assert_eq!(names(&first.scopes, &used.claim_top_level(&first.scopes)), ["document"]);
  }
}
