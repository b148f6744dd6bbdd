use packflat_common::{DepTarget, ModuleIdx};
use packflat_ecmascript::{ReferenceId, RequireCall};
use rustc_hash::FxHashMap;

/// How a module uses the names its CommonJS wrapper provides.
#[derive(Debug, Default)]
pub struct CommonJsUsage {
  /// `module` occurrences that are the object of `module.exports`.
  pub module_exports: Vec<ReferenceId>,
  pub exports: Vec<ReferenceId>,
  /// Every other `module` occurrence.
  pub module: Vec<ReferenceId>,
  pub require: Vec<ReferenceId>,
}

impl CommonJsUsage {
  pub fn has_exports(&self) -> bool {
    !self.module_exports.is_empty() || !self.exports.is_empty()
  }
}

#[derive(Debug)]
pub struct ResolvedRequire {
  pub call: RequireCall,
  pub target: DepTarget,
}

/// Everything derived about a module while flattening, kept apart from its analysis.
#[derive(Debug)]
pub struct RewriteState {
  /// The top-level variable holding the module's exports once flattened.
  pub exports_name: String,
  /// The module's only export is one top-level `module.exports = ...` statement.
  pub is_simple_export: bool,
  pub usage: CommonJsUsage,
  /// Evaluated through a factory the first time it is required, instead of in place.
  pub on_demand: bool,
  /// In source order.
  pub requires: Vec<ResolvedRequire>,
  /// End offset of the first `require` call reaching each bundled dependency.
  pub dependency_order: FxHashMap<ModuleIdx, u32>,
}

impl RewriteState {
  pub fn has_exports(&self) -> bool {
    self.usage.has_exports()
  }
}
