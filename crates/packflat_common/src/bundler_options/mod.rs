pub mod normalized_bundler_options;

use std::path::PathBuf;

use serde::Deserialize;

use crate::ModuleId;

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerOptions {
  // --- Output shape
  /// Wrap the bundle in a UMD wrapper exporting under this global name.
  pub standalone: Option<String>,
  /// Module whose exports the standalone wrapper returns, in addition to entries with exports.
  pub standalone_module: Option<ModuleId>,
  /// Wrap the bundle in `(function(){ ... }());` when it is neither standalone nor exposing modules.
  pub iife: Option<bool>,

  // --- Source maps
  /// Generate an inline source map.
  pub debug: Option<bool>,
  /// Source map file names are made relative to this directory.
  pub basedir: Option<PathBuf>,
}
