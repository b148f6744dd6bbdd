use std::path::PathBuf;

use crate::ModuleId;

#[derive(Debug)]
pub struct NormalizedBundlerOptions {
  // --- Output shape
  pub standalone: Option<String>,
  pub standalone_module: Option<ModuleId>,
  pub iife: bool,

  // --- Source maps
  pub debug: bool,
  pub basedir: Option<PathBuf>,
}
