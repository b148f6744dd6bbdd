mod bundler_options;
mod types;

pub use crate::{
  bundler_options::{normalized_bundler_options::NormalizedBundlerOptions, BundlerOptions},
  types::{
    module_id::ModuleId,
    module_record::{ModuleDeps, ModuleRecord},
    module_table::{DepTarget, IndexModules, ModuleTable},
    raw_idx::ModuleIdx,
  },
};
