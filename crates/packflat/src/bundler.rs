use std::sync::Arc;

use packflat_common::{BundlerOptions, ModuleRecord, ModuleTable};
use packflat_error::BuildResult;

use crate::{
  stages::{
    generate::{GenerateStage, GenerateStageOutput},
    link::LinkStage,
    scan::ScanStage,
  },
  types::{bundle_output::BundleOutput, SharedOptions},
  utils::normalize_options::normalize_options,
};

pub struct Bundler {
  pub(crate) options: SharedOptions,
}

impl Bundler {
  pub fn new(options: BundlerOptions) -> Self {
    Bundler { options: Arc::new(normalize_options(options)) }
  }

  /// Flattens `records`, the complete module graph of one build, into a single script.
  #[tracing::instrument(level = "debug", skip_all, fields(modules = records.len()))]
  pub fn bundle(&self, records: Vec<ModuleRecord>) -> BuildResult<BundleOutput> {
    let module_table = ModuleTable::new(records)?;
    let scan_stage_output = ScanStage::new(module_table).scan()?;
    let link_stage_output = LinkStage::new(scan_stage_output).link();
    let GenerateStageOutput { code, map } =
      GenerateStage::new(&link_stage_output, &self.options).generate()?;

    Ok(BundleOutput { code, map, warnings: link_stage_output.warnings })
  }
}
