mod render_bundle;
mod rewrite_module;

use anyhow::Context;
use packflat_error::BuildResult;
use packflat_sourcemap::SourceMap;
use packflat_utils::concat_string;

use self::rewrite_module::ModuleRewriter;
use super::link::LinkStageOutput;
use crate::{runtime::RuntimeHelpers, types::SharedOptions};

#[derive(Debug)]
pub struct GenerateStageOutput {
  pub code: String,
  pub map: Option<SourceMap>,
}

pub struct GenerateStage<'a> {
  link_output: &'a LinkStageOutput,
  options: &'a SharedOptions,
  helpers: RuntimeHelpers,
}

impl<'a> GenerateStage<'a> {
  pub fn new(link_output: &'a LinkStageOutput, options: &'a SharedOptions) -> Self {
    let helpers = RuntimeHelpers::new(&link_output.module_table.modules);
    Self { link_output, options, helpers }
  }

  pub fn generate(&self) -> BuildResult<GenerateStageOutput> {
    let mut rendered = Vec::with_capacity(self.link_output.sorted_modules.len());
    let mut errors = vec![];

    for &idx in &self.link_output.sorted_modules {
      let record = &self.link_output.module_table.modules[idx];
      match ModuleRewriter::new(self, idx)
        .rewrite()
        .with_context(|| concat_string!("module ", record.debug_label()))
      {
        Ok(module) => rendered.push(module),
        Err(err) => errors.push(err),
      }
    }

    if !errors.is_empty() {
      Err(errors)?;
    }

    let output = self.render_bundle(rendered)?;
    tracing::debug!(bytes = output.code.len(), has_map = output.map.is_some(), "generated bundle");
    Ok(output)
  }
}
