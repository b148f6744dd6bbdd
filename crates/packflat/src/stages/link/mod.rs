mod deconflict_top_level_names;
mod detect_cycles;
mod determine_on_demand_modules;
mod sort_modules;

use oxc_index::IndexVec;
use packflat_common::{ModuleIdx, ModuleTable};
use packflat_ecmascript::BindingId;

use super::scan::ScanStageOutput;
use crate::types::{IndexModuleAnalyses, IndexRewriteStates};

pub type IndexRenamedBindings = IndexVec<ModuleIdx, Vec<BindingId>>;

#[derive(Debug)]
pub struct LinkStageOutput {
  pub module_table: ModuleTable,
  pub analyses: IndexModuleAnalyses,
  pub states: IndexRewriteStates,
  /// Emission order: on-demand modules first, then everything else after its dependencies.
  pub sorted_modules: Vec<ModuleIdx>,
  /// Top-level bindings whose names collide with a name used by another module.
  pub renamed_bindings: IndexRenamedBindings,
  pub warnings: Vec<anyhow::Error>,
}

#[derive(Debug)]
pub struct LinkStage {
  pub module_table: ModuleTable,
  pub analyses: IndexModuleAnalyses,
  pub states: IndexRewriteStates,
  pub sorted_modules: Vec<ModuleIdx>,
  pub renamed_bindings: IndexRenamedBindings,
  pub warnings: Vec<anyhow::Error>,
}

impl LinkStage {
  pub fn new(scan_stage_output: ScanStageOutput) -> Self {
    let ScanStageOutput { module_table, analyses, states } = scan_stage_output;
    let renamed_bindings = IndexVec::from_vec(vec![Vec::new(); module_table.len()]);
    Self {
      module_table,
      analyses,
      states,
      sorted_modules: Vec::new(),
      renamed_bindings,
      warnings: Vec::new(),
    }
  }

  pub fn link(mut self) -> LinkStageOutput {
    self.determine_on_demand_modules();
    self.sort_modules();
    self.deconflict_top_level_names();
    self.move_on_demand_modules_to_front();

    tracing::debug!(
      modules = self.sorted_modules.len(),
      on_demand = self.states.iter().filter(|state| state.on_demand).count(),
      warnings = self.warnings.len(),
      "linked modules"
    );

    LinkStageOutput {
      module_table: self.module_table,
      analyses: self.analyses,
      states: self.states,
      sorted_modules: self.sorted_modules,
      renamed_bindings: self.renamed_bindings,
      warnings: self.warnings,
    }
  }

  /// Factories must be defined before any eager code can call them. On-demand modules keep
  /// their dependency order relative to each other.
  fn move_on_demand_modules_to_front(&mut self) {
    let states = &self.states;
    let (mut on_demand, eager): (Vec<_>, Vec<_>) =
      self.sorted_modules.iter().copied().partition(|idx| states[*idx].on_demand);
    on_demand.extend(eager);
    self.sorted_modules = on_demand;
  }
}
