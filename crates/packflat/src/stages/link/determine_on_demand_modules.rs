use packflat_common::{DepTarget, ModuleIdx};
use rustc_hash::FxHashSet;

use super::LinkStage;
use crate::types::IndexRewriteStates;

/// Modules some requirer reaches through an unpredictable `require` call before it reached them
/// predictably. A later unpredictable call doesn't undo an earlier predictable one.
pub fn unpredictably_required_modules(states: &IndexRewriteStates) -> FxHashSet<ModuleIdx> {
  let mut on_demand = FxHashSet::default();
  for state in states.iter() {
    let mut evaluated_in_order = FxHashSet::default();
    for require in &state.requires {
      let DepTarget::Internal(target) = require.target else {
        continue;
      };
      if !require.call.unpredictable {
        evaluated_in_order.insert(target);
      } else if !evaluated_in_order.contains(&target) {
        on_demand.insert(target);
      }
    }
  }
  on_demand
}

impl LinkStage {
  pub(super) fn determine_on_demand_modules(&mut self) {
    let cyclic = self.detect_cycles();
    let unpredictable = unpredictably_required_modules(&self.states);
    for idx in cyclic.iter().chain(&unpredictable) {
      let state = &mut self.states[*idx];
      if !state.on_demand {
        tracing::trace!(module = %self.module_table.modules[*idx].id, "evaluated on demand");
        state.on_demand = true;
      }
    }
  }
}
