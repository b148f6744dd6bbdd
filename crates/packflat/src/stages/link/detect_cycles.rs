use packflat_common::{ModuleIdx, ModuleTable};
use packflat_utils::indexmap::FxIndexSet;
use rustc_hash::FxHashSet;

use super::LinkStage;

#[derive(Debug, Default)]
pub struct Cycles {
  /// Every module that is part of some cycle, in discovery order.
  pub members: FxIndexSet<ModuleIdx>,
  /// Each cycle found, from the first module revisited back to itself.
  pub paths: Vec<Vec<ModuleIdx>>,
}

struct CycleFinder<'a> {
  table: &'a ModuleTable,
  stack: Vec<ModuleIdx>,
  checked: FxHashSet<ModuleIdx>,
  cycles: Cycles,
}

impl CycleFinder<'_> {
  fn check(&mut self, idx: ModuleIdx) {
    if let Some(position) = self.stack.iter().position(|on_stack| *on_stack == idx) {
      self.checked.insert(idx);
      self.cycles.members.extend(self.stack[position..].iter().copied());
      let mut path = self.stack[position..].to_vec();
      path.push(idx);
      self.cycles.paths.push(path);
      return;
    }
    if self.checked.contains(&idx) {
      return;
    }
    self.stack.push(idx);
    let table = self.table;
    for dep in table.internal_deps(idx) {
      self.check(dep);
    }
    self.stack.pop();
  }
}

/// Walks the dependencies of every module depth-first, with a fresh stack per module.
pub fn find_cycles(table: &ModuleTable) -> Cycles {
  let mut finder =
    CycleFinder { table, stack: vec![], checked: FxHashSet::default(), cycles: Cycles::default() };
  for idx in table.modules.indices() {
    finder.check(idx);
    debug_assert!(finder.stack.is_empty());
  }
  finder.cycles
}

impl LinkStage {
  pub(super) fn detect_cycles(&mut self) -> FxIndexSet<ModuleIdx> {
    let Cycles { members, paths } = find_cycles(&self.module_table);
    for path in paths {
      let ids = path.iter().map(|idx| self.module_table.modules[*idx].id.to_string()).collect::<Vec<_>>();
      self.warnings.push(anyhow::anyhow!("Circular dependency: {}.", ids.join(" -> ")));
    }
    tracing::debug!(modules = members.len(), "detected cyclic modules");
    members
  }
}
