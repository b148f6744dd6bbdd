use std::cmp::Ordering;

use itertools::Itertools;
use packflat_common::{ModuleIdx, ModuleRecord, ModuleTable};
use rustc_hash::{FxHashMap, FxHashSet};

use super::LinkStage;

#[derive(Debug)]
enum Status {
  ToBeExecuted(ModuleIdx),
  WaitForExit(ModuleIdx),
}

/// Entries first, then modules with an explicit `order` by that order, then by id.
fn compare_module_sort_order(a: &ModuleRecord, b: &ModuleRecord) -> Ordering {
  b.entry
    .cmp(&a.entry)
    .then_with(|| match (a.order, b.order) {
      (Some(a), Some(b)) => a.total_cmp(&b),
      (Some(_), None) => Ordering::Less,
      (None, Some(_)) => Ordering::Greater,
      (None, None) => Ordering::Equal,
    })
    .then_with(|| a.id.cmp(&b.id))
}

/// Orders modules so each one comes after the dependencies it requires, visiting dependencies in
/// the order the requirer first calls them.
///
/// `dependency_order(importer, dep)` is the offset of the first call in `importer` reaching `dep`.
pub fn sort_modules(
  table: &ModuleTable,
  dependency_order: impl Fn(ModuleIdx, ModuleIdx) -> Option<u32>,
) -> Vec<ModuleIdx> {
  let ranked = table
    .modules
    .indices()
    .sorted_by(|a, b| compare_module_sort_order(&table.modules[*a], &table.modules[*b]))
    .collect::<Vec<_>>();
  let rank = ranked.iter().enumerate().map(|(rank, idx)| (*idx, rank)).collect::<FxHashMap<_, _>>();

  let mut execution_stack = ranked.iter().rev().map(|idx| Status::ToBeExecuted(*idx)).collect::<Vec<_>>();
  let mut executed_ids = FxHashSet::default();
  let mut sorted_modules = Vec::with_capacity(table.len());

  while let Some(status) = execution_stack.pop() {
    match status {
      Status::ToBeExecuted(id) => {
        if !executed_ids.insert(id) {
          continue;
        }
        execution_stack.push(Status::WaitForExit(id));
        let deps = table
          .internal_deps(id)
          .sorted_by_key(|dep| {
            let order = dependency_order(id, *dep);
            (order.is_none(), order, rank.get(dep).copied())
          })
          .rev();
        execution_stack.extend(deps.map(Status::ToBeExecuted));
      }
      Status::WaitForExit(id) => sorted_modules.push(id),
    }
  }

  sorted_modules
}

impl LinkStage {
  pub(super) fn sort_modules(&mut self) {
    let states = &self.states;
    self.sorted_modules =
      sort_modules(&self.module_table, |importer, dep| states[importer].dependency_order.get(&dep).copied());
  }
}

#[cfg(test)]
mod tests {
  use packflat_common::ModuleId;

  use super::*;

  fn record(id: u64, deps: &[u64]) -> ModuleRecord {
    let mut record = ModuleRecord::new(id, "");
    for dep in deps {
      record.deps.insert(format!("./{dep}"), Some(ModuleId::Int(*dep)));
    }
    record
  }

  fn sorted_ids(table: &ModuleTable, sorted: &[ModuleIdx]) -> Vec<String> {
    sorted.iter().map(|idx| table.modules[*idx].id.to_string()).collect()
  }

  #[test]
  fn dependencies_come_first() {
    let mut entry = record(1, &[3, 2]);
    entry.entry = true;
    let table = ModuleTable::new(vec![record(3, &[]), record(2, &[3]), entry]).unwrap();
    let sorted = sort_modules(&table, |_, _| None);
    assert_eq!(sorted_ids(&table, &sorted), ["3", "2", "1"]);
  }

  #[test]
  fn dependencies_follow_call_order() {
    let mut entry = record(1, &[2, 3]);
    entry.entry = true;
    let table = ModuleTable::new(vec![entry, record(2, &[]), record(3, &[])]).unwrap();
    let (two, three) = (ModuleIdx::from_usize(1), ModuleIdx::from_usize(2));
    let sorted = sort_modules(&table, |_, dep| if dep == three { Some(10) } else if dep == two { Some(20) } else { None });
    assert_eq!(sorted_ids(&table, &sorted), ["3", "2", "1"]);

    let sorted = sort_modules(&table, |_, dep| (dep == two).then_some(20));
    assert_eq!(sorted_ids(&table, &sorted), ["2", "3", "1"]);
  }

  #[test]
  fn entries_and_order_rank_roots() {
    let mut first = record(5, &[]);
    first.entry = true;
    first.order = Some(1.0);
    let mut second = record(4, &[]);
    second.entry = true;
    second.order = Some(0.0);
    let mut ordered = record(9, &[]);
    ordered.order = Some(3.0);
    let table =
      ModuleTable::new(vec![record(1, &[]), first, ordered, second, ModuleRecord::new("b", "")]).unwrap();
    let sorted = sort_modules(&table, |_, _| None);
    assert_eq!(sorted_ids(&table, &sorted), ["4", "5", "9", "1", "b"]);
  }

  #[test]
  fn cycles_terminate() {
    let mut entry = record(1, &[2]);
    entry.entry = true;
    let table = ModuleTable::new(vec![entry, record(2, &[1])]).unwrap();
    let sorted = sort_modules(&table, |_, _| None);
    assert_eq!(sorted_ids(&table, &sorted), ["2", "1"]);
  }
}
