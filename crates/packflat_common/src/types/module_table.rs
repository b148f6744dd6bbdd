use anyhow::anyhow;
use oxc_index::IndexVec;
use packflat_error::BuildResult;
use rustc_hash::FxHashMap;

use crate::{ModuleId, ModuleIdx, ModuleRecord};

pub type IndexModules = IndexVec<ModuleIdx, ModuleRecord>;

/// Where a `require()` specifier of a module leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepTarget {
  Internal(ModuleIdx),
  /// Not part of the bundle, left for the runtime `require` to resolve.
  External(ModuleId),
}

/// The closed set of modules of one build.
#[derive(Debug, Default)]
pub struct ModuleTable {
  pub modules: IndexModules,
  by_id: FxHashMap<ModuleId, ModuleIdx>,
}

impl ModuleTable {
  pub fn new(records: Vec<ModuleRecord>) -> BuildResult<Self> {
    let mut table = Self::default();
    let mut errors = vec![];
    for record in records {
      if table.by_id.contains_key(&record.id) {
        errors.push(anyhow!("Duplicate module id {}", record.id));
        continue;
      }
      table.by_id.insert(record.id.clone(), table.modules.next_idx());
      table.modules.push(record);
    }
    if let Err(mut dedupe_errors) = table.restore_deduplicated_sources() {
      errors.append(&mut dedupe_errors);
    }
    if errors.is_empty() { Ok(table) } else { Err(errors.into()) }
  }

  pub fn len(&self) -> usize {
    self.modules.len()
  }

  pub fn is_empty(&self) -> bool {
    self.modules.is_empty()
  }

  pub fn idx_of(&self, id: &ModuleId) -> Option<ModuleIdx> {
    self.by_id.get(id).copied()
  }

  /// Specifiers the walker did not resolve, or resolved outside of the bundle, are external.
  pub fn resolve_dep(&self, importer: ModuleIdx, specifier: &str) -> DepTarget {
    match self.modules[importer].deps.get(specifier) {
      Some(Some(id)) => match self.idx_of(id) {
        Some(idx) => DepTarget::Internal(idx),
        None => DepTarget::External(id.clone()),
      },
      _ => DepTarget::External(ModuleId::Str(specifier.into())),
    }
  }

  /// Dependencies of `importer` that are part of the bundle, in declaration order.
  pub fn internal_deps(&self, importer: ModuleIdx) -> impl Iterator<Item = ModuleIdx> + '_ {
    self.modules[importer].deps.values().filter_map(|id| id.as_ref().and_then(|id| self.idx_of(id)))
  }

  // Deduplicating walkers replace the body of a module that is identical to another one with
  // `arguments[4][<id>]...`, a reference into the browser-pack runtime, which a flat bundle lacks.
  fn restore_deduplicated_sources(&mut self) -> Result<(), Vec<anyhow::Error>> {
    let mut errors = vec![];
    let replacements = self
      .modules
      .iter_enumerated()
      .filter_map(|(idx, record)| deduplicated_target(&record.source).map(|target| (idx, target)))
      .map(|(idx, target)| {
        let original = self.modules.iter().find(|other| other.id.to_string() == target);
        match original {
          Some(original) => Ok((idx, original.source.clone())),
          None => Err(anyhow!(
            "Module {} is a duplicate of module {target}, which is not part of the bundle",
            self.modules[idx].debug_label()
          )),
        }
      })
      .collect::<Vec<_>>();

    for replacement in replacements {
      match replacement {
        Ok((idx, source)) => self.modules[idx].source = source,
        Err(err) => errors.push(err),
      }
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }
}

fn deduplicated_target(source: &str) -> Option<&str> {
  let rest = source.strip_prefix("arguments[4][")?;
  let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
  (digits > 0 && rest[digits..].starts_with(']')).then_some(&rest[..digits])
}

#[cfg(test)]
mod tests {
  use super::*;

  fn record(id: u64, source: &str) -> ModuleRecord {
    ModuleRecord::new(id, source)
  }

  #[test]
  fn rejects_duplicate_ids() {
    let error = ModuleTable::new(vec![record(1, "a"), record(1, "b")]).unwrap_err();
    assert_eq!(error.len(), 1);
    assert_eq!(error[0].to_string(), "Duplicate module id 1");
  }

  #[test]
  fn restores_deduplicated_sources() {
    let table = ModuleTable::new(vec![
      record(1, "module.exports = 1"),
      record(2, "arguments[4][1][0].apply(exports,arguments)"),
    ])
    .unwrap();
    assert_eq!(table.modules[ModuleIdx::from_usize(1)].source, "module.exports = 1");

    let error = ModuleTable::new(vec![record(2, "arguments[4][9][0].apply(exports,arguments)")]).unwrap_err();
    assert!(error[0].to_string().contains("duplicate of module 9"));
  }

  #[test]
  fn resolves_deps() {
    let mut entry = record(1, "");
    entry.deps.insert("./a".into(), Some(ModuleId::Int(2)));
    entry.deps.insert("./missing".into(), Some(ModuleId::Int(9)));
    entry.deps.insert("fs".into(), None);
    let table = ModuleTable::new(vec![entry, record(2, "")]).unwrap();
    let entry = ModuleIdx::from_usize(0);

    assert_eq!(table.resolve_dep(entry, "./a"), DepTarget::Internal(ModuleIdx::from_usize(1)));
    assert_eq!(table.resolve_dep(entry, "./missing"), DepTarget::External(ModuleId::Int(9)));
    assert_eq!(table.resolve_dep(entry, "fs"), DepTarget::External(ModuleId::from("fs")));
    assert_eq!(table.resolve_dep(entry, "./b"), DepTarget::External(ModuleId::from("./b")));
    assert_eq!(table.internal_deps(entry).collect::<Vec<_>>(), vec![ModuleIdx::from_usize(1)]);
  }

  #[test]
  fn deduplicated_marker() {
    assert_eq!(deduplicated_target("arguments[4][12][0]"), Some("12"));
    assert_eq!(deduplicated_target("arguments[4][][0]"), None);
    assert_eq!(deduplicated_target("var a = arguments[4][1]"), None);
  }
}
