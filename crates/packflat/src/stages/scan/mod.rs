use std::path::Path;

use anyhow::Context;
use oxc_index::IndexVec;
use packflat_common::{DepTarget, ModuleId, ModuleIdx, ModuleTable};
use packflat_ecmascript::{EcmaCompiler, ModuleAnalysis, ReferenceParent, ScopeTree};
use packflat_error::BuildResult;
use packflat_utils::{concat_string, ecmascript::to_identifier, path_ext::PathExt};
use rustc_hash::FxHashMap;

use crate::types::{
  rewrite_state::{CommonJsUsage, ResolvedRequire, RewriteState},
  IndexModuleAnalyses, IndexRewriteStates,
};

#[derive(Debug)]
pub struct ScanStageOutput {
  pub module_table: ModuleTable,
  pub analyses: IndexModuleAnalyses,
  pub states: IndexRewriteStates,
}

pub struct ScanStage {
  module_table: ModuleTable,
}

impl ScanStage {
  pub fn new(module_table: ModuleTable) -> Self {
    Self { module_table }
  }

  pub fn scan(self) -> BuildResult<ScanStageOutput> {
    let Self { module_table } = self;
    let mut analyses = IndexVec::with_capacity(module_table.len());
    let mut states = IndexVec::with_capacity(module_table.len());
    let mut errors = vec![];

    for (idx, record) in module_table.modules.iter_enumerated() {
      let analysis = EcmaCompiler::analyze(&record.source)
        .with_context(|| concat_string!("module ", record.debug_label()));
      match analysis {
        Ok(mut analysis) => {
          states.push(scan_module(&module_table, idx, &mut analysis));
          analyses.push(analysis);
        }
        Err(err) => errors.push(err),
      }
    }

    if !errors.is_empty() {
      Err(errors)?;
    }

    tracing::debug!(modules = module_table.len(), "scanned modules");
    Ok(ScanStageOutput { module_table, analyses, states })
  }
}

fn scan_module(table: &ModuleTable, idx: ModuleIdx, analysis: &mut ModuleAnalysis) -> RewriteState {
  let record = &table.modules[idx];
  let scopes = &analysis.scopes;
  let usage = commonjs_usage(scopes);

  let module_name = Path::new(record.file.as_deref().unwrap_or_default()).representative_file_name();
  let mut exports_name = exports_identifier(&module_name, &record.id);
  let mut is_simple_export = false;

  if usage.module_exports.len() == 1 && usage.exports.is_empty() && usage.module.is_empty() {
    let reference = scopes.reference(usage.module_exports[0]);
    if let ReferenceParent::Member(member) = &reference.parent {
      if let Some(assignment) = member.assignment.as_ref().filter(|assignment| assignment.is_statement) {
        is_simple_export = scopes.var_scope(reference.scope) == ScopeTree::PROGRAM_SCOPE_ID;
        if let Some(value_name) = &assignment.value_name {
          exports_name = exports_identifier(value_name, &record.id);
        }
      }
    }
  }

  let require_calls = std::mem::take(&mut analysis.require_calls);
  let mut dependency_order = FxHashMap::default();
  let requires = require_calls
    .into_iter()
    .map(|call| {
      let target = table.resolve_dep(idx, &call.specifier);
      if let DepTarget::Internal(dep) = target {
        dependency_order.entry(dep).or_insert(call.span.end);
      }
      ResolvedRequire { call, target }
    })
    .collect::<Vec<_>>();

  tracing::trace!(
    module = %record.id,
    exports_name,
    is_simple_export,
    requires = requires.len(),
    "scanned module"
  );

  RewriteState {
    exports_name,
    is_simple_export,
    usage,
    on_demand: false,
    requires,
    dependency_order,
  }
}

fn commonjs_usage(scopes: &ScopeTree) -> CommonJsUsage {
  let mut usage = CommonJsUsage::default();
  let references = |name: &str| {
    scopes.wrapper_binding(name).map(|binding| scopes.binding(binding).references.clone()).unwrap_or_default()
  };
  for reference_id in references("module") {
    if scopes.reference(reference_id).member_property() == Some("exports") {
      usage.module_exports.push(reference_id);
    } else {
      usage.module.push(reference_id);
    }
  }
  usage.exports = references("exports");
  usage.require = references("require");
  usage
}

/// `_$<name>_<id>`, made a valid identifier.
fn exports_identifier(name: &str, id: &ModuleId) -> String {
  let id = id.to_string();
  to_identifier(&concat_string!("_$", name, "_", id))
    .or_else(|| to_identifier(&concat_string!("_$module_", id)))
    .unwrap_or_else(|| "_$module".to_string())
}
