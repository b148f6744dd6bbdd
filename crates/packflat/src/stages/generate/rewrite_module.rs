use std::path::Path;

use oxc_span::Span;
use packflat_common::{DepTarget, ModuleIdx, ModuleRecord, NormalizedBundlerOptions};
use packflat_ecmascript::{BindingId, Reference, ReferenceParent, RequireCall, RequireDeclarator, ScopeTree};
use packflat_sourcemap::{compose_sourcemaps, decode_inline_sourcemap, EditedSource, MapOptions, SourceEdits};
use packflat_utils::{concat_string, ecmascript::to_identifier, path_ext::PathExt};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::GenerateStage;
use crate::{
  runtime::RuntimeHelpers,
  types::{rewrite_state::RewriteState, IndexRewriteStates},
};

/// Turns one CommonJS module body into code that runs at the top level of the bundle.
pub struct ModuleRewriter<'a> {
  record: &'a ModuleRecord,
  scopes: &'a ScopeTree,
  sourcemap_comment: Option<Span>,
  state: &'a RewriteState,
  states: &'a IndexRewriteStates,
  renamed_bindings: &'a [BindingId],
  helpers: &'a RuntimeHelpers,
  options: &'a NormalizedBundlerOptions,
  edits: SourceEdits,
  /// Declarators still present in each declaration, keyed by the declaration's span.
  remaining_declarators: FxHashMap<Span, SmallVec<[Span; 2]>>,
}

impl<'a> ModuleRewriter<'a> {
  pub fn new(stage: &'a GenerateStage<'a>, idx: ModuleIdx) -> Self {
    let link_output = stage.link_output;
    Self {
      record: &link_output.module_table.modules[idx],
      scopes: &link_output.analyses[idx].scopes,
      sourcemap_comment: link_output.analyses[idx].sourcemap_comment,
      state: &link_output.states[idx],
      states: &link_output.states,
      renamed_bindings: &link_output.renamed_bindings[idx],
      helpers: &stage.helpers,
      options: stage.options,
      edits: SourceEdits::default(),
      remaining_declarators: FxHashMap::default(),
    }
  }

  pub fn rewrite(mut self) -> anyhow::Result<EditedSource> {
    let state = self.state;
    let exports_name = state.exports_name.as_str();
    // Any other use of `module` keeps a `{ exports }` object around under the exports name.
    let has_module_object = !state.usage.module.is_empty();
    let exports_target =
      if has_module_object { concat_string!(exports_name, ".exports") } else { exports_name.to_string() };

    self.rewrite_typeof_require();
    if !state.on_demand {
      self.rewrite_exports(&exports_target);
      if has_module_object {
        self.rewrite_module_references(exports_name);
      }
      self.rename_colliding_bindings();
    }
    self.rewrite_require_calls();

    if state.on_demand {
      self.edits.prepend(&concat_string!(
        "var ",
        exports_name,
        " = ",
        self.helpers.create_module_factory,
        "(function (module, exports) {\n"
      ));
      self.edits.append("\n});");
    } else if has_module_object {
      self.edits.prepend(&concat_string!("var ", exports_name, " = { exports: {} };\n"));
      self.edits.append(&concat_string!("\n", exports_name, " = ", exports_target, ";"));
    } else if !state.is_simple_export {
      self.edits.prepend(&concat_string!("var ", exports_name, " = {};\n"));
    }

    self.finish()
  }

  fn rewrite_typeof_require(&mut self) {
    let (scopes, state) = (self.scopes, self.state);
    for id in &state.usage.require {
      if let ReferenceParent::Typeof(span) = scopes.reference(*id).parent {
        self.edits.update(span.start, span.end, "\"function\"");
      }
    }
  }

  fn rewrite_exports(&mut self, exports_target: &str) {
    let (scopes, state) = (self.scopes, self.state);
    for id in &state.usage.module_exports {
      let Some(member) = scopes.reference(*id).member() else { continue };
      if state.is_simple_export {
        self.edits.update(member.span.start, member.span.end, concat_string!("var ", exports_target));
      } else {
        self.edits.update(member.span.start, member.span.end, exports_target);
      }
    }
    for id in &state.usage.exports {
      self.rename_occurrence(scopes.reference(*id), exports_target);
    }
  }

  fn rewrite_module_references(&mut self, module_name: &str) {
    let (scopes, state) = (self.scopes, self.state);
    for id in &state.usage.module {
      let reference = scopes.reference(*id);
      match &reference.parent {
        ReferenceParent::Typeof(span) => self.edits.update(span.start, span.end, "\"object\""),
        ReferenceParent::Member(member) if member.property.as_deref() == Some("parent") => {
          let parent = if self.record.entry { "null" } else { "({})" };
          self.edits.update(member.span.start, member.span.end, parent);
        }
        _ => self.rename_occurrence(reference, module_name),
      }
    }
  }

  fn rename_colliding_bindings(&mut self) {
    let scopes = self.scopes;
    let id = self.record.id.to_string();
    for &binding in self.renamed_bindings {
      let name = &scopes.binding(binding).name;
      let candidate = concat_string!("__", name, "_", id);
      let renamed = to_identifier(&candidate).unwrap_or(candidate);
      for reference in scopes.references_of(binding) {
        self.rename_occurrence(reference, &renamed);
      }
    }
  }

  fn rewrite_require_calls(&mut self) {
    let (state, states) = (self.state, self.states);
    for require in &state.requires {
      let span = require.call.span;
      match &require.target {
        DepTarget::External(id) => {
          self.edits.update(span.start, span.end, concat_string!("require(", id.to_js_literal(), ")"));
        }
        DepTarget::Internal(target) => {
          let target = &states[*target];
          if target.on_demand {
            self.edits.update(span.start, span.end, concat_string!(target.exports_name, "({})"));
          } else {
            self.rename_import(&require.call, &target.exports_name);
          }
        }
      }
    }
  }

  /// Points the code that used a `require` call's result straight at the dependency's exports.
  fn rename_import(&mut self, call: &RequireCall, exports_name: &str) {
    let Some(declarator) = &call.declarator else {
      self.edits.update(call.span.start, call.span.end, exports_name);
      return;
    };
    let scopes = self.scopes;
    for reference in scopes.references_of(declarator.binding) {
      self.rename_occurrence(reference, exports_name);
    }
    self.remove_declarator(declarator);
  }

  fn remove_declarator(&mut self, declarator: &RequireDeclarator) {
    let declaration = declarator.declaration_span;
    let remaining = self
      .remaining_declarators
      .entry(declaration)
      .or_insert_with(|| declarator.declarators.clone());
    let span = declarator.span();
    let Some(index) = remaining.iter().position(|remaining| *remaining == span) else { return };

    if remaining.len() == 1 {
      let removed = declaration.source_text(&self.record.source).replace("*/", "*\\/");
      self.edits.update(declaration.start, declaration.end, concat_string!("/* removed: ", removed, " */;"));
    } else if index == remaining.len() - 1 {
      self.edits.remove(remaining[index - 1].end, span.end);
    } else {
      self.edits.remove(span.start, remaining[index + 1].start);
    }
    remaining.remove(index);
  }

  /// Replaces one occurrence of a name, expanding shorthand properties so their keys survive.
  fn rename_occurrence(&mut self, reference: &Reference, name: &str) {
    let Span { start, end, .. } = reference.span;
    if reference.is_shorthand() {
      let key = reference.span.source_text(&self.record.source);
      self.edits.update(start, end, concat_string!(key, ": ", name));
    } else {
      self.edits.update(start, end, name);
    }
  }

  fn finish(mut self) -> anyhow::Result<EditedSource> {
    let options = self.options;
    let record = self.record;

    let mut input_map = None;
    if let Some(comment) = self.sourcemap_comment.filter(|_| options.debug) {
      if let Some(map) = decode_inline_sourcemap(comment.source_text(&record.source)) {
        self.edits.remove(comment.start, comment.end);
        input_map = Some(map);
      }
    }

    let source_name = record
      .source_file
      .as_deref()
      .filter(|_| options.debug && !record.nomap)
      .map(|file| Path::new(file).relative_slash(options.basedir.as_deref()));
    let map_options =
      source_name.as_deref().map(|source_name| MapOptions { source_name, include_content: true });

    let mut edited = self.edits.apply(&record.source, map_options)?;
    if let (Some(map), Some(input_map)) = (&edited.map, &input_map) {
      edited.map = Some(compose_sourcemaps(map, input_map));
    }
    Ok(edited)
  }
}
