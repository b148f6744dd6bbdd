use packflat_sourcemap::{
  lines_count, sourcemap_comment, EditedSource, MapOptions, SourceEdits, SourceJoiner, SourceMapBuilder,
};
use packflat_utils::concat_string;

use super::{GenerateStage, GenerateStageOutput};
use crate::runtime::{umd_prelude, RuntimeHelpers, UMD_POSTLUDE};

impl GenerateStage<'_> {
  pub(super) fn render_bundle(&self, modules: Vec<EditedSource>) -> anyhow::Result<GenerateStageOutput> {
    let (intro, outro) = self.wrapper_lines();

    let mut joiner = SourceJoiner::default();
    if !intro.is_empty() {
      joiner.append_source(self.wrapper_source(intro.join("\n"), "_prelude")?);
    }
    for module in modules {
      joiner.append_source(module);
    }
    if !outro.is_empty() {
      joiner.append_source(self.wrapper_source(outro.join("\n"), "_postlude")?);
    }

    let (mut code, map) = joiner.join();
    let map = match map {
      Some(map) => Some(map),
      None if self.options.debug => Some(SourceMapBuilder::new(None).into_sourcemap()),
      None => None,
    };
    if let Some(map) = &map {
      code.push('\n');
      code.push_str(&sourcemap_comment(map)?);
    }
    code.push('\n');

    Ok(GenerateStageOutput { code, map })
  }

  /// The lines before and after the module bodies.
  fn wrapper_lines(&self) -> (Vec<String>, Vec<String>) {
    let link_output = self.link_output;
    let options = self.options;
    let standalone = options.standalone.as_deref();
    let exposed = self.helpers.exposed_require.as_str();

    let mut outro = vec![];
    for &idx in &link_output.sorted_modules {
      let (record, state) = (&link_output.module_table.modules[idx], &link_output.states[idx]);
      if record.entry && state.on_demand {
        outro.push(concat_string!(state.exports_name, "();"));
      }
    }

    let mut exposes = false;
    for &idx in &link_output.sorted_modules {
      let (record, state) = (&link_output.module_table.modules[idx], &link_output.states[idx]);
      let name = state.exports_name.as_str();
      match (&record.expose, standalone) {
        (Some(_), None) => {
          exposes = true;
          let key = record.id.to_js_literal();
          if state.on_demand {
            outro.push(concat_string!(
              "Object.defineProperty(",
              exposed,
              ".m, ",
              key,
              ", { get: function() { return ",
              name,
              "({}); }});"
            ));
          } else {
            outro.push(concat_string!(exposed, ".m[", key, "] = ", name, ";"));
          }
        }
        (_, Some(_)) => {
          let is_standalone_module = options.standalone_module.as_ref() == Some(&record.id);
          if (record.entry && state.has_exports()) || is_standalone_module {
            outro.push(concat_string!("return ", name, ";"));
          }
        }
        (None, None) => {}
      }
    }

    let mut intro = vec![];
    if let Some(name) = standalone {
      intro.push(umd_prelude(name));
      outro.push(UMD_POSTLUDE.to_string());
    } else if exposes {
      intro.push("require = (function (require) {".to_string());
      intro.push(concat_string!("var ", exposed, " = ", RuntimeHelpers::exposed_require_code(), ";"));
      intro.push(concat_string!(exposed, ".m = {};"));
      intro.push(concat_string!(exposed, ".r = require;"));
      outro.push(concat_string!("return ", exposed, ";"));
      outro.push("}(typeof require === 'function' ? require : void 0));".to_string());
    } else if options.iife {
      intro.push("(function(){".to_string());
      outro.push("}());".to_string());
    }

    if link_output.states.iter().any(|state| state.on_demand) {
      intro.push(self.helpers.create_module_factory_definition());
    }

    (intro, outro)
  }

  /// Wrapper text, mapped to itself under `name` when building a debug bundle.
  fn wrapper_source(&self, text: String, name: &str) -> anyhow::Result<EditedSource> {
    if !self.options.debug {
      return Ok(EditedSource { lines_count: lines_count(&text), code: text, map: None });
    }
    SourceEdits::default().apply(&text, Some(MapOptions { source_name: name, include_content: true }))
  }
}
