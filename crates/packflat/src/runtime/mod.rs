use packflat_common::IndexModules;
use packflat_utils::{concat_string, ecmascript::to_identifier};

const CREATE_MODULE_FACTORY: &str = include_str!("./create-module-factory.js");
const EXPOSED_REQUIRE: &str = include_str!("./exposed-require.js");

/// Names of the runtime helpers, chosen so they don't appear anywhere in the bundled sources.
#[derive(Debug)]
pub struct RuntimeHelpers {
  pub create_module_factory: String,
  pub exposed_require: String,
}

impl RuntimeHelpers {
  pub fn new(modules: &IndexModules) -> Self {
    Self {
      create_module_factory: unused_name(modules, "createModuleFactory"),
      exposed_require: unused_name(modules, "exposedRequire"),
    }
  }

  /// `var <name> = function createModuleFactory(factory) { ... };`
  pub fn create_module_factory_definition(&self) -> String {
    concat_string!("var ", self.create_module_factory, " = ", CREATE_MODULE_FACTORY.trim_end(), ";")
  }

  pub fn exposed_require_code() -> &'static str {
    EXPOSED_REQUIRE.trim_end()
  }
}

fn unused_name(modules: &IndexModules, base: &str) -> String {
  let in_use = |candidate: &str| modules.iter().any(|module| module.source.contains(candidate));
  if !in_use(base) {
    return base.to_string();
  }
  let mut buffer = itoa::Buffer::new();
  (0u32..)
    .map(|suffix| concat_string!(base, "_", buffer.format(suffix)))
    .find(|candidate| !in_use(candidate))
    .unwrap_or_else(|| base.to_string())
}

/// The start of a UMD wrapper assigning the bundle's return value to `name`.
///
/// A dotted name assigns to nested objects on the global, creating them as needed.
pub fn umd_prelude(name: &str) -> String {
  let mut segments =
    name.split('.').map(|segment| to_identifier(segment).unwrap_or_else(|| "_".to_string())).collect::<Vec<_>>();
  let last = segments.pop().unwrap_or_else(|| "_".to_string());
  let namespace = match segments.as_slice() {
    [] => concat_string!("g.", last, "=f()"),
    [parent] => concat_string!("(g.", parent, "||(g.", parent, "={})).", last, "=f()"),
    parents => {
      let steps = parents
        .iter()
        .map(|parent| concat_string!("g=(g.", parent, "||(g.", parent, "={}));"))
        .collect::<String>();
      concat_string!(steps, "g.", last, "=f()")
    }
  };
  concat_string!(
    "(function(f){if(typeof exports===\"object\"&&typeof module!==\"undefined\"){module.exports=f()}",
    "else if(typeof define===\"function\"&&define.amd){define([],f)}",
    "else{var g;if(typeof window!==\"undefined\"){g=window}else if(typeof global!==\"undefined\"){g=global}",
    "else if(typeof self!==\"undefined\"){g=self}else{g=this}",
    namespace,
    "}})(function(){var define,module,exports;"
  )
}

pub const UMD_POSTLUDE: &str = "});";
