use std::fmt;

use arcstr::ArcStr;
use packflat_utils::ecmascript::json_quote;
use serde::{Deserialize, Serialize};

/// The stable identifier a dependency walker assigned to a module.
///
/// Numeric ids sort before string ids, numerically; string ids sort lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModuleId {
  Int(u64),
  Str(ArcStr),
}

impl ModuleId {
  /// The id as a JavaScript literal, for embedding in generated code.
  pub fn to_js_literal(&self) -> String {
    match self {
      Self::Int(value) => itoa::Buffer::new().format(*value).to_string(),
      Self::Str(value) => json_quote(value),
    }
  }
}

impl fmt::Display for ModuleId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(value) => f.write_str(itoa::Buffer::new().format(*value)),
      Self::Str(value) => f.write_str(value),
    }
  }
}

impl From<u64> for ModuleId {
  fn from(value: u64) -> Self {
    Self::Int(value)
  }
}

impl From<&str> for ModuleId {
  fn from(value: &str) -> Self {
    Self::Str(value.into())
  }
}

#[test]
fn test_module_id() {
  let mut ids: Vec<ModuleId> =
    serde_json::from_str(r#"["b", 10, "a", 2, "./x.js"]"#).expect("valid ids");
  ids.sort();
  let rendered = ids.iter().map(ModuleId::to_string).collect::<Vec<_>>();
  assert_eq!(rendered, ["2", "10", "./x.js", "a", "b"]);
  assert_eq!(ModuleId::from(7).to_js_literal(), "7");
  assert_eq!(ModuleId::from("./a").to_js_literal(), "\"./a\"");
}
