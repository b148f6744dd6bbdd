use packflat_utils::indexmap::FxIndexMap;
use serde::{de::Error as _, Deserialize, Deserializer};

use crate::ModuleId;

/// `require()` specifier to resolved module id. `None` marks a specifier the walker left unresolved.
pub type ModuleDeps = FxIndexMap<String, Option<ModuleId>>;

/// One CommonJS module as produced by the dependency walker.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
  pub id: ModuleId,
  /// Origin path, used for naming and diagnostics.
  #[serde(default)]
  pub file: Option<String>,
  pub source: String,
  #[serde(default, deserialize_with = "deserialize_deps")]
  pub deps: ModuleDeps,
  #[serde(default)]
  pub entry: bool,
  #[serde(default)]
  pub expose: Option<String>,
  #[serde(default)]
  pub order: Option<f64>,
  /// Name of the file in source maps.
  #[serde(default)]
  pub source_file: Option<String>,
  #[serde(default)]
  pub nomap: bool,
}

impl ModuleRecord {
  pub fn new(id: impl Into<ModuleId>, source: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      file: None,
      source: source.into(),
      deps: ModuleDeps::default(),
      entry: false,
      expose: None,
      order: None,
      source_file: None,
      nomap: false,
    }
  }

  /// Label used in diagnostics: `id (file)`.
  pub fn debug_label(&self) -> String {
    match &self.file {
      Some(file) => format!("{} ({file})", self.id),
      None => self.id.to_string(),
    }
  }
}

// Walkers write `false` for specifiers they deliberately skip.
fn deserialize_deps<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModuleDeps, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum RawDep {
    Resolved(ModuleId),
    Unresolved(Option<bool>),
  }

  let raw = FxIndexMap::<String, RawDep>::deserialize(deserializer)?;
  raw
    .into_iter()
    .map(|(specifier, dep)| match dep {
      RawDep::Resolved(id) => Ok((specifier, Some(id))),
      RawDep::Unresolved(None | Some(false)) => Ok((specifier, None)),
      RawDep::Unresolved(Some(true)) => Err(D::Error::custom(format!(
        "dependency `{specifier}` must be a module id, `null` or `false`"
      ))),
    })
    .collect()
}

#[test]
fn test_deserialize_record() {
  let record: ModuleRecord = serde_json::from_str(
    r#"{
      "id": 1,
      "file": "/src/index.js",
      "source": "require('./a')",
      "deps": { "./a": 2, "fs": false, "./b": null, "./c": "c" },
      "entry": true,
      "sourceFile": "src/index.js"
    }"#,
  )
  .expect("valid record");
  assert_eq!(record.id, ModuleId::Int(1));
  assert!(record.entry);
  assert_eq!(record.source_file.as_deref(), Some("src/index.js"));
  assert_eq!(
    record.deps.into_iter().collect::<Vec<_>>(),
    vec![
      ("./a".to_string(), Some(ModuleId::Int(2))),
      ("fs".to_string(), None),
      ("./b".to_string(), None),
      ("./c".to_string(), Some(ModuleId::from("c"))),
    ]
  );
  assert!(!record.nomap);
}

#[test]
fn test_missing_source_is_an_error() {
  let error = serde_json::from_str::<ModuleRecord>(r#"{ "id": 1 }"#).unwrap_err();
  assert!(error.to_string().contains("missing field `source`"));
}

#[test]
fn test_true_is_not_a_dependency() {
  let error =
    serde_json::from_str::<ModuleRecord>(r#"{ "id": 1, "source": "", "deps": { "./a": true } }"#).unwrap_err();
  assert!(error.to_string().contains("dependency `./a` must be a module id"));
}
