use std::{
  fs,
  io::{self, Read},
  path::Path,
};

use anyhow::Context;
use packflat::ModuleRecord;

pub fn read_records(input: Option<&Path>) -> anyhow::Result<Vec<ModuleRecord>> {
  let text = match input {
    Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?,
    None => {
      let mut text = String::new();
      io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
      text
    }
  };
  parse_records(&text)
}

/// Accepts a JSON array of records, or one record per line.
fn parse_records(text: &str) -> anyhow::Result<Vec<ModuleRecord>> {
  if text.trim_start().starts_with('[') {
    return serde_json::from_str(text).context("Invalid module records");
  }
  serde_json::Deserializer::from_str(text)
    .into_iter::<ModuleRecord>()
    .enumerate()
    .map(|(index, record)| record.with_context(|| format!("Invalid module record #{}", index + 1)))
    .collect()
}
