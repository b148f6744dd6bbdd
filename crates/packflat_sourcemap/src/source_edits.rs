use std::cmp::Reverse;

use anyhow::{bail, ensure};
use memchr::memchr_iter;
use sourcemap::{SourceMap, SourceMapBuilder};

use crate::line_index::{Cursor, LineIndex};

#[derive(Debug)]
struct Edit {
  start: u32,
  end: u32,
  content: String,
}

/// An ordered set of span replacements over one source text.
///
/// Edits are only recorded until [`SourceEdits::apply`], which validates them and rebuilds the
/// text in a single pass. Replacing the exact same span twice keeps the later replacement, and an
/// edit whose span contains other edits supersedes them. Spans that partially overlap are rejected.
#[derive(Debug, Default)]
pub struct SourceEdits {
  edits: Vec<Edit>,
  intro: String,
  outro: String,
}

#[derive(Debug, Clone, Copy)]
pub struct MapOptions<'a> {
  pub source_name: &'a str,
  pub include_content: bool,
}

#[derive(Debug)]
pub struct EditedSource {
  pub code: String,
  pub map: Option<SourceMap>,
  /// Index of the last line of `code`.
  pub lines_count: u32,
}

impl SourceEdits {
  pub fn update(&mut self, start: u32, end: u32, content: impl Into<String>) {
    self.edits.push(Edit { start, end, content: content.into() });
  }

  pub fn remove(&mut self, start: u32, end: u32) {
    self.update(start, end, String::new());
  }

  /// Inserts `content` before everything prepended so far.
  pub fn prepend(&mut self, content: &str) {
    self.intro.insert_str(0, content);
  }

  pub fn append(&mut self, content: &str) {
    self.outro.push_str(content);
  }

  fn resolve(edits: Vec<Edit>, source: &str) -> anyhow::Result<Vec<Edit>> {
    let mut edits = edits;
    edits.sort_by_key(|edit| (edit.start, Reverse(edit.end)));

    let mut resolved: Vec<Edit> = Vec::with_capacity(edits.len());
    for edit in edits {
      ensure!(
        edit.start <= edit.end
          && source.is_char_boundary(edit.start as usize)
          && source.is_char_boundary(edit.end as usize),
        "Edit {}..{} is outside of the source text ({} bytes)",
        edit.start,
        edit.end,
        source.len()
      );
      if let Some(last) = resolved.last_mut() {
        if last.start == edit.start && last.end == edit.end {
          *last = edit;
          continue;
        }
        if edit.start < last.end {
          if edit.end <= last.end {
            continue;
          }
          bail!(
            "Edit {}..{} partially overlaps edit {}..{}",
            edit.start,
            edit.end,
            last.start,
            last.end
          );
        }
      }
      resolved.push(edit);
    }
    Ok(resolved)
  }

  pub fn apply(self, source: &str, map: Option<MapOptions<'_>>) -> anyhow::Result<EditedSource> {
    let Self { edits, intro, outro } = self;
    let edits = Self::resolve(edits, source)?;

    let mut writer = Writer::new(source, map);
    writer.push_generated(&intro);
    let mut pos = 0;
    for edit in &edits {
      writer.push_original(pos, edit.start);
      writer.push_replacement(edit.start, &edit.content);
      pos = edit.end;
    }
    writer.push_original(pos, u32::try_from(source.len())?);
    writer.push_generated(&outro);
    Ok(writer.finish())
  }
}

struct Writer<'a> {
  source: &'a str,
  code: String,
  cursor: Cursor,
  mapping: Option<(SourceMapBuilder, u32, LineIndex<'a>)>,
}

impl<'a> Writer<'a> {
  fn new(source: &'a str, map: Option<MapOptions<'_>>) -> Self {
    let mapping = map.map(|options| {
      let mut builder = SourceMapBuilder::new(None);
      let src_id = builder.add_source(options.source_name);
      if options.include_content {
        builder.set_source_contents(src_id, Some(source));
      }
      (builder, src_id, LineIndex::new(source))
    });
    Self { source, code: String::with_capacity(source.len()), cursor: Cursor::default(), mapping }
  }

  fn add_mapping(&mut self, original_offset: u32) {
    if let Some((builder, src_id, index)) = &mut self.mapping {
      let (src_line, src_col) = index.position(original_offset);
      builder.add_raw(self.cursor.line, self.cursor.col, src_line, src_col, Some(*src_id), None, false);
    }
  }

  fn push_generated(&mut self, text: &str) {
    self.code.push_str(text);
    self.cursor.advance(text);
  }

  fn push_replacement(&mut self, original_offset: u32, text: &str) {
    if !text.is_empty() {
      self.add_mapping(original_offset);
    }
    self.push_generated(text);
  }

  /// Copies `source[start..end]` through, mapping the start of the chunk and every line in it.
  fn push_original(&mut self, start: u32, end: u32) {
    if start >= end {
      return;
    }
    let chunk = &self.source[start as usize..end as usize];
    self.add_mapping(start);
    let mut line_start = 0;
    for newline in memchr_iter(b'\n', chunk.as_bytes()) {
      self.push_generated(&chunk[line_start..=newline]);
      line_start = newline + 1;
      if line_start < chunk.len() {
        self.add_mapping(start + u32::try_from(line_start).unwrap_or(u32::MAX));
      }
    }
    self.push_generated(&chunk[line_start..]);
  }

  fn finish(self) -> EditedSource {
    let map = self.mapping.map(|(builder, _, _)| builder.into_sourcemap());
    EditedSource { code: self.code, map, lines_count: self.cursor.line }
  }
}
