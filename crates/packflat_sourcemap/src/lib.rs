mod inline_sourcemap;
mod line_index;
mod lines_count;
mod source;
mod source_edits;
mod source_joiner;

pub use crate::{
  inline_sourcemap::{compose_sourcemaps, decode_inline_sourcemap, sourcemap_comment},
  line_index::LineIndex,
  lines_count::lines_count,
  source::Source,
  source_edits::{EditedSource, MapOptions, SourceEdits},
  source_joiner::SourceJoiner,
};
pub use sourcemap::{SourceMap, SourceMapBuilder};
