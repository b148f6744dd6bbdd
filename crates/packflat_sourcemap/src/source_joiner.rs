use sourcemap::{SourceMap, SourceMapBuilder};

use crate::source::Source;

/// Joins sources with `\n` and, when any of them carries a map, merges their maps with each
/// one shifted to the line the source starts at.
#[derive(Default)]
pub struct SourceJoiner<'source> {
  inner: Vec<Box<dyn Source + Send + 'source>>,
}

impl<'source> SourceJoiner<'source> {
  pub fn append_source<T: Source + Send + 'source>(&mut self, source: T) {
    self.inner.push(Box::new(source));
  }

  pub fn join(&self) -> (String, Option<SourceMap>) {
    let sources_len = self.inner.len();
    let sources = || self.inner.iter();

    let size_hint = sources().map(|source| source.content().len()).sum::<usize>()
      + sources_len.saturating_sub(1);
    let mut ret_source = String::with_capacity(size_hint);
    let mut builder = sources().any(|source| source.sourcemap().is_some()).then(|| SourceMapBuilder::new(None));

    let mut line_offset = 0;
    for (index, source) in sources().enumerate() {
      ret_source.push_str(source.content());
      if index < sources_len - 1 {
        ret_source.push('\n');
      }
      if let (Some(builder), Some(map)) = (builder.as_mut(), source.sourcemap()) {
        add_shifted(builder, map, line_offset);
      }
      line_offset += source.lines_count() + 1;
    }

    (ret_source, builder.map(SourceMapBuilder::into_sourcemap))
  }
}

fn add_shifted(builder: &mut SourceMapBuilder, map: &SourceMap, line_offset: u32) {
  for (idx, name) in map.sources().enumerate() {
    let src_id = builder.add_source(name);
    let contents = u32::try_from(idx).ok().and_then(|idx| map.get_source_contents(idx));
    if contents.is_some() {
      builder.set_source_contents(src_id, contents);
    }
  }
  for token in map.tokens() {
    builder.add(
      token.get_dst_line() + line_offset,
      token.get_dst_col(),
      token.get_src_line(),
      token.get_src_col(),
      token.get_source(),
      token.get_name(),
      false,
    );
  }
}
