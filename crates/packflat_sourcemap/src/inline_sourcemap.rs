use packflat_utils::{
  base64::{from_standard_base64, to_standard_base64},
  concat_string,
};
use sourcemap::{SourceMap, SourceMapBuilder};

const DATA_URL_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

/// Decodes a `//# sourceMappingURL=data:...` comment. Comments pointing at a file, or whose
/// payload is not a source map, yield `None`.
pub fn decode_inline_sourcemap(comment: &str) -> Option<SourceMap> {
  let url = comment
    .strip_prefix("//# sourceMappingURL=")
    .or_else(|| comment.strip_prefix("//@ sourceMappingURL="))?
    .trim();
  let payload = url.strip_prefix("data:")?.split_once(";base64,")?.1;
  let json = from_standard_base64(payload)?;
  SourceMap::from_slice(&json)
    .inspect_err(|err| tracing::warn!("Ignoring malformed inline source map: {err}"))
    .ok()
}

/// Maps the positions of `map`, which point into the output of another tool, back through
/// `input`, the map that tool produced.
pub fn compose_sourcemaps(map: &SourceMap, input: &SourceMap) -> SourceMap {
  let mut builder = SourceMapBuilder::new(None);
  for (idx, name) in input.sources().enumerate() {
    let src_id = builder.add_source(name);
    let idx = u32::try_from(idx).unwrap_or(u32::MAX);
    builder.set_source_contents(src_id, input.get_source_contents(idx));
  }

  for token in map.tokens() {
    let Some(original) = input.lookup_token(token.get_src_line(), token.get_src_col()) else {
      continue;
    };
    if original.get_dst_line() != token.get_src_line() || !original.has_source() {
      continue;
    }
    builder.add(
      token.get_dst_line(),
      token.get_dst_col(),
      original.get_src_line(),
      original.get_src_col(),
      original.get_source(),
      original.get_name(),
      false,
    );
  }
  builder.into_sourcemap()
}

pub fn sourcemap_comment(map: &SourceMap) -> anyhow::Result<String> {
  let mut json = vec![];
  map.to_writer(&mut json)?;
  Ok(concat_string!("//# sourceMappingURL=", DATA_URL_PREFIX, to_standard_base64(&json)))
}
