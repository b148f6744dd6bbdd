use packflat_sourcemap::SourceMap;

#[derive(Debug)]
pub struct BundleOutput {
  /// The flattened bundle, ending with a newline.
  pub code: String,
  /// Present when source maps are enabled. `code` also carries it as an inline comment.
  pub map: Option<SourceMap>,
  pub warnings: Vec<anyhow::Error>,
}
