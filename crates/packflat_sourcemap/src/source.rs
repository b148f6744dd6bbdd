use sourcemap::SourceMap;

use crate::{lines_count, EditedSource};

/// Anything [`crate::SourceJoiner`] can lay out: text, plus the map for it when there is one.
pub trait Source {
  fn content(&self) -> &str;

  fn sourcemap(&self) -> Option<&SourceMap> {
    None
  }

  /// Number of line breaks in [`Source::content`].
  fn lines_count(&self) -> u32 {
    lines_count(self.content())
  }
}

impl Source for &str {
  fn content(&self) -> &str {
    self
  }
}

impl Source for String {
  fn content(&self) -> &str {
    self
  }
}

impl Source for EditedSource {
  fn content(&self) -> &str {
    &self.code
  }

  fn sourcemap(&self) -> Option<&SourceMap> {
    self.map.as_ref()
  }

  fn lines_count(&self) -> u32 {
    self.lines_count
  }
}
