use memchr::memchr_iter;

/// Maps byte offsets of a text to zero-based `(line, utf16 column)` pairs, the unit source maps use.
#[derive(Debug)]
pub struct LineIndex<'text> {
  text: &'text str,
  line_starts: Vec<u32>,
}

impl<'text> LineIndex<'text> {
  pub fn new(text: &'text str) -> Self {
    let mut line_starts = vec![0];
    line_starts.extend(memchr_iter(b'\n', text.as_bytes()).map(|pos| to_u32(pos + 1)));
    Self { text, line_starts }
  }

  pub fn position(&self, offset: u32) -> (u32, u32) {
    let line = self.line_starts.partition_point(|start| *start <= offset) - 1;
    let line_start = self.line_starts[line] as usize;
    let end = (offset as usize).min(self.text.len());
    let col = self.text.get(line_start..end).map_or(0, utf16_len);
    (to_u32(line), col)
  }
}

pub(crate) fn utf16_len(s: &str) -> u32 {
  if s.is_ascii() { to_u32(s.len()) } else { to_u32(s.encode_utf16().count()) }
}

pub(crate) fn to_u32(value: usize) -> u32 {
  u32::try_from(value).unwrap_or(u32::MAX)
}

/// Tracks the generated position while text is written out piece by piece.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Cursor {
  pub line: u32,
  pub col: u32,
}

impl Cursor {
  pub fn advance(&mut self, written: &str) {
    match memchr::memrchr(b'\n', written.as_bytes()) {
      Some(last_newline) => {
        self.line += crate::lines_count(written);
        self.col = utf16_len(&written[last_newline + 1..]);
      }
      None => self.col += utf16_len(written),
    }
  }
}

#[test]
fn test_position() {
  let index = LineIndex::new("ab\ncd\n\nλx");
  assert_eq!(index.position(0), (0, 0));
  assert_eq!(index.position(2), (0, 2));
  assert_eq!(index.position(3), (1, 0));
  assert_eq!(index.position(4), (1, 1));
  assert_eq!(index.position(6), (2, 0));
  assert_eq!(index.position(7), (3, 0));
  // `λ` is two bytes but a single utf16 unit
  assert_eq!(index.position(9), (3, 1));
}

#[test]
fn test_cursor() {
  let mut cursor = Cursor::default();
  cursor.advance("abc");
  assert_eq!((cursor.line, cursor.col), (0, 3));
  cursor.advance("d\nef");
  assert_eq!((cursor.line, cursor.col), (1, 2));
  cursor.advance("\n");
  assert_eq!((cursor.line, cursor.col), (2, 0));
}
