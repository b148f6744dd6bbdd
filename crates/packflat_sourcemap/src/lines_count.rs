use memchr::memchr_iter;

/// Number of `\n` in `str`, which is the index of its last line.
#[inline]
pub fn lines_count(str: &str) -> u32 {
  u32::try_from(memchr_iter(b'\n', str.as_bytes()).count()).unwrap_or(u32::MAX)
}

#[test]
fn test_lines_count() {
  assert_eq!(lines_count(""), 0);
  assert_eq!(lines_count("var a;"), 0);
  assert_eq!(lines_count("(function(){\nvar a;\n}());"), 2);
  assert_eq!(lines_count("a\r\nb\n"), 2);
}
