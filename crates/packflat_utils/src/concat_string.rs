/// Concatenate string-like values with a single allocation.
///
/// ```ignore
/// let name = concat_string!("_$", stem, "_", id);
/// ```
#[macro_export]
macro_rules! concat_string {
  () => {
    String::new()
  };
  ($($s:expr),+ $(,)?) => {
    match [$(AsRef::<str>::as_ref(&$s)),+] {
      parts => {
        let mut buf = String::with_capacity(parts.iter().map(|part| part.len()).sum());
        for part in parts {
          buf.push_str(part);
        }
        buf
      }
    }
  };
}

#[test]
fn test_concat_string() {
  let id = String::from("12");
  assert_eq!(concat_string!("_$", "entry", "_", id), "_$entry_12");
  assert_eq!(concat_string!(), "");
}

#[test]
fn test_concat_string_evaluates_each_argument_once() {
  let mut calls = 0;
  let mut next = || {
    calls += 1;
    calls.to_string()
  };
  let owned = String::from("moved");
  assert_eq!(concat_string!(next(), "-", owned, "-", next()), "1-moved-2");
  assert_eq!(calls, 2);
}
