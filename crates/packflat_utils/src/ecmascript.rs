use oxc_syntax::{identifier, keyword};

/// Whether `name` can be used as a binding name in strict-mode code.
pub fn is_validate_identifier_name(name: &str) -> bool {
  identifier::is_identifier_name(name) && !keyword::is_reserved_keyword(name)
}

/// Turn an arbitrary string into a valid identifier.
///
/// Characters that would make the name invalid are dropped and the character following a
/// dropped one is uppercased, so `my-module` becomes `myModule`. The result keeps a leading
/// `_` only when it is needed to make the name valid, for example `_1abc` or `_class`.
/// Returns `None` when nothing of the input survives.
pub fn to_identifier(name: &str) -> Option<String> {
  let mut intermediate = String::with_capacity(name.len() + 1);
  intermediate.push('_');
  let mut prev_was_invalid = false;

  for char in name.chars() {
    let len = intermediate.len();
    if prev_was_invalid && len > 1 {
      intermediate.extend(char.to_uppercase());
    } else {
      intermediate.push(char);
    }
    if is_validate_identifier_name(&intermediate) {
      prev_was_invalid = false;
    } else {
      intermediate.truncate(len);
      prev_was_invalid = true;
    }
  }

  if intermediate.len() == 1 {
    return None;
  }
  if is_validate_identifier_name(&intermediate[1..]) {
    intermediate.remove(0);
  }
  Some(intermediate)
}

/// Render `s` as a JSON string literal, which is also a valid JavaScript string literal.
pub fn json_quote(s: &str) -> String {
  serde_json::Value::String(s.to_owned()).to_string()
}

#[test]
fn test_is_validate_identifier_name() {
  assert!(is_validate_identifier_name("foo"));
  assert!(is_validate_identifier_name("_$foo"));
  assert!(!is_validate_identifier_name("1aaaa"));
  assert!(!is_validate_identifier_name("😈"));
  assert!(!is_validate_identifier_name("class"));
}

#[test]
fn test_to_identifier() {
  assert_eq!(to_identifier("_$entry_1").as_deref(), Some("_$entry_1"));
  assert_eq!(to_identifier("_$my-module_3").as_deref(), Some("_$myModule_3"));
  assert_eq!(to_identifier("__a_./b").as_deref(), Some("__a_B"));
  assert_eq!(to_identifier("1abc").as_deref(), Some("_1abc"));
  assert_eq!(to_identifier("class").as_deref(), Some("_class"));
  assert_eq!(to_identifier("-a").as_deref(), Some("a"));
  assert_eq!(to_identifier("-"), None);
  assert_eq!(to_identifier(""), None);
}

#[test]
fn test_json_quote() {
  assert_eq!(json_quote("a"), "\"a\"");
  assert_eq!(json_quote("a\"b"), "\"a\\\"b\"");
}
