use base64_simd::{forgiving_decode_to_vec, STANDARD};

pub fn to_standard_base64(input: impl AsRef<[u8]>) -> String {
  STANDARD.encode_to_string(input.as_ref())
}

/// Decodes standard base64, tolerating missing padding and embedded whitespace.
pub fn from_standard_base64(input: &str) -> Option<Vec<u8>> {
  forgiving_decode_to_vec(input.as_bytes()).ok()
}

#[test]
fn test_base64() {
  assert_eq!(to_standard_base64("{}"), "e30=");
  assert_eq!(from_standard_base64("e30=").as_deref(), Some(b"{}".as_slice()));
  assert_eq!(from_standard_base64("e30").as_deref(), Some(b"{}".as_slice()));
  assert!(from_standard_base64("*").is_none());
}
