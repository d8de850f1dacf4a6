/// Percent-encode a manifest entry using URI-reference rules.
///
/// Unreserved characters and URI delimiters pass through untouched, everything else
/// (spaces, `%`, non-ASCII) is written as UTF-8 `%XX` escapes.
pub fn encode_uri(value: &str) -> String {
  let mut encoded = String::with_capacity(value.len());
  for byte in value.bytes() {
    if is_uri_safe(byte) {
      encoded.push(char::from(byte));
    } else {
      encoded.push('%');
      encoded.push(hex_digit(byte >> 4));
      encoded.push(hex_digit(byte & 0x0f));
    }
  }
  encoded
}

fn is_uri_safe(byte: u8) -> bool {
  byte.is_ascii_alphanumeric()
    || matches!(
      byte,
      b';'
        | b','
        | b'/'
        | b'?'
        | b':'
        | b'@'
        | b'&'
        | b'='
        | b'+'
        | b'$'
        | b'-'
        | b'_'
        | b'.'
        | b'!'
        | b'~'
        | b'*'
        | b'\''
        | b'('
        | b')'
        | b'#'
    )
}

fn hex_digit(nibble: u8) -> char {
  char::from(b"0123456789ABCDEF"[usize::from(nibble)])
}

#[cfg(test)]
mod tests {
  use super::encode_uri;

  #[test]
  fn keeps_reserved_and_unreserved_characters() {
    assert_eq!(encode_uri("http://*"), "http://*");
    assert_eq!(encode_uri("a/b-c_d.e~f?x=1&y=2#top"), "a/b-c_d.e~f?x=1&y=2#top");
  }

  #[test]
  fn escapes_spaces_and_percent_signs() {
    assert_eq!(encode_uri("my file.js"), "my%20file.js");
    assert_eq!(encode_uri("100%.png"), "100%25.png");
  }

  #[test]
  fn escapes_non_ascii_as_utf8_bytes() {
    assert_eq!(encode_uri("café.css"), "caf%C3%A9.css");
  }
}
