//! Query string parsing module
//!
//! Parses `application/x-www-form-urlencoded` style query strings.

use std::collections::HashMap;

/// Decoded query parameters; the last value wins for duplicate keys
pub type QueryParams = HashMap<String, String>;

/// Parse a raw query string (without the leading `?`)
///
/// Pairs are split on `&` and on the first `=`. A pair without `=` maps to
/// an empty value. Empty pairs are skipped.
pub fn parse_query(query: Option<&str>) -> QueryParams {
    let mut params = QueryParams::new();
    let Some(query) = query else {
        return params;
    };

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode_component(key, true), decode_component(value, true));
    }
    params
}

/// Decode `%XX` escapes in a URL path segment (`+` stays literal)
pub fn decode_path(raw: &str) -> String {
    decode_component(raw, false)
}

/// Decode `%XX` escapes, and `+` as space in query components;
/// malformed escapes are kept verbatim
fn decode_component(raw: &str, plus_as_space: bool) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' if plus_as_space => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        i += 2;
                    }
                    _ => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_query() {
        assert!(parse_query(None).is_empty());
        assert!(parse_query(Some("")).is_empty());
    }

    #[test]
    fn test_simple_pairs() {
        let params = parse_query(Some("input=abc&flag"));
        assert_eq!(params.get("input").map(String::as_str), Some("abc"));
        assert_eq!(params.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn test_last_value_wins() {
        let params = parse_query(Some("input=one&input=two"));
        assert_eq!(params.get("input").map(String::as_str), Some("two"));
    }

    #[test]
    fn test_percent_decoding() {
        let params = parse_query(Some("input=hello+big%20world%21&k%3D=v%3Dx"));
        assert_eq!(params.get("input").map(String::as_str), Some("hello big world!"));
        assert_eq!(params.get("k=").map(String::as_str), Some("v=x"));
    }

    #[test]
    fn test_utf8_decoding() {
        let params = parse_query(Some("input=caf%C3%A9"));
        assert_eq!(params.get("input").map(String::as_str), Some("café"));
    }

    #[test]
    fn test_decode_path_keeps_plus() {
        assert_eq!(decode_path("a+b%20c.txt"), "a+b c.txt");
    }

    #[test]
    fn test_malformed_escapes_kept() {
        let params = parse_query(Some("a=100%&b=%zz&c=%4"));
        assert_eq!(params.get("a").map(String::as_str), Some("100%"));
        assert_eq!(params.get("b").map(String::as_str), Some("%zz"));
        assert_eq!(params.get("c").map(String::as_str), Some("%4"));
    }
}
