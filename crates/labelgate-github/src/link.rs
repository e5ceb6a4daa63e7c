//! `Link` header pagination.

use reqwest::header::{HeaderMap, LINK};

/// URL of the next page, if the response advertises one.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_next_link)
}

/// Extract the `rel="next"` target from a raw `Link` header value.
///
/// ```
/// use labelgate_github::parse_next_link;
///
/// let header = r#"<https://api.github.com/x?page=2>; rel="next", <https://api.github.com/x?page=5>; rel="last""#;
/// assert_eq!(
///     parse_next_link(header).as_deref(),
///     Some("https://api.github.com/x?page=2")
/// );
/// ```
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut params = entry.split(';');
        let target = params.next()?.trim();
        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        params
            .map(str::trim)
            .any(is_next_rel)
            .then(|| url.to_string())
    })
}

fn is_next_rel(param: &str) -> bool {
    match param.split_once('=') {
        Some((key, value)) => {
            key.trim() == "rel"
                && value
                    .trim()
                    .trim_matches('"')
                    .split_whitespace()
                    .any(|rel| rel == "next")
        }
        None => false,
    }
}
