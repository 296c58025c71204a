//! Redaction of credentials embedded in URLs before they reach the logs

use url::Url;

/// Placeholder for masked URL parts
const MASK: &str = "***";

/// Minimum length of a path segment treated as a token
const TOKEN_SEGMENT_LEN: usize = 24;

/// Redact a URL for logging
///
/// Userinfo is removed, the query string is masked and long token-like path
/// segments are masked. Anything that does not parse as a URL is returned
/// unchanged.
#[must_use]
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_owned();
    };

    if url.cannot_be_a_base() {
        return raw.to_owned();
    }

    // Both setters only fail on cannot-be-a-base URLs, excluded above.
    let _ = url.set_username("");
    let _ = url.set_password(None);

    if url.query().is_some() {
        url.set_query(Some(MASK));
    }

    let segments: Vec<String> = url
        .path_segments()
        .map(|segments| {
            segments
                .map(|segment| {
                    if looks_like_token(segment) {
                        MASK.to_owned()
                    } else {
                        segment.to_owned()
                    }
                })
                .collect()
        })
        .unwrap_or_default();
    url.set_path(&segments.join("/"));

    url.to_string()
}

/// Redact every URL-looking entry of a list, leaving plain paths intact
#[must_use]
pub fn redact_all<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|item| redact_url(item.as_ref())).collect()
}

fn looks_like_token(segment: &str) -> bool {
    segment.len() >= TOKEN_SEGMENT_LEN
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
