//! Helpers for keeping credentials and bulky text out of log fields.
//!
//! Portal URLs and LLM endpoints can carry API keys or session tokens in
//! their query strings or userinfo; job descriptions and prompts can run to
//! several kilobytes. Everything passed to a `tracing` field goes through
//! one of these first.

use url::Url;

/// Query parameters whose values are replaced with `****`.
const SENSITIVE_PARAMS: [&str; 6] = ["key", "api_key", "token", "access_token", "password", "session"];

/// Default character budget for [`truncate_for_log`].
pub const LOG_TEXT_LIMIT: usize = 120;

/// Masks sensitive query values and userinfo in a URL.
///
/// - `https://host/v1?key=abc&q=rust` → `https://host/v1?key=****&q=rust`
/// - `https://user:pw@host/` → `https://****@host/`
/// - strings that do not parse as URLs are returned unchanged
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    let had_userinfo = !url.username().is_empty() || url.password().is_some();
    if had_userinfo {
        // set_username/set_password only fail for cannot-be-a-base URLs
        let _ = url.set_password(None);
        let _ = url.set_username("****");
    }

    if url.query().is_some() {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| {
                let value = if is_sensitive(&k) {
                    "****".to_string()
                } else {
                    v.into_owned()
                };
                (k.into_owned(), value)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    url.to_string()
}

fn is_sensitive(param: &str) -> bool {
    SENSITIVE_PARAMS
        .iter()
        .any(|p| p.eq_ignore_ascii_case(param))
}

/// Shortens `text` to at most `max_chars` characters, appending `…` when cut.
///
/// Counts chars, not bytes, so multi-byte text is never split mid-character.
pub fn truncate_for_log(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
