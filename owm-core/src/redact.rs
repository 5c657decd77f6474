//! Masking of credentials in values that end up in logs.

use std::borrow::Cow;

use crate::constants::API_KEY_PARAM;

/// Replacement written in place of a secret.
pub const REDACTED: &str = "***";

/// Masks the value of every `APPID` query pair in a request URL.
///
/// Keys without the parameter are returned borrowed and unchanged.
///
/// ```rust
/// use owm_core::redact_key;
///
/// assert_eq!(
///     redact_key("https://api.example/weather?q=Oslo&APPID=secret"),
///     "https://api.example/weather?q=Oslo&APPID=***"
/// );
/// assert_eq!(redact_key("plain"), "plain");
/// ```
pub fn redact_key(key: &str) -> Cow<'_, str> {
    let Some(query_start) = key.find('?') else {
        return Cow::Borrowed(key);
    };
    let (base, query) = key.split_at(query_start + 1);
    let (query, fragment) = match query.find('#') {
        Some(pos) => query.split_at(pos),
        None => (query, ""),
    };

    let mut masked = false;
    let pairs: Vec<&str> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) if name == API_KEY_PARAM && !value.is_empty() => {
                masked = true;
                name
            }
            _ => pair,
        })
        .collect();
    if !masked {
        return Cow::Borrowed(key);
    }

    let mut out = String::with_capacity(key.len());
    out.push_str(base);
    for (i, pair) in pairs.iter().enumerate() {
        if i > 0 {
            out.push('&');
        }
        out.push_str(pair);
        if *pair == API_KEY_PARAM {
            out.push('=');
            out.push_str(REDACTED);
        }
    }
    out.push_str(fragment);
    Cow::Owned(out)
}
