//! Minimal `Cookie` header parsing.

use std::borrow::Cow;

use axum::http::{header::COOKIE, HeaderMap};

fn decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Iterate `(name, value)` pairs across every `Cookie` header.
pub fn cookies(headers: &HeaderMap) -> impl Iterator<Item = (String, String)> + '_ {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            if k.is_empty() {
                return None;
            }
            Some((decode(k).into_owned(), decode(v).into_owned()))
        })
}

/// First non-empty cookie value, trying `names` in order.
pub fn session_token(headers: &HeaderMap, names: &[String]) -> Option<String> {
    let jar: Vec<(String, String)> = cookies(headers).collect();
    names.iter().find_map(|name| {
        jar.iter()
            .find(|(k, v)| k == name && !v.is_empty())
            .map(|(_, v)| v.clone())
    })
}
