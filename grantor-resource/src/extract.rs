use axum::http::{header, HeaderMap};
use url::form_urlencoded;

/// Pull the bearer token out of a request. The sources are tried in
/// order and do not fall through: a present `Authorization` header must
/// be a well-formed `Bearer` value, and a form body must carry
/// `access_token` itself, or the request has no token.
pub fn bearer_token(
    headers: &HeaderMap,
    form_body: Option<&[u8]>,
    query: Option<&str>,
) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().ok()?;
        return match value.split_once(' ') {
            Some(("Bearer", token)) if !token.is_empty() => Some(token.to_string()),
            _ => None,
        };
    }

    if let Some(body) = form_body {
        return form_urlencoded::parse(body)
            .find(|(key, _)| key == "access_token")
            .map(|(_, value)| value.into_owned());
    }

    form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(key, _)| key == "access_token")
        .map(|(_, value)| value.into_owned())
}
