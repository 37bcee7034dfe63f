use hyper::header::{AUTHORIZATION, HeaderMap};

/// Checks that the `Authorization` header carries exactly `auth_token`.
pub fn is_authorized(headers: &HeaderMap, auth_token: &str) -> bool {
    headers
        .get(AUTHORIZATION)
        .is_some_and(|value| value.as_bytes() == auth_token.as_bytes())
}
