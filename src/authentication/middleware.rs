use std::sync::Arc;

use warp::{reject::Rejection, Filter};

use crate::error::ErrorKind;

use super::jwt::{SessionData, SessionKeys};

/// Extracts the token from `Token <jwt>` or `Bearer <jwt>`.
pub fn parse_authorization(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();

    let known = scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer");
    (known && !token.is_empty()).then_some(token)
}

pub fn with_session(
    keys: Arc<SessionKeys>,
) -> impl Filter<Extract = (SessionData,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").and_then(move |header: Option<String>| {
        let keys = keys.clone();
        async move {
            let token = header
                .as_deref()
                .and_then(parse_authorization)
                .ok_or_else(|| ErrorKind::Unauthenticated.default())?;
            let session = keys.verify(token)?;

            Ok::<_, Rejection>(SessionData::from(session))
        }
    })
}

/// Anonymous when the header is missing or the token does not verify.
pub fn with_possible_session(
    keys: Arc<SessionKeys>,
) -> impl Filter<Extract = (Option<SessionData>,), Error = Rejection> + Clone {
    warp::header::optional::<String>("authorization").map(move |header: Option<String>| {
        let token = header.as_deref().and_then(parse_authorization)?;
        match keys.verify(token) {
            Ok(session) => Some(SessionData::from(session)),
            Err(e) => {
                log::trace!("Ignoring unusable token: {e}");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_schemes_are_accepted() {
        assert_eq!(parse_authorization("Token abc.def"), Some("abc.def"));
        assert_eq!(parse_authorization("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_authorization("bearer  abc "), Some("abc"));
    }

    #[test]
    fn other_headers_are_ignored() {
        assert_eq!(parse_authorization("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_authorization("Token"), None);
        assert_eq!(parse_authorization("Token "), None);
    }
}
