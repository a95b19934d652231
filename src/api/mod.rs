//! HTTP surface, mounted under `/api`.

mod auth;
mod filters;
mod ingredients;
mod recipes;
pub mod responses;
mod state;
mod tags;
mod users;

use std::convert::Infallible;

use serde_json::json;
use warp::{
    filters::body::BodyDeserializeError,
    http::StatusCode,
    reject::{
        InvalidQuery, LengthRequired, MethodNotAllowed, PayloadTooLarge, Rejection,
        UnsupportedMediaType,
    },
    reply::{Reply, Response},
    Filter,
};

use crate::error::{Error, ErrorKind};

pub use filters::parse_recipe_query;
pub use state::{with_state, AppState};

pub fn routes(state: AppState) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    let api = recipes::routes(&state)
        .or(tags::routes(&state))
        .unify()
        .or(ingredients::routes(&state))
        .unify()
        .or(users::routes(&state))
        .unify()
        .or(auth::routes(&state))
        .unify();

    warp::path("api")
        .and(api)
        .recover(handle_rejection)
        .unify()
        .with(warp::log("foodgram::api"))
}

fn detail(status: StatusCode, info: &str) -> Response {
    responses::json(&json!({ "detail": info }), status)
}

/// Turns every rejection into a JSON body.
pub async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    if let Some(error) = err.find::<Error>() {
        return Ok(responses::json(&error.body(), error.status()));
    }

    if let Some(e) = err.find::<BodyDeserializeError>() {
        log::trace!("Rejected request body: {e}");
        let error = ErrorKind::Validation.new(&format!("Malformed request body: {e}"));
        return Ok(responses::json(&error.body(), error.status()));
    }
    if err.find::<InvalidQuery>().is_some() {
        return Ok(detail(StatusCode::BAD_REQUEST, "Malformed query string"));
    }
    if err.find::<PayloadTooLarge>().is_some() {
        return Ok(detail(StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large"));
    }
    if err.find::<LengthRequired>().is_some() {
        return Ok(detail(StatusCode::LENGTH_REQUIRED, "Content-Length is required"));
    }
    if err.find::<UnsupportedMediaType>().is_some() {
        return Ok(detail(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Request body must be JSON",
        ));
    }
    if err.find::<MethodNotAllowed>().is_some() {
        return Ok(detail(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed"));
    }
    if err.is_not_found() {
        return Ok(detail(StatusCode::NOT_FOUND, "Not found"));
    }

    log::error!("Unhandled rejection: {err:?}");
    Ok(detail(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_errors_keep_their_status() {
        let rejection: Rejection = ErrorKind::Permission.default().into();
        let response = handle_rejection(rejection).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let response = handle_rejection(warp::reject::not_found()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
