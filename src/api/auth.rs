use serde_json::json;
use warp::{filters::BoxedFilter, http::StatusCode, reject::Rejection, reply::Response, Filter};

use crate::users::{login, LoginForm};

use super::{
    filters::json_body,
    responses,
    state::{with_state, AppState},
};

async fn obtain_token(form: LoginForm, state: AppState) -> Result<Response, Rejection> {
    let token = login(&*state.store, &state.keys, form).await?;
    Ok(responses::json(&json!({ "auth_token": token }), StatusCode::OK))
}

pub fn routes(state: &AppState) -> BoxedFilter<(Response,)> {
    warp::path!("auth" / "token" / "login")
        .and(warp::post())
        .and(json_body::<LoginForm>())
        .and(with_state(state.clone()))
        .and_then(obtain_token)
        .boxed()
}
