use warp::{filters::BoxedFilter, http::StatusCode, reject::Rejection, reply::Response, Filter};

use crate::{
    catalog::{create_tag, get_tag},
    jwt::SessionData,
    schema::{Id, NewTag},
};

use super::{
    filters::json_body,
    responses::json,
    state::{with_state, AppState},
};

async fn list_tags(state: AppState) -> Result<Response, Rejection> {
    let tags = state.store.list_tags().await?;
    Ok(json(&tags, StatusCode::OK))
}

async fn retrieve_tag(id: Id, state: AppState) -> Result<Response, Rejection> {
    let tag = get_tag(&*state.store, id).await?;
    Ok(json(&tag, StatusCode::OK))
}

async fn post_tag(session: SessionData, tag: NewTag, state: AppState) -> Result<Response, Rejection> {
    let tag = create_tag(&*state.store, &session, tag).await?;
    Ok(json(&tag, StatusCode::CREATED))
}

pub fn routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let list = warp::path!("tags")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(list_tags);

    let retrieve = warp::path!("tags" / Id)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(retrieve_tag);

    let create = warp::path!("tags")
        .and(warp::post())
        .and(state.session())
        .and(json_body::<NewTag>())
        .and(with_state(state.clone()))
        .and_then(post_tag);

    list.or(retrieve).unify().or(create).unify().boxed()
}
