use warp::{filters::BoxedFilter, http::StatusCode, reject::Rejection, reply::Response, Filter};

use crate::{
    catalog::{create_ingredient, get_ingredient},
    jwt::SessionData,
    schema::{Id, NewIngredient},
};

use super::{
    filters::{json_body, IngredientQuery},
    responses::json,
    state::{with_state, AppState},
};

async fn search_ingredients(query: IngredientQuery, state: AppState) -> Result<Response, Rejection> {
    let prefix = query.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let ingredients = state.store.search_ingredients(prefix).await?;
    Ok(json(&ingredients, StatusCode::OK))
}

async fn retrieve_ingredient(id: Id, state: AppState) -> Result<Response, Rejection> {
    let ingredient = get_ingredient(&*state.store, id).await?;
    Ok(json(&ingredient, StatusCode::OK))
}

async fn post_ingredient(
    session: SessionData,
    ingredient: NewIngredient,
    state: AppState,
) -> Result<Response, Rejection> {
    let ingredient = create_ingredient(&*state.store, &session, ingredient).await?;
    Ok(json(&ingredient, StatusCode::CREATED))
}

pub fn routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let search = warp::path!("ingredients")
        .and(warp::get())
        .and(warp::query::<IngredientQuery>())
        .and(with_state(state.clone()))
        .and_then(search_ingredients);

    let retrieve = warp::path!("ingredients" / Id)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(retrieve_ingredient);

    let create = warp::path!("ingredients")
        .and(warp::post())
        .and(state.session())
        .and(json_body::<NewIngredient>())
        .and(with_state(state.clone()))
        .and_then(post_ingredient);

    search.or(retrieve).unify().or(create).unify().boxed()
}
