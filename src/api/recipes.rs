use warp::{
    filters::BoxedFilter,
    http::StatusCode,
    reject::Rejection,
    reply::{self, Reply, Response},
    Filter,
};

use crate::{
    constants::SHOPPING_LIST_FILENAME,
    jwt::SessionData,
    memberships::{add_membership, remove_membership},
    pagination::{PageContext, PageRequest},
    permissions::ActionType,
    recipes::{create_recipe, delete_recipe, get_recipe, update_recipe},
    schema::{Id, Membership},
    shopping_list::build_report,
    validation::RecipeForm,
};

use super::{
    filters::{json_body, parse_recipe_query},
    responses::{json, no_content, shape_recipe, RecipeAction},
    state::{with_state, AppState},
};

async fn list_recipes(
    session: Option<SessionData>,
    pairs: Vec<(String, String)>,
    state: AppState,
) -> Result<Response, Rejection> {
    let query = parse_recipe_query(&pairs)?;
    let page = PageRequest::from_query(query.page(), state.page_size);
    let viewer = session.map(|s| s.user_id);

    let (rows, total) = state
        .store
        .fetch_recipes(&query.filter, viewer, &page)
        .await?;

    let mut results = Vec::with_capacity(rows.len());
    for recipe in rows {
        results.push(shape_recipe(&*state.store, recipe, viewer, RecipeAction::List).await?);
    }

    Ok(json(
        &PageContext::from_rows(results, total, &page),
        StatusCode::OK,
    ))
}

async fn retrieve_recipe(
    id: Id,
    session: Option<SessionData>,
    state: AppState,
) -> Result<Response, Rejection> {
    let recipe = get_recipe(&*state.store, id).await?;
    let viewer = session.map(|s| s.user_id);

    let body = shape_recipe(&*state.store, recipe, viewer, RecipeAction::Retrieve).await?;
    Ok(json(&body, StatusCode::OK))
}

async fn post_recipe(
    session: SessionData,
    form: RecipeForm,
    state: AppState,
) -> Result<Response, Rejection> {
    let recipe = create_recipe(&*state.store, &session, form).await?;

    let body = shape_recipe(
        &*state.store,
        recipe,
        Some(session.user_id),
        RecipeAction::Create,
    )
    .await?;
    Ok(json(&body, StatusCode::CREATED))
}

async fn patch_recipe(
    id: Id,
    session: SessionData,
    form: RecipeForm,
    state: AppState,
) -> Result<Response, Rejection> {
    let recipe = update_recipe(&*state.store, &session, id, form).await?;

    let body = shape_recipe(
        &*state.store,
        recipe,
        Some(session.user_id),
        RecipeAction::Update,
    )
    .await?;
    Ok(json(&body, StatusCode::OK))
}

async fn remove_recipe(
    id: Id,
    session: SessionData,
    state: AppState,
) -> Result<Response, Rejection> {
    delete_recipe(&*state.store, &session, id).await?;
    Ok(no_content())
}

fn membership_action(kind: Membership) -> RecipeAction {
    match kind {
        Membership::Favorite => RecipeAction::Favorite,
        Membership::ShoppingCart => RecipeAction::ShoppingCart,
    }
}

async fn post_membership(
    id: Id,
    kind: Membership,
    session: SessionData,
    state: AppState,
) -> Result<Response, Rejection> {
    let recipe = add_membership(&*state.store, &session, kind, id).await?;

    let body = shape_recipe(
        &*state.store,
        recipe,
        Some(session.user_id),
        membership_action(kind),
    )
    .await?;
    Ok(json(&body, StatusCode::CREATED))
}

async fn delete_membership(
    id: Id,
    kind: Membership,
    session: SessionData,
    state: AppState,
) -> Result<Response, Rejection> {
    remove_membership(&*state.store, &session, kind, id).await?;
    Ok(no_content())
}

async fn download_shopping_cart(
    session: SessionData,
    state: AppState,
) -> Result<Response, Rejection> {
    session.authenticate(ActionType::ManageOwnMemberships)?;
    let document = build_report(&*state.store, session.user_id).await?;

    let reply = reply::with_header(
        reply::with_header(document, "content-type", "text/plain; charset=utf-8"),
        "content-disposition",
        format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
    );
    Ok(reply.into_response())
}

fn membership_routes(
    state: &AppState,
    segment: &'static str,
    kind: Membership,
) -> BoxedFilter<(Response,)> {
    let path = warp::path("recipes")
        .and(warp::path::param::<Id>())
        .and(warp::path(segment))
        .and(warp::path::end());

    let add = path
        .clone()
        .and(warp::post())
        .and(warp::any().map(move || kind))
        .and(state.session())
        .and(with_state(state.clone()))
        .and_then(post_membership);

    let remove = path
        .and(warp::delete())
        .and(warp::any().map(move || kind))
        .and(state.session())
        .and(with_state(state.clone()))
        .and_then(delete_membership);

    add.or(remove).unify().boxed()
}

pub fn routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let download = warp::path!("recipes" / "download_shopping_cart")
        .and(warp::get())
        .and(state.session())
        .and(with_state(state.clone()))
        .and_then(download_shopping_cart);

    let list = warp::path!("recipes")
        .and(warp::get())
        .and(state.possible_session())
        .and(warp::query::<Vec<(String, String)>>())
        .and(with_state(state.clone()))
        .and_then(list_recipes);

    let create = warp::path!("recipes")
        .and(warp::post())
        .and(state.session())
        .and(json_body::<RecipeForm>())
        .and(with_state(state.clone()))
        .and_then(post_recipe);

    let retrieve = warp::path!("recipes" / Id)
        .and(warp::get())
        .and(state.possible_session())
        .and(with_state(state.clone()))
        .and_then(retrieve_recipe);

    let update = warp::path!("recipes" / Id)
        .and(warp::patch())
        .and(state.session())
        .and(json_body::<RecipeForm>())
        .and(with_state(state.clone()))
        .and_then(patch_recipe);

    let delete = warp::path!("recipes" / Id)
        .and(warp::delete())
        .and(state.session())
        .and(with_state(state.clone()))
        .and_then(remove_recipe);

    download
        .or(list)
        .unify()
        .or(create)
        .unify()
        .or(retrieve)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .or(membership_routes(state, "favorite", Membership::Favorite))
        .unify()
        .or(membership_routes(state, "shopping_cart", Membership::ShoppingCart))
        .unify()
        .boxed()
}
