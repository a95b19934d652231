use warp::{filters::BoxedFilter, http::StatusCode, reject::Rejection, reply::Response, Filter};

use crate::{
    error::ErrorKind,
    jwt::SessionData,
    memberships::{follow, unfollow},
    pagination::{PageContext, PageQuery, PageRequest},
    schema::Id,
    users::{
        current_user, delete_account, register, set_password, DeleteAccountForm, PasswordForm,
    },
    validation::UserForm,
};

use super::{
    filters::{json_body, SubscriptionQuery},
    responses::{json, no_content, subscription_view, user_view},
    state::{with_state, AppState},
};

async fn list_users(
    session: Option<SessionData>,
    query: PageQuery,
    state: AppState,
) -> Result<Response, Rejection> {
    let page = PageRequest::from_query(query, state.page_size);
    let viewer = session.map(|s| s.user_id);
    let (rows, total) = state.store.list_users(&page).await?;

    let mut results = Vec::with_capacity(rows.len());
    for user in rows {
        results.push(user_view(&*state.store, user, viewer).await?);
    }

    Ok(json(
        &PageContext::from_rows(results, total, &page),
        StatusCode::OK,
    ))
}

async fn post_user(form: UserForm, state: AppState) -> Result<Response, Rejection> {
    let user = register(&*state.store, form).await?;
    let body = user_view(&*state.store, user, None).await?;
    Ok(json(&body, StatusCode::CREATED))
}

async fn retrieve_user(
    id: Id,
    session: Option<SessionData>,
    state: AppState,
) -> Result<Response, Rejection> {
    let user = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.new("No user exists with specified id"))?;

    let body = user_view(&*state.store, user, session.map(|s| s.user_id)).await?;
    Ok(json(&body, StatusCode::OK))
}

async fn me(session: SessionData, state: AppState) -> Result<Response, Rejection> {
    let user = current_user(&*state.store, &session).await?;
    let body = user_view(&*state.store, user, Some(session.user_id)).await?;
    Ok(json(&body, StatusCode::OK))
}

async fn delete_me(
    session: SessionData,
    form: DeleteAccountForm,
    state: AppState,
) -> Result<Response, Rejection> {
    delete_account(&*state.store, &session, form).await?;
    Ok(no_content())
}

async fn change_password(
    session: SessionData,
    form: PasswordForm,
    state: AppState,
) -> Result<Response, Rejection> {
    set_password(&*state.store, &session, form).await?;
    Ok(no_content())
}

async fn subscriptions(
    session: SessionData,
    query: SubscriptionQuery,
    state: AppState,
) -> Result<Response, Rejection> {
    let page = PageRequest::from_query(query.page(), state.page_size);
    let (authors, total) = state.store.list_following(session.user_id, &page).await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in authors {
        results.push(
            subscription_view(&*state.store, author, session.user_id, query.recipes_limit).await?,
        );
    }

    Ok(json(
        &PageContext::from_rows(results, total, &page),
        StatusCode::OK,
    ))
}

async fn subscribe(
    id: Id,
    session: SessionData,
    query: SubscriptionQuery,
    state: AppState,
) -> Result<Response, Rejection> {
    let author = follow(&*state.store, &session, id).await?;
    let body =
        subscription_view(&*state.store, author, session.user_id, query.recipes_limit).await?;
    Ok(json(&body, StatusCode::CREATED))
}

async fn unsubscribe(id: Id, session: SessionData, state: AppState) -> Result<Response, Rejection> {
    unfollow(&*state.store, &session, id).await?;
    Ok(no_content())
}

pub fn routes(state: &AppState) -> BoxedFilter<(Response,)> {
    let list = warp::path!("users")
        .and(warp::get())
        .and(state.possible_session())
        .and(warp::query::<PageQuery>())
        .and(with_state(state.clone()))
        .and_then(list_users);

    let create = warp::path!("users")
        .and(warp::post())
        .and(json_body::<UserForm>())
        .and(with_state(state.clone()))
        .and_then(post_user);

    let get_me = warp::path!("users" / "me")
        .and(warp::get())
        .and(state.session())
        .and(with_state(state.clone()))
        .and_then(me);

    let remove_me = warp::path!("users" / "me")
        .and(warp::delete())
        .and(state.session())
        .and(json_body::<DeleteAccountForm>())
        .and(with_state(state.clone()))
        .and_then(delete_me);

    let password = warp::path!("users" / "set_password")
        .and(warp::post())
        .and(state.session())
        .and(json_body::<PasswordForm>())
        .and(with_state(state.clone()))
        .and_then(change_password);

    let following = warp::path!("users" / "subscriptions")
        .and(warp::get())
        .and(state.session())
        .and(warp::query::<SubscriptionQuery>())
        .and(with_state(state.clone()))
        .and_then(subscriptions);

    let retrieve = warp::path!("users" / Id)
        .and(warp::get())
        .and(state.possible_session())
        .and(with_state(state.clone()))
        .and_then(retrieve_user);

    let add_follow = warp::path!("users" / Id / "subscribe")
        .and(warp::post())
        .and(state.session())
        .and(warp::query::<SubscriptionQuery>())
        .and(with_state(state.clone()))
        .and_then(subscribe);

    let remove_follow = warp::path!("users" / Id / "subscribe")
        .and(warp::delete())
        .and(state.session())
        .and(with_state(state.clone()))
        .and_then(unsubscribe);

    list.or(create)
        .unify()
        .or(get_me)
        .unify()
        .or(remove_me)
        .unify()
        .or(password)
        .unify()
        .or(following)
        .unify()
        .or(retrieve)
        .unify()
        .or(add_follow)
        .unify()
        .or(remove_follow)
        .unify()
        .boxed()
}
