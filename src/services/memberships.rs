//! Favorite, shopping cart and follow state transitions.

use crate::{
    error::{Error, ErrorKind},
    jwt::SessionData,
    permissions::ActionType,
    schema::{Id, Membership, Recipe, User},
    store::Store,
};

async fn existing_recipe(store: &dyn Store, recipe_id: Id) -> Result<Recipe, Error> {
    store
        .get_recipe(recipe_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.new("No recipe exists with specified id"))
}

async fn existing_author(store: &dyn Store, author_id: Id) -> Result<User, Error> {
    store
        .get_user(author_id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.new("No user exists with specified id"))
}

/// absent -> present. A second add is a conflict.
pub async fn add_membership(
    store: &dyn Store,
    session: &SessionData,
    kind: Membership,
    recipe_id: Id,
) -> Result<Recipe, Error> {
    session.authenticate(ActionType::ManageOwnMemberships)?;
    let recipe = existing_recipe(store, recipe_id).await?;

    if !store.add_membership(kind, session.user_id, recipe.id).await? {
        return Err(ErrorKind::Conflict.new(kind.already_present()));
    }

    log::info!(
        "User {} added recipe {} to {}",
        session.user_id,
        recipe.id,
        kind.table()
    );
    Ok(recipe)
}

/// present -> absent. Removing an absent recipe is not found.
pub async fn remove_membership(
    store: &dyn Store,
    session: &SessionData,
    kind: Membership,
    recipe_id: Id,
) -> Result<(), Error> {
    session.authenticate(ActionType::ManageOwnMemberships)?;
    let recipe = existing_recipe(store, recipe_id).await?;

    if !store
        .remove_membership(kind, session.user_id, recipe.id)
        .await?
    {
        return Err(ErrorKind::NotFound.new(kind.not_present()));
    }
    Ok(())
}

pub async fn follow(store: &dyn Store, session: &SessionData, author_id: Id) -> Result<User, Error> {
    session.authenticate(ActionType::ManageFollows)?;
    let author = existing_author(store, author_id).await?;

    if author.id == session.user_id {
        return Err(ErrorKind::Validation.new("You cannot follow yourself"));
    }
    if !store.follow(session.user_id, author.id).await? {
        return Err(ErrorKind::Conflict.new("You are already subscribed to this author"));
    }

    log::info!("User {} now follows {}", session.user_id, author.id);
    Ok(author)
}

pub async fn unfollow(store: &dyn Store, session: &SessionData, author_id: Id) -> Result<(), Error> {
    session.authenticate(ActionType::ManageFollows)?;
    let author = existing_author(store, author_id).await?;

    if !store.unfollow(session.user_id, author.id).await? {
        return Err(ErrorKind::Validation.new("You are not subscribed to this author"));
    }
    Ok(())
}
