use crate::{
    error::{Error, ErrorKind},
    jwt::SessionData,
    permissions::ActionType,
    schema::{Id, Ingredient, NewIngredient, NewTag, Tag},
    store::Store,
    validation::{validate_ingredient, validate_tag},
};

pub async fn get_tag(store: &dyn Store, id: Id) -> Result<Tag, Error> {
    store
        .get_tag(id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.new("No tag exists with specified id"))
}

pub async fn create_tag(store: &dyn Store, session: &SessionData, tag: NewTag) -> Result<Tag, Error> {
    session.authenticate(ActionType::ManageCatalog)?;
    let tag = store.create_tag(validate_tag(tag)?).await?;

    log::info!("Created tag {} ({})", tag.id, tag.slug);
    Ok(tag)
}

pub async fn get_ingredient(store: &dyn Store, id: Id) -> Result<Ingredient, Error> {
    store
        .get_ingredient(id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.new("No ingredient exists with specified id"))
}

pub async fn create_ingredient(
    store: &dyn Store,
    session: &SessionData,
    ingredient: NewIngredient,
) -> Result<Ingredient, Error> {
    session.authenticate(ActionType::ManageCatalog)?;
    let ingredient = store
        .create_ingredient(validate_ingredient(ingredient)?)
        .await?;

    log::info!(
        "Created ingredient {} ({}, {})",
        ingredient.id,
        ingredient.name,
        ingredient.measurement_unit
    );
    Ok(ingredient)
}
