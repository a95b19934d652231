use crate::{
    error::{Error, ErrorKind},
    jwt::SessionData,
    permissions::ActionType,
    schema::{Id, Recipe},
    store::Store,
    validation::{check_references, validate_recipe, FormMode, RecipeForm},
};

pub async fn get_recipe(store: &dyn Store, id: Id) -> Result<Recipe, Error> {
    store
        .get_recipe(id)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.new("No recipe exists with specified id"))
}

/// Fetches a recipe the session may modify: its own, or any with
/// `ManageAllRecipes`.
pub async fn get_recipe_mut(
    store: &dyn Store,
    session: &SessionData,
    id: Id,
) -> Result<Recipe, Error> {
    let recipe = get_recipe(store, id).await?;

    session.authenticate(ActionType::ManageOwnRecipes)?;

    match session.authenticate(ActionType::ManageAllRecipes) {
        Ok(_) => Ok(recipe),
        Err(_) => {
            if recipe.author_id != session.user_id {
                Err(ErrorKind::Permission.default())
            } else {
                Ok(recipe)
            }
        }
    }
}

pub async fn create_recipe(
    store: &dyn Store,
    session: &SessionData,
    form: RecipeForm,
) -> Result<Recipe, Error> {
    session.authenticate(ActionType::CreateRecipes)?;

    let draft = validate_recipe(form, FormMode::Create)?;
    check_references(store, &draft).await?;

    store.create_recipe(session.user_id, &draft).await
}

/// Replaces the recipe contents; tags and ingredients are swapped wholesale.
pub async fn update_recipe(
    store: &dyn Store,
    session: &SessionData,
    id: Id,
    form: RecipeForm,
) -> Result<Recipe, Error> {
    let recipe = get_recipe_mut(store, session, id).await?;

    let draft = validate_recipe(form, FormMode::Update)?;
    check_references(store, &draft).await?;

    let updated = store
        .update_recipe(recipe.id, &draft)
        .await?
        .ok_or_else(|| ErrorKind::NotFound.new("No recipe exists with specified id"))?;

    log::info!("User {} updated recipe {}", session.user_id, updated.id);
    Ok(updated)
}

pub async fn delete_recipe(store: &dyn Store, session: &SessionData, id: Id) -> Result<(), Error> {
    let recipe = get_recipe_mut(store, session, id).await?;

    if !store.delete_recipe(recipe.id).await? {
        return Err(ErrorKind::NotFound.new("No recipe exists with specified id"));
    }

    log::info!("User {} deleted recipe {}", session.user_id, recipe.id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        memory::MemoryStore,
        schema::{NewIngredient, NewTag, NewUser, UserRole},
        validation::IngredientEntry,
    };

    async fn session(store: &MemoryStore, name: &str, role: UserRole) -> SessionData {
        let user = store
            .create_user(NewUser {
                email: format!("{name}@example.com"),
                username: name.to_owned(),
                first_name: name.to_owned(),
                last_name: "Tester".to_owned(),
                password: String::new(),
                role,
            })
            .await
            .unwrap();
        SessionData {
            user_id: user.id,
            role,
        }
    }

    async fn catalog(store: &MemoryStore) -> (Id, Id, Id) {
        let tag = store
            .create_tag(NewTag {
                name: "Lunch".to_owned(),
                color: "#8775D2".to_owned(),
                slug: "lunch".to_owned(),
            })
            .await
            .unwrap();
        let flour = store
            .create_ingredient(NewIngredient {
                name: "flour".to_owned(),
                measurement_unit: "g".to_owned(),
            })
            .await
            .unwrap();
        let milk = store
            .create_ingredient(NewIngredient {
                name: "milk".to_owned(),
                measurement_unit: "ml".to_owned(),
            })
            .await
            .unwrap();
        (tag.id, flour.id, milk.id)
    }

    fn form(tag: Id, ingredient: Id, amount: i64) -> RecipeForm {
        RecipeForm {
            name: Some("Crepes".to_owned()),
            image: Some("img".to_owned()),
            text: Some("Thin".to_owned()),
            cooking_time: Some(20),
            tags: vec![tag],
            ingredients: vec![IngredientEntry {
                id: ingredient,
                amount,
            }],
        }
    }

    #[tokio::test]
    async fn update_replaces_ingredients() {
        let store = MemoryStore::new();
        let author = session(&store, "author", UserRole::User).await;
        let (tag, flour, milk) = catalog(&store).await;

        let recipe = create_recipe(&store, &author, form(tag, flour, 100))
            .await
            .unwrap();
        update_recipe(&store, &author, recipe.id, form(tag, milk, 250))
            .await
            .unwrap();

        let amounts = store.list_recipe_ingredients(recipe.id).await.unwrap();
        assert_eq!(amounts.len(), 1);
        assert_eq!((amounts[0].id, amounts[0].amount), (milk, 250));
    }

    #[tokio::test]
    async fn strangers_cannot_modify_but_admins_can() {
        let store = MemoryStore::new();
        let author = session(&store, "author", UserRole::User).await;
        let stranger = session(&store, "stranger", UserRole::User).await;
        let admin = session(&store, "admin", UserRole::Admin).await;
        let (tag, flour, _) = catalog(&store).await;

        let recipe = create_recipe(&store, &author, form(tag, flour, 100))
            .await
            .unwrap();

        let error = delete_recipe(&store, &stranger, recipe.id).await.unwrap_err();
        assert_eq!(error.kind, ErrorKind::Permission);

        delete_recipe(&store, &admin, recipe.id).await.unwrap();
        let gone = get_recipe(&store, recipe.id).await.unwrap_err();
        assert_eq!(gone.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn unknown_references_are_field_errors() {
        let store = MemoryStore::new();
        let author = session(&store, "author", UserRole::User).await;
        let (tag, flour, _) = catalog(&store).await;

        let error = create_recipe(&store, &author, form(tag + 100, flour, 1))
            .await
            .unwrap_err();
        assert_eq!(error.field.as_deref(), Some("tags"));

        let error = create_recipe(&store, &author, form(tag, flour + 100, 1))
            .await
            .unwrap_err();
        assert_eq!(error.field.as_deref(), Some("ingredients"));
    }
}
