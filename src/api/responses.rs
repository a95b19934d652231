//! JSON shapes returned by the API.

use chrono::{DateTime, Utc};
use serde::Serialize;
use warp::{
    http::StatusCode,
    reply::{self, Reply, Response},
};

use crate::{
    error::{Error, ErrorKind},
    schema::{Id, Membership, Recipe, RecipeIngredient, Tag, User},
    store::Store,
};

pub fn json<T: Serialize>(body: &T, status: StatusCode) -> Response {
    reply::with_status(reply::json(body), status).into_response()
}

pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Serialize, Debug, Clone)]
pub struct UserView {
    pub email: String,
    pub id: Id,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

pub async fn user_view(
    store: &dyn Store,
    user: User,
    viewer: Option<Id>,
) -> Result<UserView, Error> {
    let is_subscribed = match viewer {
        Some(viewer) => store.is_following(viewer, user.id).await?,
        None => false,
    };

    Ok(UserView {
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
    })
}

#[derive(Serialize, Debug, Clone)]
pub struct RecipeView {
    pub id: Id,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: Id,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeSummary {
    fn from(value: Recipe) -> Self {
        Self {
            id: value.id,
            name: value.name,
            image: value.image,
            cooking_time: value.cooking_time,
        }
    }
}

#[derive(Serialize, Debug, Clone)]
pub struct SubscriptionView {
    #[serde(flatten)]
    pub author: UserView,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeShape {
    Full,
    Short,
}

/// Operations that answer with a recipe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecipeAction {
    List,
    Retrieve,
    Create,
    Update,
    Favorite,
    ShoppingCart,
    Subscription,
}

impl RecipeAction {
    pub fn shape(self) -> RecipeShape {
        match self {
            RecipeAction::List
            | RecipeAction::Retrieve
            | RecipeAction::Create
            | RecipeAction::Update => RecipeShape::Full,
            RecipeAction::Favorite | RecipeAction::ShoppingCart | RecipeAction::Subscription => {
                RecipeShape::Short
            }
        }
    }
}

#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum RecipeResponse {
    Full(Box<RecipeView>),
    Short(RecipeSummary),
}

async fn full_view(
    store: &dyn Store,
    recipe: Recipe,
    viewer: Option<Id>,
) -> Result<RecipeView, Error> {
    let author = store.get_user(recipe.author_id).await?.ok_or_else(|| {
        log::error!("Recipe {} points at missing author {}", recipe.id, recipe.author_id);
        ErrorKind::Internal.default()
    })?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => (
            store
                .has_membership(Membership::Favorite, viewer, recipe.id)
                .await?,
            store
                .has_membership(Membership::ShoppingCart, viewer, recipe.id)
                .await?,
        ),
        None => (false, false),
    };

    Ok(RecipeView {
        id: recipe.id,
        tags: store.list_recipe_tags(recipe.id).await?,
        author: user_view(store, author, viewer).await?,
        ingredients: store.list_recipe_ingredients(recipe.id).await?,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: recipe.image,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        pub_date: recipe.pub_date,
    })
}

pub async fn shape_recipe(
    store: &dyn Store,
    recipe: Recipe,
    viewer: Option<Id>,
    action: RecipeAction,
) -> Result<RecipeResponse, Error> {
    match action.shape() {
        RecipeShape::Full => Ok(RecipeResponse::Full(Box::new(
            full_view(store, recipe, viewer).await?,
        ))),
        RecipeShape::Short => Ok(RecipeResponse::Short(recipe.into())),
    }
}

/// An author as seen from their follower, with a preview of their recipes.
pub async fn subscription_view(
    store: &dyn Store,
    author: User,
    viewer: Id,
    recipes_limit: Option<i64>,
) -> Result<SubscriptionView, Error> {
    let recipes = store
        .list_author_recipes(author.id, recipes_limit.map(|limit| limit.max(0)))
        .await?;
    let recipes_count = store.count_author_recipes(author.id).await?;

    Ok(SubscriptionView {
        author: user_view(store, author, Some(viewer)).await?,
        recipes: recipes.into_iter().map(RecipeSummary::from).collect(),
        recipes_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_actions_answer_short() {
        assert_eq!(RecipeAction::Favorite.shape(), RecipeShape::Short);
        assert_eq!(RecipeAction::ShoppingCart.shape(), RecipeShape::Short);
        assert_eq!(RecipeAction::Subscription.shape(), RecipeShape::Short);
        assert_eq!(RecipeAction::List.shape(), RecipeShape::Full);
        assert_eq!(RecipeAction::Update.shape(), RecipeShape::Full);
    }

    #[test]
    fn summary_keeps_four_fields() {
        let recipe = Recipe {
            id: 4,
            author_id: 1,
            name: "Soup".to_owned(),
            image: "img".to_owned(),
            text: "Boil".to_owned(),
            cooking_time: 30,
            pub_date: Utc::now(),
        };
        let body = serde_json::to_value(RecipeResponse::Short(recipe.into())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "id": 4, "name": "Soup", "image": "img", "cooking_time": 30 })
        );
    }
}
