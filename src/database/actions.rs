mod follows;
mod ingredients;
mod memberships;
mod recipes;
mod tags;
mod users;

pub use follows::*;
pub use ingredients::*;
pub use memberships::*;
pub use recipes::*;
pub use tags::*;
pub use users::*;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::Error,
    pagination::PageRequest,
    schema::{
        CartIngredient, Id, Ingredient, Membership, NewIngredient, NewTag, NewUser, Recipe,
        RecipeDraft, RecipeFilter, RecipeIngredient, Tag, User,
    },
    store::Store,
};

/// `Store` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        register_user(user, &self.pool).await
    }

    async fn get_user(&self, id: Id) -> Result<Option<User>, Error> {
        get_user_by_id(&self.pool, id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        get_user(&self.pool, email).await
    }

    async fn list_users(&self, page: &PageRequest) -> Result<(Vec<User>, i64), Error> {
        fetch_users(page, &self.pool).await
    }

    async fn set_password(&self, id: Id, password: &str) -> Result<(), Error> {
        update_user_password(id, password, &self.pool).await
    }

    async fn delete_user(&self, id: Id) -> Result<bool, Error> {
        delete_user(id, &self.pool).await
    }

    async fn create_tag(&self, tag: NewTag) -> Result<Tag, Error> {
        create_tag(tag, &self.pool).await
    }

    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, Error> {
        get_tag(id, &self.pool).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        list_tags(&self.pool).await
    }

    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, Error> {
        list_recipe_tags(&self.pool, recipe_id).await
    }

    async fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient, Error> {
        create_ingredient(ingredient, &self.pool).await
    }

    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, Error> {
        get_ingredient(id, &self.pool).await
    }

    async fn search_ingredients(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, Error> {
        search_ingredients(prefix, &self.pool).await
    }

    async fn create_recipe(&self, author_id: Id, draft: &RecipeDraft) -> Result<Recipe, Error> {
        create_recipe(author_id, draft, &self.pool).await
    }

    async fn update_recipe(&self, id: Id, draft: &RecipeDraft) -> Result<Option<Recipe>, Error> {
        update_recipe(id, draft, &self.pool).await
    }

    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, Error> {
        get_recipe(id, &self.pool).await
    }

    async fn delete_recipe(&self, id: Id) -> Result<bool, Error> {
        delete_recipe(id, &self.pool).await
    }

    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        page: &PageRequest,
    ) -> Result<(Vec<Recipe>, i64), Error> {
        fetch_recipes(filter, viewer, page, &self.pool).await
    }

    async fn list_recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<RecipeIngredient>, Error> {
        list_recipe_ingredients(&self.pool, recipe_id).await
    }

    async fn list_author_recipes(
        &self,
        author_id: Id,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, Error> {
        list_author_recipes(author_id, limit, &self.pool).await
    }

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, Error> {
        count_author_recipes(author_id, &self.pool).await
    }

    async fn add_membership(
        &self,
        kind: Membership,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        add_membership(kind, user_id, recipe_id, &self.pool).await
    }

    async fn remove_membership(
        &self,
        kind: Membership,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        remove_membership(kind, user_id, recipe_id, &self.pool).await
    }

    async fn has_membership(
        &self,
        kind: Membership,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        has_membership(kind, user_id, recipe_id, &self.pool).await
    }

    async fn list_cart_ingredients(&self, user_id: Id) -> Result<Vec<CartIngredient>, Error> {
        list_cart_ingredients(user_id, &self.pool).await
    }

    async fn follow(&self, follower_id: Id, author_id: Id) -> Result<bool, Error> {
        add_follow(follower_id, author_id, &self.pool).await
    }

    async fn unfollow(&self, follower_id: Id, author_id: Id) -> Result<bool, Error> {
        remove_follow(follower_id, author_id, &self.pool).await
    }

    async fn is_following(&self, follower_id: Id, author_id: Id) -> Result<bool, Error> {
        is_following(follower_id, author_id, &self.pool).await
    }

    async fn list_following(
        &self,
        follower_id: Id,
        page: &PageRequest,
    ) -> Result<(Vec<User>, i64), Error> {
        fetch_following(follower_id, page, &self.pool).await
    }
}
