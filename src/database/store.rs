use async_trait::async_trait;

use super::{
    error::Error,
    pagination::PageRequest,
    schema::{
        CartIngredient, Id, Ingredient, Membership, NewIngredient, NewTag, NewUser, Recipe,
        RecipeDraft, RecipeFilter, RecipeIngredient, Tag, User,
    },
};

/// Repository over every table of the schema.
///
/// Uniqueness is left to the storage layer: inserts that would duplicate a
/// membership or follow report `false` instead of failing, and inserts that
/// would duplicate a user, tag or ingredient fail with a `Conflict` scoped to
/// the offending field.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;
    async fn get_user(&self, id: Id) -> Result<Option<User>, Error>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;
    async fn list_users(&self, page: &PageRequest) -> Result<(Vec<User>, i64), Error>;
    async fn set_password(&self, id: Id, password: &str) -> Result<(), Error>;
    /// Removes the user together with everything that depends on them.
    async fn delete_user(&self, id: Id) -> Result<bool, Error>;

    async fn create_tag(&self, tag: NewTag) -> Result<Tag, Error>;
    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, Error>;
    async fn list_tags(&self) -> Result<Vec<Tag>, Error>;
    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, Error>;

    async fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient, Error>;
    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, Error>;
    /// Case-insensitive name prefix search, ordered by name.
    async fn search_ingredients(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, Error>;

    async fn create_recipe(&self, author_id: Id, draft: &RecipeDraft) -> Result<Recipe, Error>;
    /// Replaces the recipe fields, its tags and its ingredient amounts.
    async fn update_recipe(&self, id: Id, draft: &RecipeDraft) -> Result<Option<Recipe>, Error>;
    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, Error>;
    async fn delete_recipe(&self, id: Id) -> Result<bool, Error>;
    /// Newest first. Membership filters apply only when `viewer` is set.
    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        page: &PageRequest,
    ) -> Result<(Vec<Recipe>, i64), Error>;
    async fn list_recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<RecipeIngredient>, Error>;
    async fn list_author_recipes(&self, author_id: Id, limit: Option<i64>)
        -> Result<Vec<Recipe>, Error>;
    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, Error>;

    async fn add_membership(&self, kind: Membership, user_id: Id, recipe_id: Id)
        -> Result<bool, Error>;
    async fn remove_membership(
        &self,
        kind: Membership,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error>;
    async fn has_membership(&self, kind: Membership, user_id: Id, recipe_id: Id)
        -> Result<bool, Error>;
    /// Ingredient rows of every recipe in the user's cart, in cart order.
    async fn list_cart_ingredients(&self, user_id: Id) -> Result<Vec<CartIngredient>, Error>;

    async fn follow(&self, follower_id: Id, author_id: Id) -> Result<bool, Error>;
    async fn unfollow(&self, follower_id: Id, author_id: Id) -> Result<bool, Error>;
    async fn is_following(&self, follower_id: Id, author_id: Id) -> Result<bool, Error>;
    async fn list_following(
        &self,
        follower_id: Id,
        page: &PageRequest,
    ) -> Result<(Vec<User>, i64), Error>;
}
