use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{
    error::{Error, ErrorKind, QueryError},
    pagination::PageRequest,
    relations::{relations_of, Dependent, Entity, OnDelete},
    schema::{
        CartIngredient, Id, Ingredient, Membership, NewIngredient, NewTag, NewUser, Recipe,
        RecipeDraft, RecipeFilter, RecipeIngredient, Tag, User,
    },
    store::Store,
};

/// A row that references other rows by id.
trait Row {
    fn id(&self) -> Id;
    fn column(&self, name: &str) -> Option<Id>;
}

#[derive(Debug, Clone)]
struct AmountRow {
    id: Id,
    recipe_id: Id,
    ingredient_id: Id,
    amount: i32,
}

#[derive(Debug, Clone)]
struct TagLink {
    id: Id,
    recipe_id: Id,
    tag_id: Id,
}

#[derive(Debug, Clone)]
struct MemberRow {
    id: Id,
    user_id: Id,
    recipe_id: Id,
}

#[derive(Debug, Clone)]
struct FollowRow {
    id: Id,
    follower_id: Id,
    author_id: Id,
}

impl Row for Recipe {
    fn id(&self) -> Id {
        self.id
    }

    fn column(&self, name: &str) -> Option<Id> {
        match name {
            "author_id" => Some(self.author_id),
            _ => None,
        }
    }
}

impl Row for AmountRow {
    fn id(&self) -> Id {
        self.id
    }

    fn column(&self, name: &str) -> Option<Id> {
        match name {
            "recipe_id" => Some(self.recipe_id),
            "ingredient_id" => Some(self.ingredient_id),
            _ => None,
        }
    }
}

impl Row for TagLink {
    fn id(&self) -> Id {
        self.id
    }

    fn column(&self, name: &str) -> Option<Id> {
        match name {
            "recipe_id" => Some(self.recipe_id),
            "tag_id" => Some(self.tag_id),
            _ => None,
        }
    }
}

impl Row for MemberRow {
    fn id(&self) -> Id {
        self.id
    }

    fn column(&self, name: &str) -> Option<Id> {
        match name {
            "user_id" => Some(self.user_id),
            "recipe_id" => Some(self.recipe_id),
            _ => None,
        }
    }
}

impl Row for FollowRow {
    fn id(&self) -> Id {
        self.id
    }

    fn column(&self, name: &str) -> Option<Id> {
        match name {
            "follower_id" => Some(self.follower_id),
            "author_id" => Some(self.author_id),
            _ => None,
        }
    }
}

fn referencing<T: Row>(rows: &[T], column: &str, id: Id) -> Vec<Id> {
    rows.iter()
        .filter(|row| row.column(column) == Some(id))
        .map(|row| row.id())
        .collect()
}

fn page_of<T: Clone>(rows: &[T], page: &PageRequest) -> (Vec<T>, i64) {
    let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(page.limit).unwrap_or(0);
    let slice = rows.iter().skip(offset).take(limit).cloned().collect();
    (slice, rows.len() as i64)
}

fn violation(kind: ErrorKind, constraint: &str) -> Error {
    QueryError::violation(kind, constraint).into()
}

#[derive(Default)]
struct State {
    sequence: Id,
    users: Vec<User>,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    amounts: Vec<AmountRow>,
    recipe_tags: Vec<TagLink>,
    favorites: Vec<MemberRow>,
    shopping_cart: Vec<MemberRow>,
    follows: Vec<FollowRow>,
}

impl State {
    fn next_id(&mut self) -> Id {
        self.sequence += 1;
        self.sequence
    }

    fn members(&self, kind: Membership) -> &Vec<MemberRow> {
        match kind {
            Membership::Favorite => &self.favorites,
            Membership::ShoppingCart => &self.shopping_cart,
        }
    }

    fn members_mut(&mut self, kind: Membership) -> &mut Vec<MemberRow> {
        match kind {
            Membership::Favorite => &mut self.favorites,
            Membership::ShoppingCart => &mut self.shopping_cart,
        }
    }

    fn is_member(&self, kind: Membership, user_id: Id, recipe_id: Id) -> bool {
        self.members(kind)
            .iter()
            .any(|m| m.user_id == user_id && m.recipe_id == recipe_id)
    }

    fn exists(&self, entity: Entity, id: Id) -> bool {
        match entity {
            Entity::User => self.users.iter().any(|u| u.id == id),
            Entity::Recipe => self.recipes.iter().any(|r| r.id == id),
            Entity::Tag => self.tags.iter().any(|t| t.id == id),
            Entity::Ingredient => self.ingredients.iter().any(|i| i.id == id),
        }
    }

    fn dependent_rows(&self, dependent: Dependent, column: &str, id: Id) -> Vec<Id> {
        match dependent {
            Dependent::Recipe => referencing(&self.recipes, column, id),
            Dependent::IngredientAmount => referencing(&self.amounts, column, id),
            Dependent::RecipeTag => referencing(&self.recipe_tags, column, id),
            Dependent::Favorite => referencing(&self.favorites, column, id),
            Dependent::ShoppingCartEntry => referencing(&self.shopping_cart, column, id),
            Dependent::Follow => referencing(&self.follows, column, id),
        }
    }

    fn drop_rows(&mut self, dependent: Dependent, ids: &[Id]) {
        match dependent {
            Dependent::Recipe => self.recipes.retain(|r| !ids.contains(&r.id)),
            Dependent::IngredientAmount => self.amounts.retain(|r| !ids.contains(&r.id)),
            Dependent::RecipeTag => self.recipe_tags.retain(|r| !ids.contains(&r.id)),
            Dependent::Favorite => self.favorites.retain(|r| !ids.contains(&r.id)),
            Dependent::ShoppingCartEntry => self.shopping_cart.retain(|r| !ids.contains(&r.id)),
            Dependent::Follow => self.follows.retain(|r| !ids.contains(&r.id)),
        }
    }

    fn ensure_deletable(&self, entity: Entity, id: Id) -> Result<(), Error> {
        for relation in relations_of(entity) {
            let rows = self.dependent_rows(relation.dependent, relation.column, id);
            match relation.on_delete {
                OnDelete::Restrict if !rows.is_empty() => {
                    log::warn!(
                        "Refusing to delete {} {id}: referenced from {}",
                        entity.table(),
                        relation.dependent.table()
                    );
                    return Err(ErrorKind::Conflict.new("Object is still in use"));
                }
                OnDelete::Restrict => {}
                OnDelete::Cascade => {
                    if let Some(parent) = relation.dependent.as_parent() {
                        for row in rows {
                            self.ensure_deletable(parent, row)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn cascade(&mut self, entity: Entity, id: Id) {
        for relation in relations_of(entity) {
            let rows = self.dependent_rows(relation.dependent, relation.column, id);
            if let Some(parent) = relation.dependent.as_parent() {
                for row in &rows {
                    self.cascade(parent, *row);
                }
            }
            self.drop_rows(relation.dependent, &rows);
        }
    }

    /// Removes the row and applies the delete policy of every relation
    /// pointing at it. Nothing changes when a restricting row exists.
    fn delete(&mut self, entity: Entity, id: Id) -> Result<bool, Error> {
        if !self.exists(entity, id) {
            return Ok(false);
        }
        self.ensure_deletable(entity, id)?;
        self.cascade(entity, id);

        match entity {
            Entity::User => self.users.retain(|u| u.id != id),
            Entity::Recipe => self.recipes.retain(|r| r.id != id),
            Entity::Tag => self.tags.retain(|t| t.id != id),
            Entity::Ingredient => self.ingredients.retain(|i| i.id != id),
        }
        Ok(true)
    }

    fn check_draft(&self, draft: &RecipeDraft) -> Result<(), Error> {
        if draft.cooking_time < 1 {
            return Err(violation(ErrorKind::Validation, "recipes_cooking_time_check"));
        }
        for portion in &draft.ingredients {
            if portion.amount < 1 {
                return Err(violation(
                    ErrorKind::Validation,
                    "ingredient_amounts_amount_check",
                ));
            }
            if !self.exists(Entity::Ingredient, portion.ingredient_id) {
                return Err(violation(
                    ErrorKind::Conflict,
                    "ingredient_amounts_ingredient_id_fkey",
                ));
            }
        }
        for (index, portion) in draft.ingredients.iter().enumerate() {
            if draft.ingredients[..index]
                .iter()
                .any(|p| p.ingredient_id == portion.ingredient_id)
            {
                return Err(violation(
                    ErrorKind::Conflict,
                    "ingredient_amounts_recipe_ingredient_key",
                ));
            }
        }
        for (index, tag_id) in draft.tags.iter().enumerate() {
            if !self.exists(Entity::Tag, *tag_id) {
                return Err(violation(ErrorKind::Conflict, "recipe_tags_tag_id_fkey"));
            }
            if draft.tags[..index].contains(tag_id) {
                return Err(violation(ErrorKind::Conflict, "recipe_tags_recipe_tag_key"));
            }
        }
        Ok(())
    }

    fn replace_links(&mut self, recipe_id: Id, draft: &RecipeDraft) {
        self.recipe_tags.retain(|l| l.recipe_id != recipe_id);
        self.amounts.retain(|a| a.recipe_id != recipe_id);

        for tag_id in &draft.tags {
            let id = self.next_id();
            self.recipe_tags.push(TagLink {
                id,
                recipe_id,
                tag_id: *tag_id,
            });
        }
        for portion in &draft.ingredients {
            let id = self.next_id();
            self.amounts.push(AmountRow {
                id,
                recipe_id,
                ingredient_id: portion.ingredient_id,
                amount: portion.amount,
            });
        }
    }

    fn matches(&self, recipe: &Recipe, filter: &RecipeFilter, viewer: Option<Id>) -> bool {
        if filter.author.is_some_and(|author| recipe.author_id != author) {
            return false;
        }
        if !filter.tags.is_empty() {
            let tagged = self
                .recipe_tags
                .iter()
                .filter(|l| l.recipe_id == recipe.id)
                .filter_map(|l| self.tags.iter().find(|t| t.id == l.tag_id))
                .any(|t| filter.tags.contains(&t.slug));
            if !tagged {
                return false;
            }
        }
        if let Some(viewer) = viewer {
            if filter.is_favorited && !self.is_member(Membership::Favorite, viewer, recipe.id) {
                return false;
            }
            if filter.is_in_shopping_cart
                && !self.is_member(Membership::ShoppingCart, viewer, recipe.id)
            {
                return false;
            }
        }
        true
    }

    fn newest_first(&self, mut recipes: Vec<Recipe>) -> Vec<Recipe> {
        recipes.sort_by(|a, b| (b.pub_date, b.id).cmp(&(a.pub_date, a.id)));
        recipes
    }
}

/// In-process `Store` holding every table in memory.
///
/// Enforces the same unique, check and foreign key rules as the SQL schema
/// and reports violations with the same errors.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        let mut state = self.state.lock().await;
        if state.users.iter().any(|u| u.email == user.email) {
            return Err(violation(ErrorKind::Conflict, "users_email_key"));
        }
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(violation(ErrorKind::Conflict, "users_username_key"));
        }

        let row = User {
            id: state.next_id(),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            password: user.password,
            role: user.role,
        };
        state.users.push(row.clone());
        Ok(row)
    }

    async fn get_user(&self, id: Id) -> Result<Option<User>, Error> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let state = self.state.lock().await;
        let email = email.to_lowercase();
        Ok(state
            .users
            .iter()
            .find(|u| u.email.to_lowercase() == email)
            .cloned())
    }

    async fn list_users(&self, page: &PageRequest) -> Result<(Vec<User>, i64), Error> {
        let state = self.state.lock().await;
        Ok(page_of(&state.users, page))
    }

    async fn set_password(&self, id: Id, password: &str) -> Result<(), Error> {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            user.password = password.to_owned();
        }
        Ok(())
    }

    async fn delete_user(&self, id: Id) -> Result<bool, Error> {
        self.state.lock().await.delete(Entity::User, id)
    }

    async fn create_tag(&self, tag: NewTag) -> Result<Tag, Error> {
        let mut state = self.state.lock().await;
        if state.tags.iter().any(|t| t.slug == tag.slug) {
            return Err(violation(ErrorKind::Conflict, "tags_slug_key"));
        }

        let row = Tag {
            id: state.next_id(),
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        };
        state.tags.push(row.clone());
        Ok(row)
    }

    async fn get_tag(&self, id: Id) -> Result<Option<Tag>, Error> {
        let state = self.state.lock().await;
        Ok(state.tags.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        Ok(self.state.lock().await.tags.clone())
    }

    async fn list_recipe_tags(&self, recipe_id: Id) -> Result<Vec<Tag>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .recipe_tags
            .iter()
            .filter(|l| l.recipe_id == recipe_id)
            .filter_map(|l| state.tags.iter().find(|t| t.id == l.tag_id))
            .cloned()
            .collect())
    }

    async fn create_ingredient(&self, ingredient: NewIngredient) -> Result<Ingredient, Error> {
        let mut state = self.state.lock().await;
        if state.ingredients.iter().any(|i| {
            i.name == ingredient.name && i.measurement_unit == ingredient.measurement_unit
        }) {
            return Err(violation(
                ErrorKind::Conflict,
                "ingredients_name_measurement_unit_key",
            ));
        }

        let row = Ingredient {
            id: state.next_id(),
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        };
        state.ingredients.push(row.clone());
        Ok(row)
    }

    async fn get_ingredient(&self, id: Id) -> Result<Option<Ingredient>, Error> {
        let state = self.state.lock().await;
        Ok(state.ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn search_ingredients(&self, prefix: Option<&str>) -> Result<Vec<Ingredient>, Error> {
        let state = self.state.lock().await;
        let prefix = prefix.unwrap_or("").to_lowercase();
        let mut found: Vec<Ingredient> = state
            .ingredients
            .iter()
            .filter(|i| i.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        found.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(found)
    }

    async fn create_recipe(&self, author_id: Id, draft: &RecipeDraft) -> Result<Recipe, Error> {
        let mut state = self.state.lock().await;
        if !state.exists(Entity::User, author_id) {
            return Err(violation(ErrorKind::Conflict, "recipes_author_id_fkey"));
        }
        state.check_draft(draft)?;

        // keep pub_date monotonic so insertion order breaks no ties
        let now = Utc::now();
        let pub_date = state
            .recipes
            .iter()
            .map(|r| r.pub_date)
            .max()
            .map_or(now, |latest| latest.max(now));

        let recipe = Recipe {
            id: state.next_id(),
            author_id,
            name: draft.name.clone(),
            image: draft.image.clone().unwrap_or_default(),
            text: draft.text.clone(),
            cooking_time: draft.cooking_time,
            pub_date,
        };
        state.recipes.push(recipe.clone());
        state.replace_links(recipe.id, draft);
        Ok(recipe)
    }

    async fn update_recipe(&self, id: Id, draft: &RecipeDraft) -> Result<Option<Recipe>, Error> {
        let mut state = self.state.lock().await;
        if !state.exists(Entity::Recipe, id) {
            return Ok(None);
        }
        state.check_draft(draft)?;

        let Some(recipe) = state.recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        recipe.name = draft.name.clone();
        if let Some(image) = &draft.image {
            recipe.image = image.clone();
        }
        recipe.text = draft.text.clone();
        recipe.cooking_time = draft.cooking_time;
        let updated = recipe.clone();

        state.replace_links(id, draft);
        Ok(Some(updated))
    }

    async fn get_recipe(&self, id: Id) -> Result<Option<Recipe>, Error> {
        let state = self.state.lock().await;
        Ok(state.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn delete_recipe(&self, id: Id) -> Result<bool, Error> {
        self.state.lock().await.delete(Entity::Recipe, id)
    }

    async fn fetch_recipes(
        &self,
        filter: &RecipeFilter,
        viewer: Option<Id>,
        page: &PageRequest,
    ) -> Result<(Vec<Recipe>, i64), Error> {
        let state = self.state.lock().await;
        let matching = state
            .recipes
            .iter()
            .filter(|r| state.matches(r, filter, viewer))
            .cloned()
            .collect();
        Ok(page_of(&state.newest_first(matching), page))
    }

    async fn list_recipe_ingredients(&self, recipe_id: Id) -> Result<Vec<RecipeIngredient>, Error> {
        let state = self.state.lock().await;
        Ok(state
            .amounts
            .iter()
            .filter(|a| a.recipe_id == recipe_id)
            .filter_map(|a| {
                state
                    .ingredients
                    .iter()
                    .find(|i| i.id == a.ingredient_id)
                    .map(|i| RecipeIngredient {
                        id: i.id,
                        name: i.name.clone(),
                        measurement_unit: i.measurement_unit.clone(),
                        amount: a.amount,
                    })
            })
            .collect())
    }

    async fn list_author_recipes(
        &self,
        author_id: Id,
        limit: Option<i64>,
    ) -> Result<Vec<Recipe>, Error> {
        let state = self.state.lock().await;
        let own = state
            .recipes
            .iter()
            .filter(|r| r.author_id == author_id)
            .cloned()
            .collect();
        let limit = limit.map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(0));
        Ok(state.newest_first(own).into_iter().take(limit).collect())
    }

    async fn count_author_recipes(&self, author_id: Id) -> Result<i64, Error> {
        let state = self.state.lock().await;
        Ok(state.recipes.iter().filter(|r| r.author_id == author_id).count() as i64)
    }

    async fn add_membership(
        &self,
        kind: Membership,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        if !state.exists(Entity::User, user_id) || !state.exists(Entity::Recipe, recipe_id) {
            return Err(violation(
                ErrorKind::Conflict,
                &format!("{}_recipe_id_fkey", kind.table()),
            ));
        }
        if state.is_member(kind, user_id, recipe_id) {
            return Ok(false);
        }

        let id = state.next_id();
        state.members_mut(kind).push(MemberRow {
            id,
            user_id,
            recipe_id,
        });
        Ok(true)
    }

    async fn remove_membership(
        &self,
        kind: Membership,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        let members = state.members_mut(kind);
        let before = members.len();
        members.retain(|m| !(m.user_id == user_id && m.recipe_id == recipe_id));
        Ok(members.len() < before)
    }

    async fn has_membership(
        &self,
        kind: Membership,
        user_id: Id,
        recipe_id: Id,
    ) -> Result<bool, Error> {
        Ok(self.state.lock().await.is_member(kind, user_id, recipe_id))
    }

    async fn list_cart_ingredients(&self, user_id: Id) -> Result<Vec<CartIngredient>, Error> {
        let state = self.state.lock().await;
        let mut rows = Vec::new();
        for entry in state.shopping_cart.iter().filter(|e| e.user_id == user_id) {
            for amount in state.amounts.iter().filter(|a| a.recipe_id == entry.recipe_id) {
                if let Some(ingredient) = state.ingredients.iter().find(|i| i.id == amount.ingredient_id)
                {
                    rows.push(CartIngredient {
                        name: ingredient.name.clone(),
                        measurement_unit: ingredient.measurement_unit.clone(),
                        amount: amount.amount,
                    });
                }
            }
        }
        Ok(rows)
    }

    async fn follow(&self, follower_id: Id, author_id: Id) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        if !state.exists(Entity::User, follower_id) || !state.exists(Entity::User, author_id) {
            return Err(violation(ErrorKind::Conflict, "follows_author_id_fkey"));
        }
        if follower_id == author_id {
            return Err(violation(ErrorKind::Validation, "follows_no_self_follow"));
        }
        if state
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.author_id == author_id)
        {
            return Ok(false);
        }

        let id = state.next_id();
        state.follows.push(FollowRow {
            id,
            follower_id,
            author_id,
        });
        Ok(true)
    }

    async fn unfollow(&self, follower_id: Id, author_id: Id) -> Result<bool, Error> {
        let mut state = self.state.lock().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|f| !(f.follower_id == follower_id && f.author_id == author_id));
        Ok(state.follows.len() < before)
    }

    async fn is_following(&self, follower_id: Id, author_id: Id) -> Result<bool, Error> {
        let state = self.state.lock().await;
        Ok(state
            .follows
            .iter()
            .any(|f| f.follower_id == follower_id && f.author_id == author_id))
    }

    async fn list_following(
        &self,
        follower_id: Id,
        page: &PageRequest,
    ) -> Result<(Vec<User>, i64), Error> {
        let state = self.state.lock().await;
        let authors: Vec<User> = state
            .follows
            .iter()
            .filter(|f| f.follower_id == follower_id)
            .filter_map(|f| state.users.iter().find(|u| u.id == f.author_id))
            .cloned()
            .collect();
        Ok(page_of(&authors, page))
    }
}
