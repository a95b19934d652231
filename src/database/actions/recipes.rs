use crate::{
    error::{Error, QueryError},
    pagination::PageRequest,
    schema::{Id, Membership, Recipe, RecipeDraft, RecipeFilter, RecipeIngredient},
};

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

fn push_recipe_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    filter: &RecipeFilter,
    viewer: Option<Id>,
) {
    if let Some(author) = filter.author {
        query.push(" AND r.author_id = ").push_bind(author);
    }

    if !filter.tags.is_empty() {
        query
            .push(
                " AND EXISTS (SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id WHERE rt.recipe_id = r.id AND t.slug = ANY(",
            )
            .push_bind(filter.tags.clone())
            .push("))");
    }

    if let Some(viewer) = viewer {
        let memberships = [
            (filter.is_favorited, Membership::Favorite),
            (filter.is_in_shopping_cart, Membership::ShoppingCart),
        ];
        for (_, kind) in memberships.iter().filter(|(enabled, _)| *enabled) {
            query
                .push(format!(
                    " AND EXISTS (SELECT 1 FROM {} m WHERE m.recipe_id = r.id AND m.user_id = ",
                    kind.table()
                ))
                .push_bind(viewer)
                .push(")");
        }
    }
}

pub async fn fetch_recipes(
    filter: &RecipeFilter,
    viewer: Option<Id>,
    page: &PageRequest,
    pool: &Pool<Postgres>,
) -> Result<(Vec<Recipe>, i64), Error> {
    let mut query: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT r.* FROM recipes r WHERE TRUE");
    push_recipe_filters(&mut query, filter, viewer);
    query
        .push(" ORDER BY r.pub_date DESC, r.id DESC LIMIT ")
        .push_bind(page.limit)
        .push(" OFFSET ")
        .push_bind(page.offset());

    let rows: Vec<Recipe> = query
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(QueryError::from)?;

    let mut count: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM recipes r WHERE TRUE");
    push_recipe_filters(&mut count, filter, viewer);

    let total: (i64,) = count
        .build_query_as()
        .fetch_one(pool)
        .await
        .map_err(QueryError::from)?;

    Ok((rows, total.0))
}

pub async fn get_recipe(id: Id, pool: &Pool<Postgres>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(row)
}

pub async fn list_recipe_ingredients(
    pool: &Pool<Postgres>,
    recipe_id: Id,
) -> Result<Vec<RecipeIngredient>, Error> {
    let rows: Vec<RecipeIngredient> = sqlx::query_as(
        "
        SELECT i.id AS id, i.name AS name, i.measurement_unit AS measurement_unit, ia.amount AS amount
        FROM ingredient_amounts ia
        INNER JOIN ingredients i ON i.id = ia.ingredient_id
        WHERE ia.recipe_id = $1
        ORDER BY ia.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn list_author_recipes(
    author_id: Id,
    limit: Option<i64>,
    pool: &Pool<Postgres>,
) -> Result<Vec<Recipe>, Error> {
    // LIMIT NULL is no limit at all
    let rows: Vec<Recipe> = sqlx::query_as(
        "SELECT * FROM recipes WHERE author_id = $1 ORDER BY pub_date DESC, id DESC LIMIT $2",
    )
    .bind(author_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(rows)
}

pub async fn count_author_recipes(author_id: Id, pool: &Pool<Postgres>) -> Result<i64, Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM recipes WHERE author_id = $1")
        .bind(author_id)
        .fetch_one(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(count.0)
}

/// Drops every tag link and ingredient amount of the recipe and inserts the
/// ones of `draft`.
async fn replace_recipe_links(
    conn: &mut PgConnection,
    recipe_id: Id,
    draft: &RecipeDraft,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    sqlx::query("DELETE FROM ingredient_amounts WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await
        .map_err(QueryError::from)?;

    if !draft.tags.is_empty() {
        let mut tags: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
        tags.push_values(draft.tags.iter(), |mut row, tag_id| {
            row.push_bind(recipe_id).push_bind(*tag_id);
        });
        tags.build()
            .execute(&mut *conn)
            .await
            .map_err(QueryError::from)?;
    }

    if !draft.ingredients.is_empty() {
        let mut amounts: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO ingredient_amounts (recipe_id, ingredient_id, amount) ");
        amounts.push_values(draft.ingredients.iter(), |mut row, portion| {
            row.push_bind(recipe_id)
                .push_bind(portion.ingredient_id)
                .push_bind(portion.amount);
        });
        amounts
            .build()
            .execute(&mut *conn)
            .await
            .map_err(QueryError::from)?;
    }

    Ok(())
}

pub async fn create_recipe(
    author_id: Id,
    draft: &RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Recipe, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let recipe: Recipe = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
    ",
    )
    .bind(author_id)
    .bind(&draft.name)
    .bind(draft.image.as_deref().unwrap_or_default())
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .fetch_one(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    replace_recipe_links(&mut tr, recipe.id, draft).await?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;

    log::info!("Created recipe {} by user {}", recipe.id, author_id);
    Ok(recipe)
}

pub async fn update_recipe(
    id: Id,
    draft: &RecipeDraft,
    pool: &Pool<Postgres>,
) -> Result<Option<Recipe>, Error> {
    let mut tr = pool
        .begin()
        .await
        .map_err(|_| QueryError::new("Could not start transaction".to_owned()))?;

    let recipe: Option<Recipe> = sqlx::query_as(
        "
        UPDATE recipes
        SET name = $1, image = COALESCE($2, image), text = $3, cooking_time = $4
        WHERE id = $5
        RETURNING *
    ",
    )
    .bind(&draft.name)
    .bind(draft.image.as_deref())
    .bind(&draft.text)
    .bind(draft.cooking_time)
    .bind(id)
    .fetch_optional(&mut *tr)
    .await
    .map_err(QueryError::from)?;

    let Some(recipe) = recipe else {
        return Ok(None);
    };

    replace_recipe_links(&mut tr, recipe.id, draft).await?;

    tr.commit()
        .await
        .map_err(|_| QueryError::new("Could not commit transaction".to_owned()))?;

    Ok(Some(recipe))
}

/// Ingredient amounts, tag links and memberships follow through `ON DELETE CASCADE`.
pub async fn delete_recipe(id: Id, pool: &Pool<Postgres>) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(result.rows_affected() > 0)
}
