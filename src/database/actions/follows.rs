use crate::{
    error::{Error, QueryError},
    pagination::PageRequest,
    schema::{Id, User},
};

use sqlx::{Pool, Postgres};

/// Returns `false` when the follow already existed. Following oneself is
/// rejected by the `follows_no_self_follow` check.
pub async fn add_follow(
    follower_id: Id,
    author_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result = sqlx::query(
        "INSERT INTO follows (follower_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(follower_id)
    .bind(author_id)
    .execute(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(result.rows_affected() > 0)
}

pub async fn remove_follow(
    follower_id: Id,
    author_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND author_id = $2")
        .bind(follower_id)
        .bind(author_id)
        .execute(pool)
        .await
        .map_err(QueryError::from)?;

    Ok(result.rows_affected() > 0)
}

pub async fn is_following(
    follower_id: Id,
    author_id: Id,
    pool: &Pool<Postgres>,
) -> Result<bool, Error> {
    let found: (bool,) = sqlx::query_as(
        "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND author_id = $2)",
    )
    .bind(follower_id)
    .bind(author_id)
    .fetch_one(pool)
    .await
    .map_err(QueryError::from)?;

    Ok(found.0)
}

pub async fn fetch_following(
    follower_id: Id,
    page: &PageRequest,
    pool: &Pool<Postgres>,
) -> Result<(Vec<User>, i64), Error> {
    let rows: Vec<User> = sqlx::query_as(
        "
        SELECT u.*
        FROM follows f
        INNER JOIN users u ON u.id = f.author_id
        WHERE f.follower_id = $1
        ORDER BY f.id
        LIMIT $2 OFFSET $3
    ",
    )
    .bind(follower_id)
    .bind(page.limit)
    .bind(page.offset())
    .fetch_all(pool)
    .await
    .map_err(QueryError::from)?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
        .bind(follower_id)
        .fetch_one(pool)
        .await
        .map_err(QueryError::from)?;

    Ok((rows, total.0))
}
