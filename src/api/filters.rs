use serde::{de::DeserializeOwned, Deserialize};
use warp::{reject::Rejection, Filter};

use crate::{
    constants::MAX_BODY_BYTES,
    error::{Error, ErrorKind},
    pagination::PageQuery,
    schema::{Id, RecipeFilter},
};

pub fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

#[derive(Deserialize, Debug, Default)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct SubscriptionQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub recipes_limit: Option<i64>,
}

impl SubscriptionQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub filter: RecipeFilter,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl RecipeQuery {
    pub fn page(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

fn number(key: &str, value: &str) -> Result<i64, Error> {
    value
        .parse()
        .map_err(|_| ErrorKind::Validation.on(key, "A valid integer is required"))
}

fn flag(key: &str, value: &str) -> Result<bool, Error> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(ErrorKind::Validation.on(key, "Must be one of 1, 0, true, false")),
    }
}

/// Reads recipe list parameters from raw query pairs; `tags` may repeat and
/// unknown keys are ignored.
pub fn parse_recipe_query(pairs: &[(String, String)]) -> Result<RecipeQuery, Error> {
    let mut query = RecipeQuery::default();

    for (key, value) in pairs {
        match key.as_str() {
            "page" => query.page = Some(number(key, value)?),
            "limit" => query.limit = Some(number(key, value)?),
            "author" => {
                let author = Id::try_from(number(key, value)?)
                    .map_err(|_| ErrorKind::Validation.on(key, "Unknown author"))?;
                query.filter.author = Some(author);
            }
            "tags" if !value.is_empty() => query.filter.tags.push(value.to_owned()),
            "is_favorited" => query.filter.is_favorited = flag(key, value)?,
            "is_in_shopping_cart" => query.filter.is_in_shopping_cart = flag(key, value)?,
            _ => {}
        }
    }

    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn repeated_tags_accumulate() {
        let query = parse_recipe_query(&pairs(&[
            ("tags", "breakfast"),
            ("tags", "lunch"),
            ("author", "3"),
            ("is_favorited", "1"),
            ("limit", "2"),
        ]))
        .unwrap();
        assert_eq!(query.filter.tags, vec!["breakfast", "lunch"]);
        assert_eq!(query.filter.author, Some(3));
        assert!(query.filter.is_favorited);
        assert!(!query.filter.is_in_shopping_cart);
        assert_eq!(query.limit, Some(2));
    }

    #[test]
    fn bad_values_name_their_parameter() {
        let error = parse_recipe_query(&pairs(&[("is_in_shopping_cart", "maybe")])).unwrap_err();
        assert_eq!(error.field.as_deref(), Some("is_in_shopping_cart"));

        let error = parse_recipe_query(&pairs(&[("page", "two")])).unwrap_err();
        assert_eq!(error.field.as_deref(), Some("page"));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let query = parse_recipe_query(&pairs(&[("format", "json")])).unwrap();
        assert_eq!(query, RecipeQuery::default());
    }
}
