//! Request forms and the checks that turn them into storable values.

use serde::Deserialize;

use crate::{
    constants::{
        CATALOG_NAME_MAX_LENGTH, EMAIL_MAX_LENGTH, PASSWORD_MIN_LENGTH, RECIPE_NAME_MAX_LENGTH,
        USER_NAME_MAX_LENGTH,
    },
    error::{Error, ErrorKind},
    schema::{Id, IngredientPortion, NewIngredient, NewTag, RecipeDraft},
    store::Store,
};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngredientEntry {
    pub id: Id,
    pub amount: i64,
}

/// Recipe body of `POST` and `PATCH` requests.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct RecipeForm {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i64>,
    pub tags: Vec<Id>,
    pub ingredients: Vec<IngredientEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

fn positive(value: i64, field: &str, info: &str) -> Result<i32, Error> {
    if value <= 0 {
        return Err(ErrorKind::Validation.on(field, info));
    }
    i32::try_from(value)
        .map_err(|_| ErrorKind::Validation.on(field, &format!("Must not exceed {}", i32::MAX)))
}

fn has_duplicates<T: PartialEq>(values: &[T]) -> bool {
    values
        .iter()
        .enumerate()
        .any(|(i, value)| values[..i].contains(value))
}

/// Checks everything that can be decided without storage, in a fixed order,
/// and reports the first failure.
pub fn validate_recipe(form: RecipeForm, mode: FormMode) -> Result<RecipeDraft, Error> {
    if form.tags.is_empty() {
        return Err(ErrorKind::Validation.on("tags", "Select at least one tag"));
    }
    if has_duplicates(&form.tags) {
        return Err(ErrorKind::Validation.on("tags", "Tags must be unique"));
    }

    let mut ingredients: Vec<IngredientPortion> = Vec::with_capacity(form.ingredients.len());
    for entry in &form.ingredients {
        if ingredients.iter().any(|p| p.ingredient_id == entry.id) {
            return Err(ErrorKind::Validation.on("ingredients", "Ingredients must be unique"));
        }
        ingredients.push(IngredientPortion {
            ingredient_id: entry.id,
            amount: positive(entry.amount, "amount", "Amount must be greater than 0")?,
        });
    }

    let cooking_time = match form.cooking_time {
        Some(minutes) => positive(minutes, "cooking_time", "Cooking time must be greater than 0")?,
        None => return Err(ErrorKind::Validation.on("cooking_time", "This field is required")),
    };

    if ingredients.is_empty() {
        return Err(ErrorKind::Validation.on("ingredients", "Add at least one ingredient"));
    }

    let name = form.name.unwrap_or_default().trim().to_owned();
    if name.is_empty() {
        return Err(ErrorKind::Validation.on("name", "This field may not be blank"));
    }
    if name.chars().count() > RECIPE_NAME_MAX_LENGTH {
        return Err(ErrorKind::Validation.on(
            "name",
            &format!("Ensure this field has no more than {RECIPE_NAME_MAX_LENGTH} characters"),
        ));
    }

    let text = form.text.unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ErrorKind::Validation.on("text", "This field may not be blank"));
    }

    let image = form.image.filter(|image| !image.trim().is_empty());
    if mode == FormMode::Create && image.is_none() {
        return Err(ErrorKind::Validation.on("image", "This field is required"));
    }

    Ok(RecipeDraft {
        name,
        image,
        text,
        cooking_time,
        tags: form.tags,
        ingredients,
    })
}

/// Rejects drafts naming tags or ingredients that do not exist.
pub async fn check_references(store: &dyn Store, draft: &RecipeDraft) -> Result<(), Error> {
    for tag_id in &draft.tags {
        if store.get_tag(*tag_id).await?.is_none() {
            return Err(ErrorKind::Validation.on("tags", &format!("Unknown tag {tag_id}")));
        }
    }
    for portion in &draft.ingredients {
        if store.get_ingredient(portion.ingredient_id).await?.is_none() {
            return Err(ErrorKind::Validation.on(
                "ingredients",
                &format!("Unknown ingredient {}", portion.ingredient_id),
            ));
        }
    }
    Ok(())
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct UserForm {
    pub email: Option<String>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
}

/// Registration input that passed validation. `password` is still plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

fn required(value: Option<String>, field: &str) -> Result<String, Error> {
    let value = value.unwrap_or_default().trim().to_owned();
    if value.is_empty() {
        return Err(ErrorKind::Validation.on(field, "This field is required"));
    }
    Ok(value)
}

fn at_most(value: String, max: usize, field: &str) -> Result<String, Error> {
    if value.chars().count() > max {
        return Err(ErrorKind::Validation.on(
            field,
            &format!("Ensure this field has no more than {max} characters"),
        ));
    }
    Ok(value)
}

pub fn is_valid_username(username: &str) -> bool {
    !username.is_empty()
        && username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'))
}

pub fn validate_registration(form: UserForm) -> Result<Registration, Error> {
    let email =
        at_most(required(form.email, "email")?, EMAIL_MAX_LENGTH, "email")?.to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => return Err(ErrorKind::Validation.on("email", "Enter a valid email address")),
    }

    let username = at_most(
        required(form.username, "username")?,
        USER_NAME_MAX_LENGTH,
        "username",
    )?;
    if !is_valid_username(&username) {
        return Err(ErrorKind::Validation.on(
            "username",
            "Username may contain only letters, digits and @/./+/-/_",
        ));
    }

    let first_name = at_most(
        required(form.first_name, "first_name")?,
        USER_NAME_MAX_LENGTH,
        "first_name",
    )?;
    let last_name = at_most(
        required(form.last_name, "last_name")?,
        USER_NAME_MAX_LENGTH,
        "last_name",
    )?;

    let password = form.password.unwrap_or_default();
    validate_password(&password, "password")?;

    Ok(Registration {
        email,
        username,
        first_name,
        last_name,
        password,
    })
}

pub fn validate_password(password: &str, field: &str) -> Result<(), Error> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(ErrorKind::Validation.on(
            field,
            &format!("Password must be at least {PASSWORD_MIN_LENGTH} characters long"),
        ));
    }
    Ok(())
}

/// Slugs are lower-case ASCII letters, digits, `-` and `_`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_'))
}

pub fn validate_tag(tag: NewTag) -> Result<NewTag, Error> {
    let name = at_most(required(Some(tag.name), "name")?, CATALOG_NAME_MAX_LENGTH, "name")?;
    let slug = at_most(required(Some(tag.slug), "slug")?, CATALOG_NAME_MAX_LENGTH, "slug")?;
    if !is_valid_slug(&slug) {
        return Err(ErrorKind::Validation.on(
            "slug",
            "Slug may contain only lower-case letters, digits, hyphens and underscores",
        ));
    }

    let color = tag.color.trim().to_owned();
    let hex = color.strip_prefix('#').unwrap_or("");
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ErrorKind::Validation.on("color", "Color must look like #RRGGBB"));
    }

    Ok(NewTag { name, color, slug })
}

pub fn validate_ingredient(ingredient: NewIngredient) -> Result<NewIngredient, Error> {
    Ok(NewIngredient {
        name: at_most(
            required(Some(ingredient.name), "name")?,
            CATALOG_NAME_MAX_LENGTH,
            "name",
        )?,
        measurement_unit: at_most(
            required(Some(ingredient.measurement_unit), "measurement_unit")?,
            CATALOG_NAME_MAX_LENGTH,
            "measurement_unit",
        )?,
    })
}
