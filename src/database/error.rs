use std::fmt::{self, Display};

use serde_json::{Map, Value};
use warp::http::StatusCode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthenticated,
    Permission,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::Unauthenticated => 401,
            ErrorKind::Permission => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 400,
            ErrorKind::Internal => 500,
        }
    }

    pub fn new(self, info: &str) -> Error {
        Error {
            kind: self,
            field: None,
            info: info.to_string(),
        }
    }

    /// Error scoped to a single input field.
    pub fn on(self, field: &str, info: &str) -> Error {
        Error {
            kind: self,
            field: Some(field.to_string()),
            info: info.to_string(),
        }
    }

    pub fn default(self) -> Error {
        let info = match self {
            ErrorKind::Validation => "Invalid request",
            ErrorKind::Unauthenticated => "Authentication credentials were not provided",
            ErrorKind::Permission => "You don't have permission to perform this action",
            ErrorKind::NotFound => "Not found",
            ErrorKind::Conflict => "Object already exists",
            ErrorKind::Internal => "Internal server error",
        };
        self.new(info)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub field: Option<String>,
    pub info: String,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.kind.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// `{field: message}`, or `{"detail": message}` for non-field errors.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        let key = self.field.as_deref().unwrap_or("detail");
        body.insert(key.to_string(), Value::String(self.info.to_owned()));
        Value::Object(body)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{:?} ({field}): {}", self.kind, self.info),
            None => write!(f, "{:?}: {}", self.kind, self.info),
        }
    }
}

impl std::error::Error for Error {}

impl warp::reject::Reject for Error {}

/// Unique and check constraints of the schema and the field they guard.
const CONSTRAINT_FIELDS: &[(&str, &str, &str)] = &[
    ("users_email_key", "email", "A user with that email already exists"),
    ("users_username_key", "username", "A user with that username already exists"),
    ("tags_slug_key", "slug", "A tag with that slug already exists"),
    (
        "ingredients_name_measurement_unit_key",
        "name",
        "An ingredient with that name and unit already exists",
    ),
    ("follows_no_self_follow", "detail", "You cannot follow yourself"),
    ("recipes_cooking_time_check", "cooking_time", "Cooking time must be at least 1"),
    ("ingredient_amounts_amount_check", "amount", "Amount must be at least 1"),
];

pub struct QueryError {
    kind: ErrorKind,
    constraint: Option<String>,
    info: String,
}

impl QueryError {
    pub fn new(info: String) -> Self {
        Self {
            kind: ErrorKind::Internal,
            constraint: None,
            info,
        }
    }

    /// A violation of the named schema constraint, as the database would report it.
    pub fn violation(kind: ErrorKind, constraint: &str) -> Self {
        Self {
            kind,
            constraint: Some(constraint.to_owned()),
            info: format!("violates constraint \"{constraint}\""),
        }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(e) => {
                let kind = match e.code().as_deref() {
                    Some("23505") => ErrorKind::Conflict,
                    Some("23514") => ErrorKind::Validation,
                    Some("23503") => ErrorKind::Conflict,
                    _ => ErrorKind::Internal,
                };
                Self {
                    kind,
                    constraint: e.constraint().map(|c| c.to_string()),
                    info: format!("{e}"),
                }
            }
            sqlx::Error::Configuration(e) => Self::new(format!("{e}")),
            sqlx::Error::Io(e) => Self::new(format!("{e}")),
            sqlx::Error::Tls(e) => Self::new(format!("{e}")),
            sqlx::Error::Protocol(e) => Self::new(e),
            sqlx::Error::RowNotFound => Self::new(String::from("RowNotFound")),
            sqlx::Error::TypeNotFound { type_name } => {
                Self::new(format!("Type not found: {type_name}"))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => {
                Self::new(format!("Column index out of bounds {index} ({len})"))
            }
            sqlx::Error::ColumnNotFound(e) => Self::new(e),
            sqlx::Error::ColumnDecode { index, source } => {
                Self::new(format!("Column decode {index} ({source})"))
            }
            sqlx::Error::Decode(e) => Self::new(format!("{e}")),
            sqlx::Error::AnyDriverError(e) => Self::new(format!("{e}")),
            sqlx::Error::PoolTimedOut => Self::new(String::from("Pool timed out")),
            sqlx::Error::PoolClosed => Self::new(String::from("Pool closed")),
            sqlx::Error::WorkerCrashed => Self::new(String::from("Worker crashed")),
            sqlx::Error::Migrate(e) => Self::new(format!("{e}")),
            _ => Self::new(String::from("Unknown error")),
        }
    }
}

impl From<QueryError> for Error {
    fn from(value: QueryError) -> Self {
        if value.kind == ErrorKind::Internal {
            log::error!("Query failed: {}", value.info);
            return ErrorKind::Internal.default();
        }

        let known = value.constraint.as_deref().and_then(|constraint| {
            CONSTRAINT_FIELDS
                .iter()
                .find(|(name, _, _)| *name == constraint)
        });

        match known {
            Some((_, field, info)) => value.kind.on(field, info),
            None => {
                log::warn!("Unmapped constraint violation: {}", value.info);
                value.kind.new("Request conflicts with stored data")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_are_keyed_by_field() {
        let error = ErrorKind::Validation.on("tags", "Select at least one tag");
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            error.body(),
            serde_json::json!({ "tags": "Select at least one tag" })
        );
    }

    #[test]
    fn non_field_errors_use_detail() {
        let error = ErrorKind::NotFound.default();
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
        assert_eq!(error.body(), serde_json::json!({ "detail": "Not found" }));
    }

    #[test]
    fn conflict_is_a_bad_request() {
        assert_eq!(ErrorKind::Conflict.default().status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::Permission.default().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ErrorKind::Unauthenticated.default().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn internal_query_errors_hide_details() {
        let error: Error = QueryError::new("connection reset by peer".to_owned()).into();
        assert_eq!(error, ErrorKind::Internal.default());
    }

    #[test]
    fn known_constraints_map_to_fields() {
        let error: Error = QueryError {
            kind: ErrorKind::Conflict,
            constraint: Some("users_email_key".to_owned()),
            info: String::new(),
        }
        .into();
        assert_eq!(error.field.as_deref(), Some("email"));
        assert_eq!(error.kind, ErrorKind::Conflict);
    }
}
