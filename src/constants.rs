pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

pub const DEFAULT_SESSION_HOURS: i64 = 24;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx::query=warn";

/// Upper bound for request bodies; recipe images arrive inline.
pub const MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

pub const RECIPE_NAME_MAX_LENGTH: usize = 200;
pub const USER_NAME_MAX_LENGTH: usize = 150;
pub const CATALOG_NAME_MAX_LENGTH: usize = 200;
pub const EMAIL_MAX_LENGTH: usize = 254;
pub const PASSWORD_MIN_LENGTH: usize = 8;

pub const SHOPPING_LIST_TITLE: &str = "Shopping list:";
pub const SHOPPING_LIST_EMPTY: &str = "Your shopping list is empty.";
pub const SHOPPING_LIST_SIGNATURE: &str = "Foodgram";
pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";
