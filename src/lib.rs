mod database {
    pub mod actions;
    pub mod error;
    pub mod memory;
    pub mod pagination;
    pub mod relations;
    pub mod schema;
    pub mod store;
}
mod authentication {
    pub mod cryptography;
    pub mod jwt;
    pub mod middleware;
    pub mod permissions;
}
mod services {
    pub mod catalog;
    pub mod memberships;
    pub mod recipes;
    pub mod shopping_list;
    pub mod users;
    pub mod validation;
}
mod constants;

pub mod api;
pub mod config;

pub use authentication::*;
pub use constants::*;
pub use database::*;
pub use services::*;
