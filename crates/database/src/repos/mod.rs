//! Database repository implementations

pub mod preference_repository;
pub mod user_repository;

pub use preference_repository::*;
pub use user_repository::*;
