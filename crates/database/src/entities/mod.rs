//! Domain entities for the database layer

pub mod preference;
pub mod user;

pub use preference::{PreferenceSnapshot, PreferenceUpdate, UserPreference};
pub use user::{CreateUserRequest, User};
