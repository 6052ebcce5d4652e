//! SeaORM entities.

pub mod comment;
pub mod prompt;
pub mod user;
