//! Application services layer.

pub mod error;
pub mod filter;
pub mod repos;
pub mod schema;
