//! Request-scoped loader cache for table, field, and view metadata.
//!
//! Build [`cache::Loaders`] once over a repository set, then run each unit of
//! work inside [`cache::context::scope`] with a fresh [`cache::CacheContext`].

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
