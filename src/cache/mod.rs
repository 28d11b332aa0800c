//! Request-scoped loader cache.
//!
//! Memoizes "all children of a parent" and "items by id" lookups for tables,
//! fields, and views within one unit of work, so each distinct query shape
//! reaches the store at most once:
//!
//! - **State**: per-kind [`CacheState`] held in a [`CacheContext`] bound to
//!   the running task with [`context::scope`]
//! - **Engine**: the generic [`ResourceLoader`], specialised by three adapters
//!
//! ## Configuration
//!
//! The kinds cached by default are set in `loadscope.toml`:
//!
//! ```toml
//! [cache]
//! enabled_kinds = ["table", "field", "view"]
//! diagnostics = false
//! ```

mod adapters;
mod config;
pub mod context;
mod loader;
mod lock;
mod resource;
mod state;
mod stats;

pub use adapters::{
    FieldAdapter, FieldLoader, Loaders, TableAdapter, TableLoader, ViewAdapter, ViewLoader,
};
pub use config::CacheConfig;
pub use context::{CacheContext, Slot};
pub use loader::{KeyOf, ResourceAdapter, ResourceLoader};
pub use resource::CachedResource;
pub use state::CacheState;
pub use stats::{LOAD_TOTAL, LoaderStats, STORE_QUERY_TOTAL};
