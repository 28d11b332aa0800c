//! Unit-of-work cache context.
//!
//! A [`CacheContext`] holds one [`CacheState`] slot per resource kind and the
//! set of kinds cached for this unit of work. It is bound to the running task
//! with `tokio::task_local!`, so every loader call made while the scoped
//! future runs sees the same slots and no other task ever does. Outside a
//! scope the loaders fall through to the store.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::domain::entities::{FieldRecord, TableRecord, ViewRecord};
use crate::domain::types::ResourceKind;

use super::config::CacheConfig;
use super::lock::mutex_lock;
use super::resource::CachedResource;
use super::state::CacheState;

const SOURCE: &str = "cache::context";

tokio::task_local! {
    static CURRENT: Arc<CacheContext>;
}

/// Run `future` with `context` as the active unit of work.
///
/// # Example
///
/// ```ignore
/// let context = Arc::new(CacheContext::from_config(&config));
/// let fields = cache::context::scope(context, async {
///     loaders.fields.load("tblA", None).await
/// })
/// .await?;
/// ```
pub async fn scope<F>(context: Arc<CacheContext>, future: F) -> F::Output
where
    F: Future,
{
    CURRENT.scope(context, future).await
}

/// The context bound to the current task, if any.
pub fn current() -> Option<Arc<CacheContext>> {
    CURRENT.try_with(Arc::clone).ok()
}

/// Whether the current task runs inside a unit of work.
pub fn is_active() -> bool {
    CURRENT.try_with(|_| ()).is_ok()
}

/// One kind's lazily created state.
///
/// Callers only ever receive copies of cached items; the state itself never
/// leaves the slot except through [`Slot::snapshot`].
#[derive(Debug)]
pub struct Slot<T> {
    state: Mutex<Option<CacheState<T>>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }
}

impl<T: CachedResource> Slot<T> {
    /// Run `f` against the state, creating it empty on first access.
    pub(crate) fn with<R>(&self, op: &'static str, f: impl FnOnce(&mut CacheState<T>) -> R) -> R {
        let mut guard = mutex_lock(&self.state, SOURCE, op);
        f(guard.get_or_insert_with(CacheState::new))
    }

    /// Copy of the current state; empty if the slot was never touched.
    pub fn snapshot(&self) -> CacheState<T> {
        mutex_lock(&self.state, SOURCE, "snapshot")
            .clone()
            .unwrap_or_default()
    }

    /// Reset the slot to empty.
    pub fn clear(&self) {
        *mutex_lock(&self.state, SOURCE, "clear") = None;
    }
}

#[derive(Debug)]
pub struct CacheContext {
    enabled: HashSet<ResourceKind>,
    tables: Slot<TableRecord>,
    fields: Slot<FieldRecord>,
    views: Slot<ViewRecord>,
}

impl CacheContext {
    pub fn new<I>(enabled: I) -> Self
    where
        I: IntoIterator<Item = ResourceKind>,
    {
        Self {
            enabled: enabled.into_iter().collect(),
            tables: Slot::default(),
            fields: Slot::default(),
            views: Slot::default(),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.enabled_kinds.iter().copied())
    }

    pub fn is_enabled(&self, kind: ResourceKind) -> bool {
        self.enabled.contains(&kind)
    }

    pub fn tables(&self) -> &Slot<TableRecord> {
        &self.tables
    }

    pub fn fields(&self) -> &Slot<FieldRecord> {
        &self.fields
    }

    pub fn views(&self) -> &Slot<ViewRecord> {
        &self.views
    }
}
