//! Generic request-scoped loader.
//!
//! `load(parent_id)` fetches the complete child set of a parent at most once
//! per unit of work; later loads of the same parent, with or without a key
//! filter, are answered from the cached set. Key filters are never pushed to
//! the store while caching is on, so a filtered load cannot mark a parent as
//! fully loaded from a partial result.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::application::filter::KeyFilter;
use crate::application::repos::RepoError;
use crate::domain::types::ResourceKind;

use super::context::{self, CacheContext, Slot};
use super::resource::CachedResource;
use super::state::{CacheState, compare_order};
use super::stats::LoaderStats;

/// Filter key type of an adapter's items.
pub type KeyOf<A> = <<A as ResourceAdapter>::Item as CachedResource>::Key;

/// Binds the generic loader to one resource kind: its context slot and its store queries.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    type Item: CachedResource;

    const KIND: ResourceKind;

    fn slot(context: &CacheContext) -> &Slot<Self::Item>;

    /// Non-deleted children of `parent_id`, with `filter` applied by the store.
    async fn find_many_by_parent_id(
        &self,
        parent_id: &str,
        filter: Option<&KeyFilter<KeyOf<Self>>>,
    ) -> Result<Vec<Self::Item>, RepoError>;

    /// Non-deleted items among `ids`, in no particular order.
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Self::Item>, RepoError>;
}

pub struct ResourceLoader<A: ResourceAdapter> {
    adapter: A,
    stats: LoaderStats,
    diagnostics: bool,
}

impl<A: ResourceAdapter> ResourceLoader<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            stats: LoaderStats::new(A::KIND),
            diagnostics: false,
        }
    }

    /// Log the running hit rate after every call.
    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn kind(&self) -> ResourceKind {
        A::KIND
    }

    pub fn stats(&self) -> &LoaderStats {
        &self.stats
    }

    /// Whether the current unit of work caches this kind.
    pub fn is_enabled(&self) -> bool {
        self.active_context().is_some()
    }

    /// Drop everything cached for this kind in the current unit of work.
    pub fn clear(&self) {
        if let Some(context) = context::current() {
            A::slot(&context).clear();
        }
    }

    fn active_context(&self) -> Option<Arc<CacheContext>> {
        context::current().filter(|context| context.is_enabled(A::KIND))
    }

    /// Children of `parent_id` matching `filter`, ascending by `order`.
    #[instrument(level = "debug", skip_all, fields(kind = A::KIND.as_str(), parent_id = parent_id))]
    pub async fn load(
        &self,
        parent_id: &str,
        filter: Option<&KeyFilter<KeyOf<A>>>,
    ) -> Result<Vec<A::Item>, RepoError> {
        if parent_id.is_empty() {
            return Err(RepoError::invalid_input("parent id must not be empty"));
        }
        self.stats.record_load();

        let Some(context) = self.active_context() else {
            debug!(cache = "loader", outcome = "bypass", "caching disabled, querying store");
            self.stats.record_store_query();
            let items = self.adapter.find_many_by_parent_id(parent_id, filter).await?;
            self.report();
            return Ok(items);
        };
        let slot = A::slot(&context);

        let cached = slot.with("load.read", |state| {
            state
                .is_full(parent_id)
                .then(|| state.children_of(parent_id))
        });
        if let Some(children) = cached {
            debug!(
                cache = "loader",
                outcome = "hit",
                cached = children.len(),
                "serving cached children"
            );
            self.report();
            return Ok(select(children, filter));
        }

        self.stats.record_store_query();
        let fresh = self.adapter.find_many_by_parent_id(parent_id, None).await?;
        slot.with("load.replace", |state| {
            state.replace_children(parent_id, fresh.clone());
        });
        debug!(
            cache = "loader",
            outcome = "miss",
            fetched = fresh.len(),
            "cached full child set"
        );
        self.report();
        Ok(select(fresh, filter))
    }

    /// Items for `ids` in input order; ids that do not exist are dropped.
    #[instrument(level = "debug", skip_all, fields(kind = A::KIND.as_str(), requested = ids.len()))]
    pub async fn load_by_ids<S>(&self, ids: &[S]) -> Result<Vec<A::Item>, RepoError>
    where
        S: AsRef<str> + Sync,
    {
        self.stats.record_load();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let Some(context) = self.active_context() else {
            debug!(cache = "loader", outcome = "bypass", "caching disabled, querying store");
            let mut scratch = CacheState::new();
            let missing = scratch.missing_ids(ids);
            self.stats.record_store_query();
            scratch.merge(self.adapter.find_by_ids(&missing).await?);
            self.report();
            return Ok(scratch.collect_ids(ids));
        };
        let slot = A::slot(&context);

        let missing = slot.with("load_by_ids.missing", |state| state.missing_ids(ids));
        if missing.is_empty() {
            debug!(cache = "loader", outcome = "hit", "all ids cached");
        } else {
            self.stats.record_store_query();
            let fetched = self.adapter.find_by_ids(&missing).await?;
            debug!(
                cache = "loader",
                outcome = "miss",
                missing = missing.len(),
                fetched = fetched.len(),
                "fetched uncached ids"
            );
            slot.with("load_by_ids.merge", |state| state.merge(fetched));
        }
        self.report();

        Ok(slot.with("load_by_ids.collect", |state| state.collect_ids(ids)))
    }

    /// Forget `parent_ids` and their cached children in the current unit of work.
    ///
    /// No-op without an active context, with caching off for this kind, or
    /// when no non-empty id is given.
    pub(crate) fn invalidate_parents<I, S>(&self, parent_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(context) = self.active_context() else {
            return;
        };

        let mut ids: Vec<String> = Vec::new();
        for id in parent_ids {
            let id = id.as_ref();
            if !id.is_empty() && !ids.iter().any(|existing| existing == id) {
                ids.push(id.to_string());
            }
        }
        if ids.is_empty() {
            return;
        }

        let purged = A::slot(&context).with("invalidate", |state| state.invalidate_parents(&ids));
        debug!(
            kind = A::KIND.as_str(),
            parents = ids.len(),
            purged,
            "invalidated cached parents"
        );
    }

    fn report(&self) {
        if !self.diagnostics {
            return;
        }
        debug!(
            kind = A::KIND.as_str(),
            load_count = self.stats.load_count(),
            store_query_count = self.stats.store_query_count(),
            hit_rate = self.stats.hit_rate().unwrap_or_default(),
            "loader diagnostics"
        );
    }
}

fn select<T: CachedResource>(mut items: Vec<T>, filter: Option<&KeyFilter<T::Key>>) -> Vec<T> {
    if let Some(filter) = filter {
        items.retain(|item| filter.matches(|key| item.key_value(key)));
    }
    items.sort_by(compare_order);
    items
}
