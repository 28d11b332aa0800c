//! Loader diagnostics: call counts versus store round trips.

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;

use crate::domain::types::ResourceKind;

pub const LOAD_TOTAL: &str = "loadscope_loader_load_total";
pub const STORE_QUERY_TOTAL: &str = "loadscope_loader_store_query_total";

/// Counters for the lifetime of one loader instance.
#[derive(Debug)]
pub struct LoaderStats {
    kind: ResourceKind,
    load_count: AtomicU64,
    store_query_count: AtomicU64,
}

impl LoaderStats {
    pub fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            load_count: AtomicU64::new(0),
            store_query_count: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_load(&self) {
        self.load_count.fetch_add(1, Ordering::Relaxed);
        counter!(LOAD_TOTAL, "kind" => self.kind.as_str()).increment(1);
    }

    pub(crate) fn record_store_query(&self) {
        self.store_query_count.fetch_add(1, Ordering::Relaxed);
        counter!(STORE_QUERY_TOTAL, "kind" => self.kind.as_str()).increment(1);
    }

    pub fn load_count(&self) -> u64 {
        self.load_count.load(Ordering::Relaxed)
    }

    pub fn store_query_count(&self) -> u64 {
        self.store_query_count.load(Ordering::Relaxed)
    }

    /// Share of loads answered without a store round trip; `None` before the first load.
    pub fn hit_rate(&self) -> Option<f64> {
        let loads = self.load_count();
        if loads == 0 {
            return None;
        }
        let queries = self.store_query_count().min(loads);
        Some((loads - queries) as f64 / loads as f64)
    }
}
