//! Materialized views: one independently-mutable, insertion-order-
//! preserving record set per catalog table, maintained from the
//! post-commit change stream (spec §4.5, §5).
//!
//! Grounded on the concurrency shape used across the pack's storage
//! engines for per-shard independent mutability (e.g. a `DashMap`
//! keying into per-entry synchronization rather than one global lock):
//! each table's view is its own `Mutex`, so concurrent change-ingestion
//! for unrelated tables never contends.

use std::sync::Mutex;

use dashmap::DashMap;
use indexmap::IndexSet;

use crate::codec::ClientValue;

pub type ClientRecord = Vec<ClientValue>;

#[derive(Default)]
pub struct MaterializedViews {
    tables: DashMap<String, Mutex<IndexSet<ClientRecord>>>,
}

impl MaterializedViews {
    pub fn new() -> Self {
        MaterializedViews::default()
    }

    /// Registers an (initially empty) view for a catalog table. Called
    /// once per table at initialization so every catalog entry has a
    /// view to snapshot from, even one the engine never streams changes
    /// for.
    pub fn register(&self, table_name: &str) {
        self.tables.entry(table_name.to_string()).or_default();
    }

    /// A point-in-time, insertion-ordered copy of a table's current rows.
    /// An unregistered table yields an empty snapshot rather than an
    /// error — the catalog, not this store, is the authority on whether
    /// a table exists.
    pub fn snapshot(&self, table_name: &str) -> Vec<ClientRecord> {
        match self.tables.get(table_name) {
            Some(set) => set.lock().unwrap().iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    pub fn insert(&self, table_name: &str, record: ClientRecord) {
        let entry = self.tables.entry(table_name.to_string()).or_default();
        entry.lock().unwrap().insert(record);
    }

    /// Removes a record by structural equality. A miss (the record was
    /// already absent) is not an error — see the invariants note in
    /// `crate::dml` on idempotent delete-by-value.
    pub fn remove(&self, table_name: &str, record: &[ClientValue]) {
        if let Some(set) = self.tables.get(table_name) {
            set.lock().unwrap().shift_remove(record);
        }
    }
}
