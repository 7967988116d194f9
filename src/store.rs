//! Durable namespace store backed by redb.
//!
//! Each persisted namespace (`arch_nodes`, `arch_edges`, `arch_layout`,
//! `arch_manual`) is an independently serialized JSON value in a single
//! key-value table. A namespace that fails to read or parse is reported and
//! skipped; siblings load normally.

use log::warn;
use redb::{Database, ReadableDatabase, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use thiserror::Error;

const NAMESPACE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("namespaces");

pub const NODES_NAMESPACE: &str = "arch_nodes";
pub const EDGES_NAMESPACE: &str = "arch_edges";
pub const MODE_NAMESPACE: &str = "arch_layout";
pub const OVERRIDES_NAMESPACE: &str = "arch_manual";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database failure: {0}")]
    Backend(#[from] redb::Error),
    #[error("failed to encode namespace: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Process-local document store with single ownership. No locking beyond
/// what redb itself provides; concurrent editors are unsupported.
pub struct DocumentStore {
    db: Database,
}

impl DocumentStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(redb::Error::from)?;
        Ok(Self { db })
    }

    /// Reads one namespace. Absent, unreadable, and malformed namespaces all
    /// come back as `None` so the caller can fall back to a default; the
    /// unreadable and malformed cases are logged.
    pub fn read_namespace<T: DeserializeOwned>(&self, namespace: &str) -> Option<T> {
        let raw = match self.read_raw(namespace) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!("failed to read namespace {namespace}: {err}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("namespace {namespace} holds malformed data, using default: {err}");
                None
            }
        }
    }

    /// Serializes and writes one namespace.
    pub fn write_namespace<T: Serialize>(&self, namespace: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.write_raw(&[(namespace, json)])
    }

    /// Writes several namespaces in a single transaction. Values are already
    /// serialized so a failure can't leave a partially encoded batch.
    pub fn write_namespaces(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        self.write_raw(entries)
    }

    fn read_raw(&self, namespace: &str) -> Result<Option<String>, StoreError> {
        let txn = self.db.begin_read().map_err(redb::Error::from)?;
        let table = match txn.open_table(NAMESPACE_TABLE) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(err) => return Err(redb::Error::from(err).into()),
        };
        let value = table
            .get(namespace)
            .map_err(redb::Error::from)?
            .map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn write_raw(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let txn = self.db.begin_write().map_err(redb::Error::from)?;
        {
            let mut table = txn
                .open_table(NAMESPACE_TABLE)
                .map_err(redb::Error::from)?;
            for (namespace, json) in entries {
                table
                    .insert(*namespace, json.as_str())
                    .map_err(redb::Error::from)?;
            }
        }
        txn.commit().map_err(redb::Error::from)?;
        Ok(())
    }
}
