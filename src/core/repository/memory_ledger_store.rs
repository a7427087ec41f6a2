use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::{LedgerStore, Table, version_of, Write};

type Tables = HashMap<&'static str, BTreeMap<String, Value>>;

// MemoryLedgerStore keeps every table in process; a commit is applied under one write lock.
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    tables: RwLock<Tables>,
    sequences: RwLock<HashMap<&'static str, i64>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(tables: &Tables, write: &Write) -> LibraryResult<()> {
        let current = tables.get(write.table().name).and_then(|rows| rows.get(write.id()));
        let ok = match (write, current) {
            (Write::Put { expected_version: None, .. }, None) => true,
            (Write::Put { expected_version: Some(expected), .. }, Some(existing)) => version_of(existing) == Some(*expected),
            (Write::Delete { expected_version, .. }, Some(existing)) => version_of(existing) == Some(*expected_version),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(LibraryError::unavailable(format!("conflicting write to {} {}",
                                                  write.table().name, write.id()).as_str(),
                                          Some("ConditionalCheckFailed".to_string()), true))
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get(&self, table: Table, id: &str) -> LibraryResult<Option<Value>> {
        let tables = self.tables.read().map_err(|_| LibraryError::runtime("ledger lock poisoned", None))?;
        Ok(tables.get(table.name).and_then(|rows| rows.get(id)).cloned())
    }

    async fn scan(&self, table: Table) -> LibraryResult<Vec<Value>> {
        let tables = self.tables.read().map_err(|_| LibraryError::runtime("ledger lock poisoned", None))?;
        Ok(tables.get(table.name).map(|rows| rows.values().cloned().collect()).unwrap_or_default())
    }

    async fn commit(&self, writes: &[Write]) -> LibraryResult<usize> {
        let mut tables = self.tables.write().map_err(|_| LibraryError::runtime("ledger lock poisoned", None))?;
        for write in writes {
            Self::check(&tables, write)?;
        }
        for write in writes {
            match write {
                Write::Put { table, id, value, .. } => {
                    tables.entry(table.name).or_default().insert(id.to_string(), value.clone());
                }
                Write::Delete { table, id, .. } => {
                    if let Some(rows) = tables.get_mut(table.name) {
                        rows.remove(id);
                    }
                }
            }
        }
        debug!("committed {} writes", writes.len());
        Ok(writes.len())
    }

    async fn next_sequence(&self, table: Table) -> LibraryResult<i64> {
        let mut sequences = self.sequences.write().map_err(|_| LibraryError::runtime("sequence lock poisoned", None))?;
        let seq = sequences.entry(table.name).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }
}
