use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::{Entity, LedgerStore, Table, version_of, Write};

type RecordKey = (Table, String);

// LendingTransaction stages every change of one business operation and commits them together.
//
// Reads go through the staged overlay first, so a collaborator sees the changes made earlier in
// the same operation. Each staged record remembers the version it was read at; the commit is
// rejected by the store if any of them moved in between.
pub struct LendingTransaction {
    ledger: Arc<dyn LedgerStore>,
    now: NaiveDateTime,
    base_versions: HashMap<RecordKey, Option<i64>>,
    staged: BTreeMap<RecordKey, Option<Value>>,
    events: Vec<DomainEvent>,
}

impl LendingTransaction {
    pub fn begin(ledger: Arc<dyn LedgerStore>, now: NaiveDateTime) -> Self {
        Self {
            ledger,
            now,
            base_versions: HashMap::new(),
            staged: BTreeMap::new(),
            events: vec![],
        }
    }

    // business time of the operation, fixed when it began
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub async fn load<E: Entity>(&mut self, id: &str) -> LibraryResult<Option<E>> {
        let key = (E::TABLE, id.to_string());
        if let Some(staged) = self.staged.get(&key) {
            return match staged {
                Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
                None => Ok(None),
            };
        }
        let stored = self.ledger.get(E::TABLE, id).await?;
        self.base_versions.entry(key).or_insert_with(|| stored.as_ref().and_then(version_of));
        match stored {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    // all records of the entity's table as this transaction sees them, ordered by id
    pub async fn scan<E: Entity>(&mut self) -> LibraryResult<Vec<E>> {
        let mut rows = BTreeMap::new();
        for value in self.ledger.scan(E::TABLE).await? {
            if let Some(id) = value.get(E::TABLE.key).and_then(Value::as_str) {
                let id = id.to_string();
                self.base_versions.entry((E::TABLE, id.clone())).or_insert_with(|| version_of(&value));
                rows.insert(id, value);
            }
        }
        for ((table, id), staged) in self.staged.iter() {
            if *table != E::TABLE {
                continue;
            }
            match staged {
                Some(value) => { rows.insert(id.clone(), value.clone()); }
                None => { rows.remove(id); }
            }
        }
        rows.into_values()
            .map(|value| serde_json::from_value::<E>(value).map_err(LibraryError::from))
            .collect()
    }

    // stage writes the entity at the next version of what was read; unread entities are new
    pub fn stage<E: Entity>(&mut self, entity: &E) -> LibraryResult<()> {
        let key = (E::TABLE, entity.id());
        let base = *self.base_versions.entry(key.clone()).or_insert(None);
        let mut value = serde_json::to_value(entity)?;
        match value.as_object_mut() {
            Some(map) => {
                map.insert("version".to_string(), Value::from(base.map(|v| v + 1).unwrap_or(0)));
            }
            None => {
                return Err(LibraryError::serialization(format!("{} {} is not a record",
                                                               E::TABLE.name, entity.id()).as_str()));
            }
        }
        debug!("staged {} {}", E::TABLE.name, entity.id());
        self.staged.insert(key, Some(value));
        Ok(())
    }

    pub fn remove<E: Entity>(&mut self, id: &str) -> LibraryResult<()> {
        let key = (E::TABLE, id.to_string());
        match self.base_versions.get(&key) {
            Some(Some(_)) => {
                self.staged.insert(key, None);
                Ok(())
            }
            Some(None) => {
                // created in this transaction, nothing stored yet
                self.staged.remove(&key);
                Ok(())
            }
            None => Err(LibraryError::invariant(format!("{} {} removed without being loaded",
                                                        E::TABLE.name, id).as_str())),
        }
    }

    // next_id draws from the store's counter, e.g. BR00042
    pub async fn next_id<E: Entity>(&mut self) -> LibraryResult<String> {
        let seq = self.ledger.next_sequence(E::TABLE).await?;
        Ok(format!("{}{:05}", E::ID_PREFIX, seq))
    }

    pub fn record(&mut self, event: DomainEvent) {
        self.events.push(event.at(self.now));
    }

    fn writes(&self) -> Vec<Write> {
        let mut writes = vec![];
        for ((table, id), staged) in self.staged.iter() {
            let base = self.base_versions.get(&(*table, id.clone())).copied().flatten();
            match (staged, base) {
                (Some(value), expected_version) => writes.push(Write::Put {
                    table: *table,
                    id: id.clone(),
                    value: value.clone(),
                    expected_version,
                }),
                (None, Some(expected_version)) => writes.push(Write::Delete {
                    table: *table,
                    id: id.clone(),
                    expected_version,
                }),
                (None, None) => {}
            }
        }
        writes
    }

    // commit persists the change set and hands back the events to publish
    pub async fn commit(self) -> LibraryResult<Vec<DomainEvent>> {
        let writes = self.writes();
        if !writes.is_empty() {
            self.ledger.commit(&writes).await?;
        }
        Ok(self.events)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use chrono::NaiveDate;
    use serde::{Deserialize, Serialize};
    use crate::core::domain::Identifiable;
    use crate::core::events::DomainEvent;
    use crate::core::repository::{Entity, LedgerStore, Table};
    use crate::core::repository::memory_ledger_store::MemoryLedgerStore;
    use crate::core::transaction::LendingTransaction;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Counter {
        counter_id: String,
        version: i64,
        count: i64,
    }

    impl Identifiable for Counter {
        fn id(&self) -> String {
            self.counter_id.to_string()
        }

        fn version(&self) -> i64 {
            self.version
        }
    }

    impl Entity for Counter {
        const TABLE: Table = Table { name: "counters", key: "counter_id" };
        const ID_PREFIX: &'static str = "CT";
    }

    fn begin(ledger: &Arc<dyn LedgerStore>) -> LendingTransaction {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).expect("valid date");
        LendingTransaction::begin(ledger.clone(), now)
    }

    #[tokio::test]
    async fn test_should_generate_padded_ids() {
        let ledger: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let mut tx = begin(&ledger);
        assert_eq!("CT00001", tx.next_id::<Counter>().await.expect("should draw id"));
        assert_eq!("CT00002", tx.next_id::<Counter>().await.expect("should draw id"));
    }

    #[tokio::test]
    async fn test_should_read_own_writes_and_commit_once() {
        let ledger: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let mut tx = begin(&ledger);
        let id = tx.next_id::<Counter>().await.expect("should draw id");
        tx.stage(&Counter { counter_id: id.clone(), version: 0, count: 1 }).expect("should stage");
        let staged: Counter = tx.load(id.as_str()).await.expect("should load").expect("should see staged");
        assert_eq!(1, staged.count);
        assert_eq!(1, tx.scan::<Counter>().await.expect("should scan").len());
        // nothing visible outside before commit
        assert!(ledger.get(Counter::TABLE, id.as_str()).await.expect("should get").is_none());
        tx.record(DomainEvent::added("counter_added", "counters", id.as_str(), &HashMap::new(), &staged).expect("build event"));
        let events = tx.commit().await.expect("should commit");
        assert_eq!(1, events.len());

        let mut tx = begin(&ledger);
        let mut loaded: Counter = tx.load(id.as_str()).await.expect("should load").expect("should exist");
        assert_eq!(0, loaded.version);
        loaded.count = 2;
        tx.stage(&loaded).expect("should stage");
        tx.commit().await.expect("should commit");
        let stored = ledger.get(Counter::TABLE, id.as_str()).await.expect("should get").expect("should exist");
        assert_eq!(1, stored["version"]);
        assert_eq!(2, stored["count"]);
    }

    #[tokio::test]
    async fn test_should_reject_stale_transaction() {
        let ledger: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let mut setup = begin(&ledger);
        setup.stage(&Counter { counter_id: "CT00001".to_string(), version: 0, count: 0 }).expect("should stage");
        setup.commit().await.expect("should commit");

        let mut first = begin(&ledger);
        let mut second = begin(&ledger);
        let mut a: Counter = first.load("CT00001").await.expect("should load").expect("should exist");
        let mut b: Counter = second.load("CT00001").await.expect("should load").expect("should exist");
        a.count = 10;
        b.count = 20;
        first.stage(&a).expect("should stage");
        second.stage(&b).expect("should stage");
        first.commit().await.expect("first writer wins");
        let err = second.commit().await.expect_err("second writer is stale");
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn test_should_remove_loaded_records_only() {
        let ledger: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let mut setup = begin(&ledger);
        setup.stage(&Counter { counter_id: "CT00001".to_string(), version: 0, count: 0 }).expect("should stage");
        setup.commit().await.expect("should commit");

        let mut tx = begin(&ledger);
        assert!(tx.remove::<Counter>("CT00001").is_err());
        let _: Option<Counter> = tx.load("CT00001").await.expect("should load");
        tx.remove::<Counter>("CT00001").expect("should remove");
        assert!(tx.load::<Counter>("CT00001").await.expect("should load").is_none());
        assert!(tx.scan::<Counter>().await.expect("should scan").is_empty());
        tx.commit().await.expect("should commit");
        assert!(ledger.get(Counter::TABLE, "CT00001").await.expect("should get").is_none());
    }
}
