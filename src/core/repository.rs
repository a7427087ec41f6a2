pub mod ddb_ledger_store;
pub mod memory_ledger_store;

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::core::domain::Identifiable;
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::gateway::GatewayPublisherVia;

// Table names an id-keyed collection and the attribute holding its key.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub key: &'static str,
}

pub const PATRONS_TABLE: Table = Table { name: "patrons", key: "patron_id" };
pub const CATALOG_TABLE: Table = Table { name: "catalog", key: "item_id" };
pub const BORROW_TICKETS_TABLE: Table = Table { name: "borrow_tickets", key: "ticket_id" };
pub const RETURN_TICKETS_TABLE: Table = Table { name: "return_tickets", key: "return_id" };
pub const RESERVATIONS_TABLE: Table = Table { name: "reservations", key: "reservation_id" };
pub const SEQUENCES_TABLE: Table = Table { name: "sequences", key: "table_name" };

pub const LEDGER_TABLES: [Table; 5] = [PATRONS_TABLE, CATALOG_TABLE, BORROW_TICKETS_TABLE,
    RETURN_TICKETS_TABLE, RESERVATIONS_TABLE];

// Entity is a persistent record stored as json in one table, keyed by its id.
pub trait Entity: Identifiable + Serialize + DeserializeOwned + Clone + 'static {
    const TABLE: Table;
    // two-letter type code of generated ids, e.g. BR00001
    const ID_PREFIX: &'static str;
}

// Write is one conditional change of a change set.
#[derive(Debug, PartialEq, Clone)]
pub enum Write {
    // expected_version None means the record must not exist yet
    Put {
        table: Table,
        id: String,
        value: Value,
        expected_version: Option<i64>,
    },
    Delete {
        table: Table,
        id: String,
        expected_version: i64,
    },
}

impl Write {
    pub fn table(&self) -> Table {
        match self {
            Write::Put { table, .. } => *table,
            Write::Delete { table, .. } => *table,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Write::Put { id, .. } => id.as_str(),
            Write::Delete { id, .. } => id.as_str(),
        }
    }
}

// LedgerStore is the storage port: flat json records in id-keyed tables, plus an all-or-nothing commit.
#[async_trait]
pub trait LedgerStore: Sync + Send {
    // get a record
    async fn get(&self, table: Table, id: &str) -> LibraryResult<Option<Value>>;

    // all records of a table
    async fn scan(&self, table: Table) -> LibraryResult<Vec<Value>>;

    // applies every write or none of them; fails when any expected version does not match
    async fn commit(&self, writes: &[Write]) -> LibraryResult<usize>;

    // next value of a monotonic per-table counter, starting at 1
    async fn next_sequence(&self, table: Table) -> LibraryResult<i64>;
}

#[async_trait]
pub trait Repository<T>: Sync + Send {
    // get an entity
    async fn get(&self, id: &str) -> LibraryResult<Option<T>>;

    // find by equality of top-level attributes, ordered by id
    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<T>>;
}

// LedgerRepository reads committed entities outside of a transaction.
pub struct LedgerRepository<E> {
    ledger: Arc<dyn LedgerStore>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> LedgerRepository<E> {
    pub fn new(ledger: Arc<dyn LedgerStore>) -> Self {
        Self {
            ledger,
            _entity: PhantomData,
        }
    }

    // every page of a query
    pub async fn query_all(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<E>> {
        let mut records = vec![];
        let mut page: Option<String> = None;
        loop {
            let res = self.query(predicate, page.as_deref(), 500).await?;
            records.extend(res.records);
            match res.next_page {
                Some(next) => page = Some(next),
                None => break,
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for LedgerRepository<E> {
    async fn get(&self, id: &str) -> LibraryResult<Option<E>> {
        match self.ledger.get(E::TABLE, id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn query(&self, predicate: &HashMap<String, String>,
                   page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<E>> {
        let mut matched = self.ledger.scan(E::TABLE).await?.into_iter()
            .filter(|value| matches_predicate(value, predicate))
            .filter_map(|value| serde_json::from_value::<E>(value).ok())
            .filter(|entity| page.map(|last| entity.id().as_str() > last).unwrap_or(true))
            .collect::<Vec<E>>();
        matched.sort_by_key(|entity| entity.id());
        let next_page = if matched.len() > page_size {
            matched.truncate(page_size);
            matched.last().map(|entity| entity.id())
        } else {
            None
        };
        Ok(PaginatedResult::new(page, page_size, next_page, matched))
    }
}

// matches_predicate compares top-level attributes by their string form.
pub(crate) fn matches_predicate(value: &Value, predicate: &HashMap<String, String>) -> bool {
    predicate.iter().all(|(k, expected)| {
        match value.get(k) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        }
    })
}

// reads the version attribute of a stored record
pub(crate) fn version_of(value: &Value) -> Option<i64> {
    value.get("version").and_then(Value::as_i64)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    Memory,
    DynamoDB,
    LocalDynamoDB,
}

impl RepositoryStore {
    pub fn gateway_publisher(&self) -> GatewayPublisherVia {
        match self {
            RepositoryStore::Memory => { GatewayPublisherVia::Logs }
            RepositoryStore::DynamoDB => { GatewayPublisherVia::Sns }
            RepositoryStore::LocalDynamoDB => { GatewayPublisherVia::Logs }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use crate::core::domain::Identifiable;
    use crate::core::repository::{Entity, LedgerRepository, LedgerStore, matches_predicate, Repository, RepositoryStore, Table, Write};
    use crate::core::repository::memory_ledger_store::MemoryLedgerStore;
    use crate::gateway::GatewayPublisherVia;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Shelf {
        shelf_id: String,
        version: i64,
        floor: String,
    }

    impl Identifiable for Shelf {
        fn id(&self) -> String {
            self.shelf_id.to_string()
        }

        fn version(&self) -> i64 {
            self.version
        }
    }

    impl Entity for Shelf {
        const TABLE: Table = Table { name: "shelves", key: "shelf_id" };
        const ID_PREFIX: &'static str = "SH";
    }

    #[tokio::test]
    async fn test_should_match_predicate() {
        let value = json!({"status": "Borrowed", "count": 2, "flag": true, "none": null});
        assert!(matches_predicate(&value, &HashMap::new()));
        assert!(matches_predicate(&value, &HashMap::from([("status".to_string(), "Borrowed".to_string())])));
        assert!(matches_predicate(&value, &HashMap::from([("count".to_string(), "2".to_string()),
            ("flag".to_string(), "true".to_string())])));
        assert!(!matches_predicate(&value, &HashMap::from([("status".to_string(), "Returned".to_string())])));
        assert!(!matches_predicate(&value, &HashMap::from([("none".to_string(), "null".to_string())])));
        assert!(!matches_predicate(&value, &HashMap::from([("missing".to_string(), "x".to_string())])));
    }

    #[tokio::test]
    async fn test_should_query_pages_in_id_order() {
        let ledger: Arc<dyn LedgerStore> = Arc::new(MemoryLedgerStore::new());
        let writes = (1..=5).map(|i| Write::Put {
            table: Shelf::TABLE,
            id: format!("SH{:05}", i),
            value: json!({"shelf_id": format!("SH{:05}", i), "version": 0, "floor": if i % 2 == 0 { "even" } else { "odd" }}),
            expected_version: None,
        }).collect::<Vec<Write>>();
        ledger.commit(&writes).await.expect("should commit shelves");

        let repo: LedgerRepository<Shelf> = LedgerRepository::new(ledger);
        let first = repo.query(&HashMap::new(), None, 2).await.expect("should query");
        assert_eq!(vec!["SH00001", "SH00002"], first.records.iter().map(|s| s.shelf_id.as_str()).collect::<Vec<&str>>());
        assert_eq!(Some("SH00002".to_string()), first.next_page);
        let second = repo.query(&HashMap::new(), first.next_page.as_deref(), 10).await.expect("should query");
        assert_eq!(3, second.records.len());
        assert_eq!(None, second.next_page);

        let odd = repo.query(&HashMap::from([("floor".to_string(), "odd".to_string())]), None, 10).await.expect("should query");
        assert_eq!(3, odd.records.len());
        assert!(repo.get("SH00003").await.expect("should get").is_some());
        assert!(repo.get("SH00009").await.expect("should get").is_none());
    }

    #[tokio::test]
    async fn test_should_pick_publisher_for_store() {
        assert_eq!(GatewayPublisherVia::Logs, RepositoryStore::Memory.gateway_publisher());
        assert_eq!(GatewayPublisherVia::Sns, RepositoryStore::DynamoDB.gateway_publisher());
        assert_eq!(GatewayPublisherVia::Logs, RepositoryStore::LocalDynamoDB.gateway_publisher());
    }
}
