use std::sync::Arc;
use tracing::{info, warn};
use crate::core::clock::{Clock, SystemClock};
use crate::core::domain::Configuration;
use crate::core::library::LibraryResult;
use crate::core::repository::ddb_ledger_store::DDBLedgerStore;
use crate::core::repository::memory_ledger_store::MemoryLedgerStore;
use crate::core::repository::{LedgerStore, RepositoryStore};
use crate::core::transaction::LendingTransaction;
use crate::gateway::events::{EventPublisher, publish_all};
use crate::gateway::factory::create_publisher;
use crate::gateway::logs::publisher::LogPublisher;
use crate::utils::ddb::build_db_client;

pub async fn create_ledger_store(store: RepositoryStore) -> Arc<dyn LedgerStore> {
    match store {
        RepositoryStore::Memory => {
            Arc::new(MemoryLedgerStore::new())
        }
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Arc::new(DDBLedgerStore::new(client))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            let ledger = DDBLedgerStore::new(client);
            if let Err(err) = ledger.create_tables().await {
                warn!("failed to create local tables: {}", err);
            }
            Arc::new(ledger)
        }
    }
}

// Shared by every service of a branch.
#[derive(Clone)]
pub struct LibraryContext {
    pub config: Configuration,
    pub ledger: Arc<dyn LedgerStore>,
    pub clock: Arc<dyn Clock>,
    pub publisher: Arc<dyn EventPublisher>,
}

impl LibraryContext {
    pub async fn new(config: &Configuration, store: RepositoryStore) -> Self {
        LibraryContext {
            config: config.clone(),
            ledger: create_ledger_store(store).await,
            clock: Arc::new(SystemClock),
            publisher: create_publisher(store.gateway_publisher()).await,
        }
    }

    pub fn in_memory(config: &Configuration, clock: Arc<dyn Clock>) -> Self {
        LibraryContext {
            config: config.clone(),
            ledger: Arc::new(MemoryLedgerStore::new()),
            clock,
            publisher: Arc::new(LogPublisher::new()),
        }
    }

    pub fn begin(&self) -> LendingTransaction {
        LendingTransaction::begin(self.ledger.clone(), self.clock.now())
    }

    // commit writes the change set, then publishes its events
    pub async fn commit(&self, tx: LendingTransaction) -> LibraryResult<()> {
        let events = tx.commit().await?;
        let delivered = publish_all(self.publisher.as_ref(), &events).await;
        info!("committed transaction with {} of {} events published", delivered, events.len());
        Ok(())
    }
}
