use std::collections::HashMap;
use async_trait::async_trait;
use tracing::{debug, info};
use crate::catalog::domain::CatalogStore;
use crate::catalog::domain::model::CatalogItemEntity;
use crate::catalog::dto::{CatalogItemDto, ItemChanges, ItemStats};
use crate::core::events::DomainEvent;
use crate::core::factory::LibraryContext;
use crate::core::library::{LibraryError, LibraryResult, PaginatedResult, Rule};
use crate::core::repository::{LedgerRepository, Repository};
use crate::core::transaction::LendingTransaction;
use crate::reservations::domain::queue::ReservationLedger;

pub struct CatalogStoreImpl {
    context: LibraryContext,
    item_repository: LedgerRepository<CatalogItemEntity>,
    reservations: ReservationLedger,
}

impl CatalogStoreImpl {
    pub fn new(context: &LibraryContext) -> Self {
        Self {
            context: context.clone(),
            item_repository: LedgerRepository::new(context.ledger.clone()),
            reservations: ReservationLedger::new(&context.config),
        }
    }

    // callers check existence first, so a missing item here is a bug
    async fn load_for_count(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<CatalogItemEntity> {
        tx.load::<CatalogItemEntity>(item_id).await?.ok_or_else(||
            LibraryError::invariant(format!("item {} vanished while counting copies", item_id).as_str()))
    }

    // copies put on the shelf by an edit go to the reservation queue first
    async fn sweep_reservations(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<()> {
        if let Some(promoted) = self.reservations.sweep(tx, item_id).await? {
            info!("reservation {} became ready for item {}", promoted.reservation_id, item_id);
        }
        Ok(())
    }
}

fn check_copies(copies: i64) -> LibraryResult<()> {
    if copies < 0 {
        return Err(LibraryError::rejected(Rule::InvalidField,
                                          format!("copies must not be negative, got {}", copies).as_str()));
    }
    Ok(())
}

#[async_trait]
impl CatalogStore for CatalogStoreImpl {
    async fn add_item(&self, title: &str, category: &str, copies: i64, restricted: bool) -> LibraryResult<CatalogItemDto> {
        check_copies(copies)?;
        let mut tx = self.context.begin();
        let item_id = tx.next_id::<CatalogItemEntity>().await?;
        let item = CatalogItemEntity::new(item_id.as_str(), title, category, copies, restricted, tx.now());
        tx.stage(&item)?;
        let dto = CatalogItemDto::from(&item);
        tx.record(DomainEvent::added("item_added", "catalog", item_id.as_str(), &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("added item {} with {} copies", item_id, copies);
        Ok(dto)
    }

    async fn update_item(&self, id: &str, changes: &ItemChanges) -> LibraryResult<Option<CatalogItemDto>> {
        let mut tx = self.context.begin();
        let mut item = match tx.load::<CatalogItemEntity>(id).await? {
            Some(item) => item,
            None => return Ok(None),
        };
        if let Some(total) = changes.total_copies {
            check_copies(total)?;
            if total != item.total_copies && item.lent_copies() > 0 {
                return Err(LibraryError::rejected(Rule::CopiesOnLoan,
                                                  format!("item {} has {} copies lent out", id, item.lent_copies()).as_str()));
            }
            item.total_copies = total;
            item.available_copies = total;
        }
        if let Some(title) = &changes.title {
            item.title = title.to_string();
        }
        if let Some(category) = &changes.category {
            item.category = category.to_string();
        }
        if let Some(restricted) = changes.restricted {
            item.restricted = restricted;
        }
        item.refresh_status();
        item.updated_at = tx.now();
        tx.stage(&item)?;
        self.sweep_reservations(&mut tx, id).await?;
        let dto = CatalogItemDto::from(&item);
        tx.record(DomainEvent::updated("item_updated", "catalog", id, &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("updated item {}", id);
        Ok(Some(dto))
    }

    async fn remove_item(&self, id: &str) -> LibraryResult<bool> {
        let mut tx = self.context.begin();
        let mut item = match tx.load::<CatalogItemEntity>(id).await? {
            Some(item) => item,
            None => return Ok(false),
        };
        if item.lent_copies() > 0 {
            return Err(LibraryError::rejected(Rule::CopiesOnLoan,
                                              format!("item {} has {} copies lent out", id, item.lent_copies()).as_str()));
        }
        item.deleted = true;
        item.refresh_status();
        item.updated_at = tx.now();
        tx.stage(&item)?;
        tx.record(DomainEvent::deleted("item_removed", "catalog", id, &HashMap::new(), &CatalogItemDto::from(&item))?);
        self.context.commit(tx).await?;
        info!("removed item {}", id);
        Ok(true)
    }

    async fn restore_item(&self, id: &str) -> LibraryResult<Option<CatalogItemDto>> {
        let mut tx = self.context.begin();
        let mut item = match tx.load::<CatalogItemEntity>(id).await? {
            Some(item) => item,
            None => return Ok(None),
        };
        item.deleted = false;
        item.refresh_status();
        item.updated_at = tx.now();
        tx.stage(&item)?;
        self.sweep_reservations(&mut tx, id).await?;
        let dto = CatalogItemDto::from(&item);
        tx.record(DomainEvent::updated("item_restored", "catalog", id, &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("restored item {}", id);
        Ok(Some(dto))
    }

    async fn find_item(&self, id: &str) -> LibraryResult<Option<CatalogItemDto>> {
        Ok(self.item_repository.get(id).await?.map(|item| CatalogItemDto::from(&item)))
    }

    async fn query_items(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CatalogItemDto>> {
        let res = self.item_repository.query(predicate, page, page_size).await?;
        Ok(PaginatedResult::new(res.page.as_deref(), res.page_size, res.next_page,
                                res.records.iter().map(CatalogItemDto::from).collect()))
    }

    async fn item_stats(&self) -> LibraryResult<ItemStats> {
        let items = self.item_repository.query_all(&HashMap::new()).await?;
        let mut stats = ItemStats::default();
        for item in items.iter().filter(|item| !item.deleted) {
            *stats.by_title.entry(item.title.to_string()).or_insert(0) += item.total_copies;
            *stats.by_category.entry(item.category.to_string()).or_insert(0) += item.total_copies;
            *stats.by_status.entry(item.item_status.to_string()).or_insert(0) += item.total_copies;
            *stats.by_restricted.entry(item.restricted.to_string()).or_insert(0) += item.total_copies;
        }
        Ok(stats)
    }

    async fn lookup(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<Option<CatalogItemEntity>> {
        tx.load::<CatalogItemEntity>(item_id).await
    }

    async fn check_lendable(&self, tx: &mut LendingTransaction, item_id: &str, restricted_access: bool) -> LibraryResult<CatalogItemEntity> {
        let item = tx.load::<CatalogItemEntity>(item_id).await?.ok_or_else(||
            LibraryError::rejected(Rule::ItemNotFound, format!("item {} not found", item_id).as_str()))?;
        if item.deleted {
            return Err(LibraryError::rejected(Rule::ItemDeleted, format!("item {} was removed", item_id).as_str()));
        }
        if item.restricted && !restricted_access {
            return Err(LibraryError::rejected(Rule::RestrictedItem,
                                              format!("item {} needs restricted access", item_id).as_str()));
        }
        if item.available_copies <= 0 {
            return Err(LibraryError::rejected(Rule::NoCopyAvailable,
                                              format!("no copy of item {} is available", item_id).as_str()));
        }
        Ok(item)
    }

    async fn acquire_copy(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<()> {
        let mut item = self.load_for_count(tx, item_id).await?;
        item.take_copy()?;
        item.updated_at = tx.now();
        debug!("item {} down to {} of {}", item_id, item.available_copies, item.total_copies);
        tx.stage(&item)
    }

    async fn release_copy(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<()> {
        let mut item = self.load_for_count(tx, item_id).await?;
        item.put_back_copy()?;
        item.updated_at = tx.now();
        debug!("item {} up to {} of {}", item_id, item.available_copies, item.total_copies);
        tx.stage(&item)
    }
}

impl From<&CatalogItemEntity> for CatalogItemDto {
    fn from(other: &CatalogItemEntity) -> Self {
        Self {
            item_id: other.item_id.to_string(),
            version: other.version,
            title: other.title.to_string(),
            category: other.category.to_string(),
            total_copies: other.total_copies,
            available_copies: other.available_copies,
            restricted: other.restricted,
            deleted: other.deleted,
            item_status: other.item_status,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&CatalogItemDto> for CatalogItemEntity {
    fn from(other: &CatalogItemDto) -> Self {
        Self {
            item_id: other.item_id.to_string(),
            version: other.version,
            title: other.title.to_string(),
            category: other.category.to_string(),
            total_copies: other.total_copies,
            available_copies: other.available_copies,
            restricted: other.restricted,
            deleted: other.deleted,
            item_status: other.item_status,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
