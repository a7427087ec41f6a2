pub mod model;
pub mod service;

use std::collections::HashMap;
use async_trait::async_trait;
use crate::catalog::domain::model::CatalogItemEntity;
use crate::catalog::dto::{CatalogItemDto, ItemChanges, ItemStats};
use crate::core::library::{LibraryResult, PaginatedResult};
use crate::core::transaction::LendingTransaction;

#[async_trait]
pub trait CatalogStore: Sync + Send {
    async fn add_item(&self, title: &str, category: &str, copies: i64, restricted: bool) -> LibraryResult<CatalogItemDto>;
    async fn update_item(&self, id: &str, changes: &ItemChanges) -> LibraryResult<Option<CatalogItemDto>>;
    // soft delete
    async fn remove_item(&self, id: &str) -> LibraryResult<bool>;
    async fn restore_item(&self, id: &str) -> LibraryResult<Option<CatalogItemDto>>;
    async fn find_item(&self, id: &str) -> LibraryResult<Option<CatalogItemDto>>;
    async fn query_items(&self, predicate: &HashMap<String, String>,
                         page: Option<&str>, page_size: usize) -> LibraryResult<PaginatedResult<CatalogItemDto>>;
    // copies of the items still in the catalog
    async fn item_stats(&self) -> LibraryResult<ItemStats>;

    async fn lookup(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<Option<CatalogItemEntity>>;

    // checks that one copy of the item may go to a patron with the given access
    async fn check_lendable(&self, tx: &mut LendingTransaction, item_id: &str, restricted_access: bool) -> LibraryResult<CatalogItemEntity>;

    async fn acquire_copy(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<()>;
    async fn release_copy(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<()>;
}
