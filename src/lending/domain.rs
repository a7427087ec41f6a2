pub mod model;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::core::transaction::LendingTransaction;
use crate::lending::domain::model::BorrowTicketEntity;
use crate::lending::dto::{BorrowTicketDto, BorrowedItemStats, ReturnTicketDto};

// LendingEngine runs every borrow, return and extension as one atomic transaction
// across patrons, catalog items and tickets.
#[async_trait]
pub trait LendingEngine: Sync + Send {
    async fn borrow(&self, patron_id: &str, item_ids: &[String]) -> LibraryResult<BorrowTicketDto>;

    // replaces the items of a borrowed ticket, keeping its id and dates
    async fn update_borrow(&self, ticket_id: &str, item_ids: &[String]) -> LibraryResult<Option<BorrowTicketDto>>;
    async fn delete_borrow(&self, ticket_id: &str) -> LibraryResult<bool>;

    async fn return_items(&self, ticket_id: &str, item_ids: &[String]) -> LibraryResult<ReturnTicketDto>;
    async fn update_return(&self, return_id: &str, item_ids: &[String]) -> LibraryResult<Option<ReturnTicketDto>>;
    async fn delete_return(&self, return_id: &str) -> LibraryResult<bool>;

    async fn extend(&self, ticket_id: &str) -> LibraryResult<BorrowTicketDto>;

    async fn find_borrow_ticket(&self, ticket_id: &str) -> LibraryResult<Option<BorrowTicketDto>>;
    async fn find_return_ticket(&self, return_id: &str) -> LibraryResult<Option<ReturnTicketDto>>;
    async fn query_unreturned(&self) -> LibraryResult<Vec<BorrowTicketDto>>;
    async fn query_overdue(&self) -> LibraryResult<Vec<BorrowTicketDto>>;
    async fn find_tickets_by_patron(&self, patron_id: &str) -> LibraryResult<Vec<BorrowTicketDto>>;
    async fn find_returns_by_ticket(&self, ticket_id: &str) -> LibraryResult<Vec<ReturnTicketDto>>;
    async fn borrowed_item_stats(&self) -> LibraryResult<BorrowedItemStats>;

    // validates and stages a borrow inside the caller's transaction without committing
    async fn stage_borrow(&self, tx: &mut LendingTransaction, patron_id: &str, item_ids: &[String]) -> LibraryResult<BorrowTicketEntity>;
}
