pub mod model;
pub mod service;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use crate::core::library::LibraryResult;
use crate::core::transaction::LendingTransaction;
use crate::patrons::domain::model::{HistoryEntry, PatronEntity};
use crate::patrons::dto::{BorrowingStats, PatronChanges, PatronDto, TopBorrower, TypeShares};

#[async_trait]
pub trait PatronRegistry: Sync + Send {
    async fn register_patron(&self, full_name: &str, email: &str) -> LibraryResult<PatronDto>;
    async fn find_patron(&self, id: &str) -> LibraryResult<Option<PatronDto>>;
    async fn update_patron(&self, id: &str, changes: &PatronChanges) -> LibraryResult<Option<PatronDto>>;
    async fn remove_patron(&self, id: &str) -> LibraryResult<bool>;
    async fn suspend_patron(&self, id: &str, reason: &str) -> LibraryResult<Option<PatronDto>>;
    async fn renew_membership(&self, id: &str) -> LibraryResult<Option<PatronDto>>;
    async fn restore_patron(&self, id: &str, paid_fine: bool, paid_annual_fee: bool) -> LibraryResult<Option<PatronDto>>;
    async fn patrons_with_fines(&self) -> LibraryResult<Vec<PatronDto>>;
    async fn patrons_with_overdue_loans(&self) -> LibraryResult<Vec<PatronDto>>;

    async fn borrowing_stats(&self) -> LibraryResult<BorrowingStats>;
    // patrons holding the most items right now, at most `limit` of them
    async fn top_borrowers(&self, limit: usize) -> LibraryResult<Vec<TopBorrower>>;
    async fn borrowing_by_patron_type(&self) -> LibraryResult<TypeShares>;

    // The operations below stage their changes in the caller's transaction.

    async fn lookup(&self, tx: &mut LendingTransaction, patron_id: &str) -> LibraryResult<Option<PatronEntity>>;

    // checks that the patron may take `count` more items; returns the patron as loaded
    async fn check_eligibility(&self, tx: &mut LendingTransaction, patron_id: &str, count: usize) -> LibraryResult<PatronEntity>;

    async fn record_borrow(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str, item_id: &str,
                           borrow_date: NaiveDateTime, due_date: NaiveDateTime) -> LibraryResult<()>;

    // marks the line returned and returns the fine charged for it
    async fn record_return(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str, item_id: &str,
                           return_date: NaiveDateTime) -> LibraryResult<i64>;

    async fn cancel_borrow(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str, item_id: &str) -> LibraryResult<()>;

    // undoes record_return and returns the fine taken back
    async fn reinstate_return(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str, item_id: &str) -> LibraryResult<i64>;

    async fn extend_loans(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str,
                          new_due_date: NaiveDateTime) -> LibraryResult<usize>;

    // lines of one borrow ticket that were not cancelled
    async fn ticket_lines(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str) -> LibraryResult<Vec<HistoryEntry>>;
}
