pub mod model;
pub mod queue;
pub mod service;

use async_trait::async_trait;
use crate::core::library::LibraryResult;
use crate::reservations::dto::{CompletedReservation, ExpiryOutcome, ReadyNotice, ReservationDto};

// ReservationQueue keeps at most one active hold per unavailable item and hands the
// item to its holder once a copy comes back.
#[async_trait]
pub trait ReservationQueue: Sync + Send {
    async fn reserve(&self, patron_id: &str, item_id: &str) -> LibraryResult<ReservationDto>;

    // only pending reservations can be cancelled
    async fn cancel(&self, reservation_id: &str) -> LibraryResult<bool>;

    // borrows the reserved item for its holder in the same transaction
    async fn complete(&self, reservation_id: &str) -> LibraryResult<Option<CompletedReservation>>;

    async fn sweep(&self, item_id: &str) -> LibraryResult<Option<ReservationDto>>;
    async fn notify_ready(&self) -> LibraryResult<Vec<ReadyNotice>>;
    async fn expire_lapsed(&self) -> LibraryResult<ExpiryOutcome>;

    async fn find_reservation(&self, reservation_id: &str) -> LibraryResult<Option<ReservationDto>>;
    async fn query_pending(&self, patron_id: Option<&str>) -> LibraryResult<Vec<ReservationDto>>;
    async fn query_ready(&self, patron_id: Option<&str>) -> LibraryResult<Vec<ReservationDto>>;
}
