use std::collections::HashMap;
use chrono::Duration;
use tracing::debug;
use crate::catalog::domain::model::CatalogItemEntity;
use crate::core::domain::Configuration;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryResult, ReservationStatus};
use crate::core::transaction::LendingTransaction;
use crate::reservations::domain::model::ReservationEntity;
use crate::reservations::dto::ReservationDto;

// ReservationLedger keeps the per-item hold slot consistent inside a lending transaction.
// Operations that change an item's availability call sweep before committing.
pub struct ReservationLedger {
    config: Configuration,
}

impl ReservationLedger {
    pub fn new(config: &Configuration) -> Self {
        Self {
            config: config.clone(),
        }
    }

    async fn shelf_copies(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<i64> {
        Ok(match tx.load::<CatalogItemEntity>(item_id).await? {
            Some(item) if !item.deleted => item.available_copies,
            _ => 0,
        })
    }

    pub async fn for_item(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<Vec<ReservationEntity>> {
        Ok(tx.scan::<ReservationEntity>().await?.into_iter()
            .filter(|r| r.item_id == item_id)
            .collect())
    }

    pub async fn cancel_lapsed(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<usize> {
        let now = tx.now();
        let lapsed = self.for_item(tx, item_id).await?.into_iter()
            .filter(|r| r.is_lapsed(now))
            .collect::<Vec<ReservationEntity>>();
        for mut reservation in lapsed.iter().cloned() {
            reservation.reservation_status = ReservationStatus::Cancelled;
            reservation.updated_at = now;
            tx.stage(&reservation)?;
            tx.record(DomainEvent::updated("reservation_expired", "reservations", reservation.reservation_id.as_str(),
                                           &HashMap::new(), &ReservationDto::from(&reservation))?);
            debug!("reservation {} lapsed on {}", reservation.reservation_id, reservation.expires_at);
        }
        Ok(lapsed.len())
    }

    // sweep promotes the oldest pending reservation once a copy is on the shelf
    // and nobody else is already waiting to pick it up
    pub async fn sweep(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<Option<ReservationEntity>> {
        self.cancel_lapsed(tx, item_id).await?;
        let now = tx.now();
        let live = self.for_item(tx, item_id).await?.into_iter()
            .filter(|r| r.is_live(now))
            .collect::<Vec<ReservationEntity>>();
        if live.iter().any(|r| r.reservation_status == ReservationStatus::Ready) {
            return Ok(None);
        }
        if self.shelf_copies(tx, item_id).await? <= 0 {
            return Ok(None);
        }
        let mut next = match live.into_iter()
            .filter(|r| r.reservation_status == ReservationStatus::Pending)
            .min_by_key(|r| (r.created_at, r.reservation_id.clone())) {
            Some(next) => next,
            None => return Ok(None),
        };
        next.reservation_status = ReservationStatus::Ready;
        next.expires_at = now + Duration::days(self.config.reservation_ready_days);
        next.notified = false;
        next.updated_at = now;
        tx.stage(&next)?;
        tx.record(DomainEvent::updated("reservation_promoted", "reservations", next.reservation_id.as_str(),
                                       &HashMap::new(), &ReservationDto::from(&next))?);
        debug!("reservation {} is ready for {}", next.reservation_id, next.patron_id);
        Ok(Some(next))
    }

    pub async fn has_pending(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<bool> {
        let now = tx.now();
        Ok(self.for_item(tx, item_id).await?.iter()
            .any(|r| r.reservation_status == ReservationStatus::Pending && !r.is_lapsed(now)))
    }

    // fulfil closes the patron's own live reservation on an item they just borrowed
    pub async fn fulfil(&self, tx: &mut LendingTransaction, patron_id: &str, item_id: &str,
                        borrow_ticket_id: &str) -> LibraryResult<Option<ReservationEntity>> {
        let now = tx.now();
        let mut own = match self.for_item(tx, item_id).await?.into_iter()
            .find(|r| r.patron_id == patron_id && r.is_live(now)) {
            Some(own) => own,
            None => return Ok(None),
        };
        own.reservation_status = ReservationStatus::Completed;
        own.borrow_ticket_id = Some(borrow_ticket_id.to_string());
        own.updated_at = now;
        tx.stage(&own)?;
        tx.record(DomainEvent::updated("reservation_completed", "reservations", own.reservation_id.as_str(),
                                       &HashMap::new(), &ReservationDto::from(&own))?);
        debug!("reservation {} fulfilled by {}", own.reservation_id, borrow_ticket_id);
        Ok(Some(own))
    }

    // withdraw puts a ready reservation back to pending once its item has no copy left on the shelf
    pub async fn withdraw(&self, tx: &mut LendingTransaction, item_id: &str) -> LibraryResult<Option<ReservationEntity>> {
        if self.shelf_copies(tx, item_id).await? > 0 {
            return Ok(None);
        }
        let now = tx.now();
        let mut ready = match self.for_item(tx, item_id).await?.into_iter()
            .find(|r| r.reservation_status == ReservationStatus::Ready && r.is_live(now)) {
            Some(ready) => ready,
            None => return Ok(None),
        };
        ready.reservation_status = ReservationStatus::Pending;
        ready.expires_at = now + Duration::days(self.config.reservation_hold_days);
        ready.notified = false;
        ready.updated_at = now;
        tx.stage(&ready)?;
        tx.record(DomainEvent::updated("reservation_withdrawn", "reservations", ready.reservation_id.as_str(),
                                       &HashMap::new(), &ReservationDto::from(&ready))?);
        debug!("reservation {} waits again for {}", ready.reservation_id, item_id);
        Ok(Some(ready))
    }
}
