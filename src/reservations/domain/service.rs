use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{info, warn};
use crate::catalog::domain::CatalogStore;
use crate::core::events::DomainEvent;
use crate::core::factory::LibraryContext;
use crate::core::library::{LibraryError, LibraryResult, ReservationStatus, Rule};
use crate::core::repository::{LedgerRepository, Repository};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::BorrowTicketDto;
use crate::patrons::domain::PatronRegistry;
use crate::reservations::domain::model::ReservationEntity;
use crate::reservations::domain::queue::ReservationLedger;
use crate::reservations::domain::ReservationQueue;
use crate::reservations::dto::{CompletedReservation, ExpiryOutcome, ReadyNotice, ReservationDto};

pub struct ReservationQueueImpl {
    context: LibraryContext,
    patron_registry: Arc<dyn PatronRegistry>,
    catalog_store: Arc<dyn CatalogStore>,
    lending_engine: Arc<dyn LendingEngine>,
    ledger: ReservationLedger,
    reservation_repository: LedgerRepository<ReservationEntity>,
}

impl ReservationQueueImpl {
    pub fn new(context: &LibraryContext, patron_registry: Arc<dyn PatronRegistry>,
               catalog_store: Arc<dyn CatalogStore>, lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            context: context.clone(),
            patron_registry,
            ledger: ReservationLedger::new(&context.config),
            catalog_store,
            lending_engine,
            reservation_repository: LedgerRepository::new(context.ledger.clone()),
        }
    }

    // live reservations in the given state, oldest first
    async fn query_live(&self, status: ReservationStatus, patron_id: Option<&str>) -> LibraryResult<Vec<ReservationDto>> {
        let mut predicate = HashMap::from([("reservation_status".to_string(), status.to_string())]);
        if let Some(patron_id) = patron_id {
            predicate.insert("patron_id".to_string(), patron_id.to_string());
        }
        let now = self.context.clock.now();
        let mut live = self.reservation_repository.query_all(&predicate).await?.into_iter()
            .filter(|r| r.is_live(now))
            .collect::<Vec<ReservationEntity>>();
        live.sort_by(|a, b| (a.created_at, &a.reservation_id).cmp(&(b.created_at, &b.reservation_id)));
        Ok(live.iter().map(ReservationDto::from).collect())
    }
}

#[async_trait]
impl ReservationQueue for ReservationQueueImpl {
    async fn reserve(&self, patron_id: &str, item_id: &str) -> LibraryResult<ReservationDto> {
        let mut tx = self.context.begin();
        let now = tx.now();
        let patron = self.patron_registry.lookup(&mut tx, patron_id).await?.ok_or_else(||
            LibraryError::rejected(Rule::PatronNotFound, format!("patron {} not found", patron_id).as_str()))?;
        let pending = tx.scan::<ReservationEntity>().await?.iter()
            .filter(|r| r.patron_id == patron_id && r.reservation_status == ReservationStatus::Pending && !r.is_lapsed(now))
            .count();
        if pending >= self.context.config.max_pending_reservations {
            return Err(LibraryError::rejected(Rule::ReservationLimitReached,
                                              format!("patron {} already has {} pending reservations", patron_id, pending).as_str()));
        }
        let item = self.catalog_store.lookup(&mut tx, item_id).await?.ok_or_else(||
            LibraryError::rejected(Rule::ItemNotFound, format!("item {} not found", item_id).as_str()))?;
        if item.deleted {
            return Err(LibraryError::rejected(Rule::ItemDeleted, format!("item {} was removed", item_id).as_str()));
        }
        if item.available_copies > 0 {
            return Err(LibraryError::rejected(Rule::ItemAvailable,
                                              format!("item {} has {} copies on the shelf", item_id, item.available_copies).as_str()));
        }
        if patron.is_holding(item_id) {
            return Err(LibraryError::rejected(Rule::ItemAlreadyHeld,
                                              format!("patron {} is already borrowing {}", patron_id, item_id).as_str()));
        }
        self.ledger.cancel_lapsed(&mut tx, item_id).await?;
        if self.ledger.for_item(&mut tx, item_id).await?.iter().any(|r| r.is_live(now)) {
            return Err(LibraryError::rejected(Rule::ItemAlreadyReserved,
                                              format!("item {} is already reserved", item_id).as_str()));
        }
        let reservation_id = tx.next_id::<ReservationEntity>().await?;
        let reservation = ReservationEntity::new(reservation_id.as_str(), patron_id, item_id,
                                                 self.context.config.reservation_hold_days, now);
        tx.stage(&reservation)?;
        let dto = ReservationDto::from(&reservation);
        tx.record(DomainEvent::added("reservation_created", "reservations", reservation_id.as_str(), &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("patron {} reserved {} as {}", patron_id, item_id, reservation_id);
        Ok(dto)
    }

    async fn cancel(&self, reservation_id: &str) -> LibraryResult<bool> {
        let mut tx = self.context.begin();
        let mut reservation = match tx.load::<ReservationEntity>(reservation_id).await? {
            Some(reservation) => reservation,
            None => return Ok(false),
        };
        if reservation.reservation_status != ReservationStatus::Pending {
            return Err(LibraryError::rejected(Rule::ReservationNotPending,
                                              format!("reservation {} is {}", reservation_id, reservation.reservation_status).as_str()));
        }
        reservation.reservation_status = ReservationStatus::Cancelled;
        reservation.updated_at = tx.now();
        tx.stage(&reservation)?;
        tx.record(DomainEvent::updated("reservation_cancelled", "reservations", reservation_id, &HashMap::new(),
                                       &ReservationDto::from(&reservation))?);
        self.context.commit(tx).await?;
        info!("cancelled reservation {}", reservation_id);
        Ok(true)
    }

    async fn complete(&self, reservation_id: &str) -> LibraryResult<Option<CompletedReservation>> {
        let mut tx = self.context.begin();
        let reservation = match tx.load::<ReservationEntity>(reservation_id).await? {
            Some(reservation) => reservation,
            None => return Ok(None),
        };
        if reservation.reservation_status != ReservationStatus::Ready {
            return Err(LibraryError::rejected(Rule::ReservationNotReady,
                                              format!("reservation {} is {}", reservation_id, reservation.reservation_status).as_str()));
        }
        if reservation.is_lapsed(tx.now()) {
            return Err(LibraryError::rejected(Rule::ReservationLapsed,
                                              format!("reservation {} lapsed on {}", reservation_id, reservation.expires_at).as_str()));
        }
        let item_id = reservation.item_id.clone();
        let on_shelf = self.catalog_store.lookup(&mut tx, item_id.as_str()).await?
            .map(|item| item.available_copies > 0)
            .unwrap_or(false);
        if !on_shelf {
            return Err(LibraryError::rejected(Rule::NoCopyAvailable,
                                              format!("item {} is no longer on the shelf", item_id).as_str()));
        }
        // the borrow closes the patron's own ready reservation
        let ticket = self.lending_engine.stage_borrow(&mut tx, reservation.patron_id.as_str(), &[item_id]).await?;
        let reservation = tx.load::<ReservationEntity>(reservation_id).await?
            .filter(|r| r.borrow_ticket_id.as_deref() == Some(ticket.ticket_id.as_str()))
            .ok_or_else(|| LibraryError::invariant(
                format!("ticket {} did not close reservation {}", ticket.ticket_id, reservation_id).as_str()))?;
        let completed = CompletedReservation {
            reservation: ReservationDto::from(&reservation),
            ticket: BorrowTicketDto::from(&ticket),
        };
        self.context.commit(tx).await?;
        info!("reservation {} completed with ticket {}", reservation_id, ticket.ticket_id);
        Ok(Some(completed))
    }

    async fn sweep(&self, item_id: &str) -> LibraryResult<Option<ReservationDto>> {
        let mut tx = self.context.begin();
        let promoted = self.ledger.sweep(&mut tx, item_id).await?;
        self.context.commit(tx).await?;
        Ok(promoted.as_ref().map(ReservationDto::from))
    }

    async fn notify_ready(&self) -> LibraryResult<Vec<ReadyNotice>> {
        let mut tx = self.context.begin();
        let now = tx.now();
        let waiting = tx.scan::<ReservationEntity>().await?.into_iter()
            .filter(|r| r.reservation_status == ReservationStatus::Ready && !r.notified && !r.is_lapsed(now))
            .collect::<Vec<ReservationEntity>>();
        let mut notices = vec![];
        for mut reservation in waiting {
            let patron = match self.patron_registry.lookup(&mut tx, reservation.patron_id.as_str()).await? {
                Some(patron) => patron,
                None => {
                    warn!("reservation {} belongs to missing patron {}", reservation.reservation_id, reservation.patron_id);
                    continue;
                }
            };
            let title = self.catalog_store.lookup(&mut tx, reservation.item_id.as_str()).await?
                .map(|item| item.title)
                .unwrap_or_else(|| reservation.item_id.to_string());
            let notice = ReadyNotice {
                reservation_id: reservation.reservation_id.to_string(),
                patron_id: patron.patron_id.to_string(),
                email: patron.email.to_string(),
                item_id: reservation.item_id.to_string(),
                message: format!("Dear {}, \"{}\" is ready for pickup until {}.",
                                 patron.full_name, title, reservation.expires_at.format("%Y-%m-%d")),
                title,
                pickup_by: reservation.expires_at,
            };
            reservation.notified = true;
            reservation.updated_at = now;
            tx.stage(&reservation)?;
            let metadata = HashMap::from([("email".to_string(), patron.email.to_string())]);
            tx.record(DomainEvent::updated("reservation_ready", "reservations", reservation.reservation_id.as_str(),
                                           &metadata, &notice)?);
            notices.push(notice);
        }
        self.context.commit(tx).await?;
        info!("sent {} ready notices", notices.len());
        Ok(notices)
    }

    async fn expire_lapsed(&self) -> LibraryResult<ExpiryOutcome> {
        let mut tx = self.context.begin();
        let now = tx.now();
        let lapsed = tx.scan::<ReservationEntity>().await?.into_iter()
            .filter(|r| r.is_lapsed(now))
            .collect::<Vec<ReservationEntity>>();
        let items = lapsed.iter().map(|r| r.item_id.to_string()).collect::<BTreeSet<String>>();
        let mut outcome = ExpiryOutcome::default();
        for item_id in &items {
            if let Some(promoted) = self.ledger.sweep(&mut tx, item_id).await? {
                outcome.promoted.push(ReservationDto::from(&promoted));
            }
        }
        for mut reservation in lapsed {
            reservation.reservation_status = ReservationStatus::Cancelled;
            reservation.updated_at = now;
            outcome.expired.push(ReservationDto::from(&reservation));
        }
        self.context.commit(tx).await?;
        info!("expired {} reservations, promoted {}", outcome.expired.len(), outcome.promoted.len());
        Ok(outcome)
    }

    async fn find_reservation(&self, reservation_id: &str) -> LibraryResult<Option<ReservationDto>> {
        Ok(self.reservation_repository.get(reservation_id).await?.map(|r| ReservationDto::from(&r)))
    }

    async fn query_pending(&self, patron_id: Option<&str>) -> LibraryResult<Vec<ReservationDto>> {
        self.query_live(ReservationStatus::Pending, patron_id).await
    }

    async fn query_ready(&self, patron_id: Option<&str>) -> LibraryResult<Vec<ReservationDto>> {
        self.query_live(ReservationStatus::Ready, patron_id).await
    }
}

impl From<&ReservationEntity> for ReservationDto {
    fn from(other: &ReservationEntity) -> Self {
        Self {
            reservation_id: other.reservation_id.to_string(),
            version: other.version,
            patron_id: other.patron_id.to_string(),
            item_id: other.item_id.to_string(),
            reservation_status: other.reservation_status,
            notified: other.notified,
            borrow_ticket_id: other.borrow_ticket_id.clone(),
            created_at: other.created_at,
            expires_at: other.expires_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&ReservationDto> for ReservationEntity {
    fn from(other: &ReservationDto) -> Self {
        Self {
            reservation_id: other.reservation_id.to_string(),
            version: other.version,
            patron_id: other.patron_id.to_string(),
            item_id: other.item_id.to_string(),
            reservation_status: other.reservation_status,
            notified: other.notified,
            borrow_ticket_id: other.borrow_ticket_id.clone(),
            created_at: other.created_at,
            expires_at: other.expires_at,
            updated_at: other.updated_at,
        }
    }
}
