use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info, warn};
use crate::catalog::domain::CatalogStore;
use crate::catalog::domain::model::CatalogItemEntity;
use crate::core::events::DomainEvent;
use crate::core::factory::LibraryContext;
use crate::core::library::{LibraryError, LibraryResult, LoanStatus, Rule, TicketStatus};
use crate::core::repository::{LedgerRepository, Repository};
use crate::core::transaction::LendingTransaction;
use crate::lending::domain::LendingEngine;
use crate::lending::domain::model::{BorrowTicketEntity, ReturnTicketEntity};
use crate::lending::dto::{BorrowTicketDto, BorrowedItemStats, ReturnTicketDto};
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::domain::PatronRegistry;
use crate::reservations::domain::queue::ReservationLedger;

pub struct LendingEngineImpl {
    context: LibraryContext,
    patron_registry: Arc<dyn PatronRegistry>,
    catalog_store: Arc<dyn CatalogStore>,
    reservations: ReservationLedger,
    ticket_repository: LedgerRepository<BorrowTicketEntity>,
    return_repository: LedgerRepository<ReturnTicketEntity>,
    patron_repository: LedgerRepository<PatronEntity>,
    item_repository: LedgerRepository<CatalogItemEntity>,
}

// item lists must be non-empty and name each item once
fn check_item_list(item_ids: &[String]) -> LibraryResult<()> {
    if item_ids.is_empty() {
        return Err(LibraryError::rejected(Rule::EmptyItemList, "no items given"));
    }
    let mut seen = HashSet::new();
    for item_id in item_ids {
        if !seen.insert(item_id.as_str()) {
            return Err(LibraryError::rejected(Rule::DuplicateItem,
                                              format!("item {} is listed twice", item_id).as_str()));
        }
    }
    Ok(())
}

impl LendingEngineImpl {
    pub fn new(context: &LibraryContext, patron_registry: Arc<dyn PatronRegistry>,
               catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            context: context.clone(),
            patron_registry,
            reservations: ReservationLedger::new(&context.config),
            catalog_store,
            ticket_repository: LedgerRepository::new(context.ledger.clone()),
            return_repository: LedgerRepository::new(context.ledger.clone()),
            patron_repository: LedgerRepository::new(context.ledger.clone()),
            item_repository: LedgerRepository::new(context.ledger.clone()),
        }
    }

    // checks the patron and every item before anything is staged
    async fn validate_borrow(&self, tx: &mut LendingTransaction, patron_id: &str, item_ids: &[String]) -> LibraryResult<PatronEntity> {
        check_item_list(item_ids)?;
        let patron = self.patron_registry.check_eligibility(tx, patron_id, item_ids.len()).await?;
        for item_id in item_ids {
            self.catalog_store.check_lendable(tx, item_id, patron.restricted_access).await?;
        }
        Ok(patron)
    }

    async fn lend_items(&self, tx: &mut LendingTransaction, ticket: &BorrowTicketEntity, item_ids: &[String]) -> LibraryResult<()> {
        for item_id in item_ids {
            self.catalog_store.acquire_copy(tx, item_id).await?;
            self.patron_registry.record_borrow(tx, ticket.patron_id.as_str(), ticket.ticket_id.as_str(), item_id,
                                               ticket.borrow_date, ticket.due_date).await?;
            if let Some(own) = self.reservations.fulfil(tx, ticket.patron_id.as_str(), item_id, ticket.ticket_id.as_str()).await? {
                debug!("ticket {} closes reservation {}", ticket.ticket_id, own.reservation_id);
            }
        }
        Ok(())
    }

    async fn release_items(&self, tx: &mut LendingTransaction, ticket: &BorrowTicketEntity) -> LibraryResult<()> {
        for item_id in &ticket.item_ids {
            self.patron_registry.cancel_borrow(tx, ticket.patron_id.as_str(), ticket.ticket_id.as_str(), item_id).await?;
            self.catalog_store.release_copy(tx, item_id).await?;
        }
        Ok(())
    }

    async fn sweep_items(&self, tx: &mut LendingTransaction, item_ids: &[String]) -> LibraryResult<()> {
        for item_id in item_ids {
            if let Some(promoted) = self.reservations.sweep(tx, item_id).await? {
                info!("reservation {} became ready for item {}", promoted.reservation_id, item_id);
            }
        }
        Ok(())
    }

    // a borrow ticket can only be edited while nothing on it was returned
    async fn load_editable(&self, tx: &mut LendingTransaction, ticket_id: &str) -> LibraryResult<Option<BorrowTicketEntity>> {
        let ticket = match tx.load::<BorrowTicketEntity>(ticket_id).await? {
            Some(ticket) => ticket,
            None => return Ok(None),
        };
        if ticket.ticket_status != TicketStatus::Borrowed {
            return Err(LibraryError::rejected(Rule::TicketNotBorrowed,
                                              format!("ticket {} is {}", ticket_id, ticket.ticket_status).as_str()));
        }
        let lines = self.patron_registry.ticket_lines(tx, ticket.patron_id.as_str(), ticket_id).await?;
        if lines.iter().any(|line| line.status == LoanStatus::Returned) {
            return Err(LibraryError::rejected(Rule::TicketHasReturns,
                                              format!("ticket {} has returned items, delete its return tickets first", ticket_id).as_str()));
        }
        Ok(Some(ticket))
    }

    async fn load_borrowed(&self, tx: &mut LendingTransaction, ticket_id: &str) -> LibraryResult<BorrowTicketEntity> {
        let ticket = tx.load::<BorrowTicketEntity>(ticket_id).await?.ok_or_else(||
            LibraryError::rejected(Rule::TicketNotFound, format!("ticket {} not found", ticket_id).as_str()))?;
        if ticket.ticket_status != TicketStatus::Borrowed {
            return Err(LibraryError::rejected(Rule::TicketNotBorrowed,
                                              format!("ticket {} is {}", ticket_id, ticket.ticket_status).as_str()));
        }
        Ok(ticket)
    }

    async fn refresh_status(&self, tx: &mut LendingTransaction, ticket: &mut BorrowTicketEntity) -> LibraryResult<()> {
        let lines = self.patron_registry.ticket_lines(tx, ticket.patron_id.as_str(), ticket.ticket_id.as_str()).await?;
        ticket.ticket_status = if lines.iter().any(|line| line.status == LoanStatus::Borrowed) {
            TicketStatus::Borrowed
        } else {
            TicketStatus::Returned
        };
        Ok(())
    }

    // returns the items of a borrowed ticket and yields the fine charged
    async fn apply_return(&self, tx: &mut LendingTransaction, ticket: &mut BorrowTicketEntity, item_ids: &[String],
                          return_date: NaiveDateTime) -> LibraryResult<i64> {
        check_item_list(item_ids)?;
        let lines = self.patron_registry.ticket_lines(tx, ticket.patron_id.as_str(), ticket.ticket_id.as_str()).await?;
        for item_id in item_ids {
            if !ticket.covers(item_id) {
                return Err(LibraryError::rejected(Rule::ItemNotOnTicket,
                                                  format!("item {} is not on ticket {}", item_id, ticket.ticket_id).as_str()));
            }
            if !lines.iter().any(|line| &line.item_id == item_id && line.status == LoanStatus::Borrowed) {
                return Err(LibraryError::rejected(Rule::ItemNotOutstanding,
                                                  format!("item {} of ticket {} was already returned", item_id, ticket.ticket_id).as_str()));
            }
        }
        let mut total_fine = 0;
        for item_id in item_ids {
            total_fine += self.patron_registry.record_return(tx, ticket.patron_id.as_str(), ticket.ticket_id.as_str(),
                                                             item_id, return_date).await?;
            self.catalog_store.release_copy(tx, item_id).await?;
        }
        self.sweep_items(tx, item_ids).await?;
        self.refresh_status(tx, ticket).await?;
        ticket.updated_at = tx.now();
        tx.stage(&*ticket)?;
        Ok(total_fine)
    }

    // undoes a return ticket; the items go back on loan under their borrow ticket
    async fn reverse_return(&self, tx: &mut LendingTransaction, ret: &ReturnTicketEntity) -> LibraryResult<BorrowTicketEntity> {
        let mut ticket = tx.load::<BorrowTicketEntity>(ret.borrow_ticket_id.as_str()).await?.ok_or_else(||
            LibraryError::invariant(format!("return {} points at missing ticket {}", ret.return_id, ret.borrow_ticket_id).as_str()))?;
        for item_id in &ret.item_ids {
            let on_shelf = self.catalog_store.lookup(tx, item_id).await?
                .map(|item| item.available_copies > 0)
                .unwrap_or(false);
            if !on_shelf {
                return Err(LibraryError::rejected(Rule::NoCopyAvailable,
                                                  format!("item {} has been lent out again", item_id).as_str()));
            }
        }
        let mut reversed_fine = 0;
        for item_id in &ret.item_ids {
            self.catalog_store.acquire_copy(tx, item_id).await?;
            reversed_fine += self.patron_registry.reinstate_return(tx, ret.patron_id.as_str(),
                                                                   ret.borrow_ticket_id.as_str(), item_id).await?;
            // the copy may have been promised to a ready reservation since the return
            if let Some(withdrawn) = self.reservations.withdraw(tx, item_id).await? {
                info!("reservation {} waits again for item {}", withdrawn.reservation_id, item_id);
            }
        }
        debug!("reversed return {} taking back a fine of {}", ret.return_id, reversed_fine);
        ticket.ticket_status = TicketStatus::Borrowed;
        ticket.updated_at = tx.now();
        tx.stage(&ticket)?;
        Ok(ticket)
    }

    async fn find_tickets(&self, predicate: HashMap<String, String>) -> LibraryResult<Vec<BorrowTicketEntity>> {
        self.ticket_repository.query_all(&predicate).await
    }
}

#[async_trait]
impl LendingEngine for LendingEngineImpl {
    async fn borrow(&self, patron_id: &str, item_ids: &[String]) -> LibraryResult<BorrowTicketDto> {
        let mut tx = self.context.begin();
        let ticket = self.stage_borrow(&mut tx, patron_id, item_ids).await?;
        self.context.commit(tx).await?;
        info!("patron {} borrowed {} items on {}", patron_id, item_ids.len(), ticket.ticket_id);
        Ok(BorrowTicketDto::from(&ticket))
    }

    async fn update_borrow(&self, ticket_id: &str, item_ids: &[String]) -> LibraryResult<Option<BorrowTicketDto>> {
        let mut tx = self.context.begin();
        let mut ticket = match self.load_editable(&mut tx, ticket_id).await? {
            Some(ticket) => ticket,
            None => return Ok(None),
        };
        check_item_list(item_ids)?;
        let was_extended = self.patron_registry.ticket_lines(&mut tx, ticket.patron_id.as_str(), ticket_id).await?
            .iter().any(|line| line.extended);
        let old_items = ticket.item_ids.clone();
        self.release_items(&mut tx, &ticket).await?;
        self.validate_borrow(&mut tx, ticket.patron_id.as_str(), item_ids).await?;
        ticket.item_ids = item_ids.to_vec();
        self.lend_items(&mut tx, &ticket, item_ids).await?;
        if was_extended {
            self.patron_registry.extend_loans(&mut tx, ticket.patron_id.as_str(), ticket_id, ticket.due_date).await?;
        }
        self.sweep_items(&mut tx, &old_items).await?;
        ticket.updated_at = tx.now();
        tx.stage(&ticket)?;
        let dto = BorrowTicketDto::from(&ticket);
        tx.record(DomainEvent::updated("borrow_ticket_updated", "lending", ticket_id, &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("ticket {} now covers {:?}", ticket_id, item_ids);
        Ok(Some(dto))
    }

    async fn delete_borrow(&self, ticket_id: &str) -> LibraryResult<bool> {
        let mut tx = self.context.begin();
        let ticket = match self.load_editable(&mut tx, ticket_id).await? {
            Some(ticket) => ticket,
            None => return Ok(false),
        };
        self.release_items(&mut tx, &ticket).await?;
        self.sweep_items(&mut tx, &ticket.item_ids).await?;
        tx.remove::<BorrowTicketEntity>(ticket_id)?;
        tx.record(DomainEvent::deleted("borrow_ticket_deleted", "lending", ticket_id, &HashMap::new(),
                                       &BorrowTicketDto::from(&ticket))?);
        self.context.commit(tx).await?;
        info!("deleted ticket {}", ticket_id);
        Ok(true)
    }

    async fn return_items(&self, ticket_id: &str, item_ids: &[String]) -> LibraryResult<ReturnTicketDto> {
        let mut tx = self.context.begin();
        let mut ticket = self.load_borrowed(&mut tx, ticket_id).await?;
        let now = tx.now();
        let total_fine = self.apply_return(&mut tx, &mut ticket, item_ids, now).await?;
        let return_id = tx.next_id::<ReturnTicketEntity>().await?;
        let ret = ReturnTicketEntity::new(return_id.as_str(), &ticket, item_ids, now, total_fine, now);
        tx.stage(&ret)?;
        let dto = ReturnTicketDto::from(&ret);
        tx.record(DomainEvent::added("items_returned", "lending", return_id.as_str(), &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("ticket {} returned {} items with fine {}", ticket_id, item_ids.len(), total_fine);
        Ok(dto)
    }

    async fn update_return(&self, return_id: &str, item_ids: &[String]) -> LibraryResult<Option<ReturnTicketDto>> {
        let mut tx = self.context.begin();
        let mut ret = match tx.load::<ReturnTicketEntity>(return_id).await? {
            Some(ret) => ret,
            None => return Ok(None),
        };
        let mut ticket = self.reverse_return(&mut tx, &ret).await?;
        let total_fine = self.apply_return(&mut tx, &mut ticket, item_ids, ret.return_date).await?;
        ret.item_ids = item_ids.to_vec();
        ret.total_fine = total_fine;
        ret.updated_at = tx.now();
        tx.stage(&ret)?;
        let dto = ReturnTicketDto::from(&ret);
        tx.record(DomainEvent::updated("return_ticket_updated", "lending", return_id, &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("return {} now covers {:?} with fine {}", return_id, item_ids, total_fine);
        Ok(Some(dto))
    }

    async fn delete_return(&self, return_id: &str) -> LibraryResult<bool> {
        let mut tx = self.context.begin();
        let ret = match tx.load::<ReturnTicketEntity>(return_id).await? {
            Some(ret) => ret,
            None => return Ok(false),
        };
        self.reverse_return(&mut tx, &ret).await?;
        tx.remove::<ReturnTicketEntity>(return_id)?;
        tx.record(DomainEvent::deleted("return_ticket_deleted", "lending", return_id, &HashMap::new(),
                                       &ReturnTicketDto::from(&ret))?);
        self.context.commit(tx).await?;
        info!("deleted return {}", return_id);
        Ok(true)
    }

    async fn extend(&self, ticket_id: &str) -> LibraryResult<BorrowTicketDto> {
        let mut tx = self.context.begin();
        let mut ticket = self.load_borrowed(&mut tx, ticket_id).await?;
        for item_id in &ticket.item_ids {
            if self.reservations.has_pending(&mut tx, item_id).await? {
                return Err(LibraryError::rejected(Rule::ReservationPending,
                                                  format!("item {} is reserved by another patron", item_id).as_str()));
            }
        }
        let lines = self.patron_registry.ticket_lines(&mut tx, ticket.patron_id.as_str(), ticket_id).await?;
        if lines.iter().any(|line| line.extended) {
            return Err(LibraryError::rejected(Rule::AlreadyExtended,
                                              format!("ticket {} was already extended", ticket_id).as_str()));
        }
        ticket.due_date += Duration::days(self.context.config.extension_days);
        self.patron_registry.extend_loans(&mut tx, ticket.patron_id.as_str(), ticket_id, ticket.due_date).await?;
        ticket.updated_at = tx.now();
        tx.stage(&ticket)?;
        let dto = BorrowTicketDto::from(&ticket);
        tx.record(DomainEvent::updated("loan_extended", "lending", ticket_id, &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("ticket {} is now due {}", ticket_id, ticket.due_date);
        Ok(dto)
    }

    async fn find_borrow_ticket(&self, ticket_id: &str) -> LibraryResult<Option<BorrowTicketDto>> {
        Ok(self.ticket_repository.get(ticket_id).await?.map(|t| BorrowTicketDto::from(&t)))
    }

    async fn find_return_ticket(&self, return_id: &str) -> LibraryResult<Option<ReturnTicketDto>> {
        Ok(self.return_repository.get(return_id).await?.map(|r| ReturnTicketDto::from(&r)))
    }

    async fn query_unreturned(&self) -> LibraryResult<Vec<BorrowTicketDto>> {
        let predicate = HashMap::from([("ticket_status".to_string(), TicketStatus::Borrowed.to_string())]);
        Ok(self.find_tickets(predicate).await?.iter().map(BorrowTicketDto::from).collect())
    }

    async fn query_overdue(&self) -> LibraryResult<Vec<BorrowTicketDto>> {
        let now = self.context.clock.now();
        let predicate = HashMap::from([("ticket_status".to_string(), TicketStatus::Borrowed.to_string())]);
        Ok(self.find_tickets(predicate).await?.iter()
            .filter(|t| t.is_overdue(now))
            .map(BorrowTicketDto::from)
            .collect())
    }

    async fn find_tickets_by_patron(&self, patron_id: &str) -> LibraryResult<Vec<BorrowTicketDto>> {
        let predicate = HashMap::from([("patron_id".to_string(), patron_id.to_string())]);
        Ok(self.find_tickets(predicate).await?.iter().map(BorrowTicketDto::from).collect())
    }

    async fn find_returns_by_ticket(&self, ticket_id: &str) -> LibraryResult<Vec<ReturnTicketDto>> {
        let predicate = HashMap::from([("borrow_ticket_id".to_string(), ticket_id.to_string())]);
        Ok(self.return_repository.query_all(&predicate).await?.iter().map(ReturnTicketDto::from).collect())
    }

    async fn borrowed_item_stats(&self) -> LibraryResult<BorrowedItemStats> {
        let items = self.item_repository.query_all(&HashMap::new()).await?.into_iter()
            .map(|item| (item.item_id.to_string(), item))
            .collect::<HashMap<String, CatalogItemEntity>>();
        let mut stats = BorrowedItemStats::default();
        for patron in self.patron_repository.query_all(&HashMap::new()).await? {
            for line in patron.history.iter().filter(|h| h.status == LoanStatus::Borrowed) {
                let item = match items.get(&line.item_id) {
                    Some(item) => item,
                    None => {
                        warn!("patron {} holds unknown item {}", patron.patron_id, line.item_id);
                        continue;
                    }
                };
                *stats.by_title.entry(item.title.to_string()).or_insert(0) += 1;
                *stats.by_category.entry(item.category.to_string()).or_insert(0) += 1;
            }
        }
        Ok(stats)
    }

    async fn stage_borrow(&self, tx: &mut LendingTransaction, patron_id: &str, item_ids: &[String]) -> LibraryResult<BorrowTicketEntity> {
        let patron = self.validate_borrow(tx, patron_id, item_ids).await?;
        let ticket_id = tx.next_id::<BorrowTicketEntity>().await?;
        let now = tx.now();
        let ticket = BorrowTicketEntity::new(ticket_id.as_str(), patron_id, item_ids,
                                             now, now + Duration::days(patron.max_loan_days));
        self.lend_items(tx, &ticket, item_ids).await?;
        tx.stage(&ticket)?;
        tx.record(DomainEvent::added("borrow_ticket_created", "lending", ticket_id.as_str(), &HashMap::new(),
                                     &BorrowTicketDto::from(&ticket))?);
        Ok(ticket)
    }
}

impl From<&BorrowTicketEntity> for BorrowTicketDto {
    fn from(other: &BorrowTicketEntity) -> Self {
        Self {
            ticket_id: other.ticket_id.to_string(),
            version: other.version,
            patron_id: other.patron_id.to_string(),
            item_ids: other.item_ids.clone(),
            borrow_date: other.borrow_date,
            due_date: other.due_date,
            ticket_status: other.ticket_status,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&ReturnTicketEntity> for ReturnTicketDto {
    fn from(other: &ReturnTicketEntity) -> Self {
        Self {
            return_id: other.return_id.to_string(),
            version: other.version,
            borrow_ticket_id: other.borrow_ticket_id.to_string(),
            patron_id: other.patron_id.to_string(),
            item_ids: other.item_ids.clone(),
            return_date: other.return_date,
            total_fine: other.total_fine,
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}
