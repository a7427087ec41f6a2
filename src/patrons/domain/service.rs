use std::collections::HashMap;
use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};
use crate::core::factory::LibraryContext;
use crate::core::events::DomainEvent;
use crate::core::library::{LibraryError, LibraryResult, LoanStatus, PatronStatus, Rule};
use crate::core::repository::{LedgerRepository, Repository};
use crate::core::transaction::LendingTransaction;
use crate::patrons::domain::model::{HistoryEntry, PatronEntity};
use crate::patrons::domain::PatronRegistry;
use crate::patrons::dto::{BorrowingStats, PatronChanges, PatronDto, TopBorrower, TypeShare, TypeShares};

pub struct PatronRegistryImpl {
    context: LibraryContext,
    patron_repository: LedgerRepository<PatronEntity>,
}

impl PatronRegistryImpl {
    pub fn new(context: &LibraryContext) -> Self {
        PatronRegistryImpl {
            context: context.clone(),
            patron_repository: LedgerRepository::new(context.ledger.clone()),
        }
    }

    fn to_dto(&self, entity: &PatronEntity, now: NaiveDateTime) -> PatronDto {
        let mut dto = PatronDto::from(entity);
        dto.status = entity.effective_status(now);
        dto
    }

    async fn load_existing(&self, tx: &mut LendingTransaction, patron_id: &str) -> LibraryResult<PatronEntity> {
        tx.load::<PatronEntity>(patron_id).await?.ok_or_else(||
            LibraryError::rejected(Rule::PatronNotFound, format!("patron {} not found", patron_id).as_str()))
    }

    // applies a change to an existing patron in its own transaction
    async fn change_patron<F>(&self, id: &str, event_name: &str, change: F) -> LibraryResult<Option<PatronDto>>
        where F: FnOnce(&mut PatronEntity, NaiveDateTime) -> LibraryResult<()> + Send {
        let mut tx = self.context.begin();
        let now = tx.now();
        let mut patron = match tx.load::<PatronEntity>(id).await? {
            Some(patron) => patron,
            None => return Ok(None),
        };
        change(&mut patron, now)?;
        patron.updated_at = now;
        tx.stage(&patron)?;
        let dto = self.to_dto(&patron, now);
        tx.record(DomainEvent::updated(event_name, "patrons", id, &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("{} for patron {}", event_name, id);
        Ok(Some(dto))
    }

    async fn query_all(&self) -> LibraryResult<Vec<PatronEntity>> {
        self.patron_repository.query_all(&HashMap::new()).await
    }
}

// fine_for charges whole days late; an early or same-day return costs nothing
pub(crate) fn fine_for(due_date: NaiveDateTime, return_date: NaiveDateTime, fine_per_day: i64) -> i64 {
    let days_late = (return_date - due_date).num_days();
    days_late.max(0) * fine_per_day
}

#[async_trait]
impl PatronRegistry for PatronRegistryImpl {
    async fn register_patron(&self, full_name: &str, email: &str) -> LibraryResult<PatronDto> {
        let mut tx = self.context.begin();
        let now = tx.now();
        let patron_id = tx.next_id::<PatronEntity>().await?;
        let patron = PatronEntity::new(patron_id.as_str(), full_name, email, &self.context.config, now);
        tx.stage(&patron)?;
        let dto = self.to_dto(&patron, now);
        tx.record(DomainEvent::added("patron_registered", "patrons", patron_id.as_str(), &HashMap::new(), &dto)?);
        self.context.commit(tx).await?;
        info!("registered patron {}", patron_id);
        Ok(dto)
    }

    async fn find_patron(&self, id: &str) -> LibraryResult<Option<PatronDto>> {
        let now = self.context.clock.now();
        Ok(self.patron_repository.get(id).await?.map(|p| self.to_dto(&p, now)))
    }

    async fn update_patron(&self, id: &str, changes: &PatronChanges) -> LibraryResult<Option<PatronDto>> {
        let changes = changes.clone();
        self.change_patron(id, "patron_updated", move |patron, _now| patron.apply(&changes)).await
    }

    async fn remove_patron(&self, id: &str) -> LibraryResult<bool> {
        let mut tx = self.context.begin();
        let patron = match tx.load::<PatronEntity>(id).await? {
            Some(patron) => patron,
            None => return Ok(false),
        };
        if patron.borrowed_books > 0 {
            return Err(LibraryError::rejected(Rule::PatronHasLoans,
                                              format!("patron {} still has {} items borrowed", id, patron.borrowed_books).as_str()));
        }
        tx.remove::<PatronEntity>(id)?;
        tx.record(DomainEvent::deleted("patron_removed", "patrons", id, &HashMap::new(), &PatronDto::from(&patron))?);
        self.context.commit(tx).await?;
        info!("removed patron {}", id);
        Ok(true)
    }

    async fn suspend_patron(&self, id: &str, reason: &str) -> LibraryResult<Option<PatronDto>> {
        let reason = reason.to_string();
        self.change_patron(id, "patron_suspended", move |patron, _now| {
            patron.status = PatronStatus::Suspended;
            patron.suspension_reason = Some(reason);
            Ok(())
        }).await
    }

    async fn renew_membership(&self, id: &str) -> LibraryResult<Option<PatronDto>> {
        let membership_days = self.context.config.membership_days;
        self.change_patron(id, "patron_renewed", move |patron, now| {
            patron.annual_fee_paid = true;
            patron.expiry_date = now + Duration::days(membership_days);
            patron.status = PatronStatus::Active;
            patron.suspension_reason = None;
            Ok(())
        }).await
    }

    async fn restore_patron(&self, id: &str, paid_fine: bool, paid_annual_fee: bool) -> LibraryResult<Option<PatronDto>> {
        let membership_days = self.context.config.membership_days;
        self.change_patron(id, "patron_restored", move |patron, now| {
            if patron.effective_status(now) == PatronStatus::Active {
                return Err(LibraryError::rejected(Rule::PatronNotRestorable,
                                                  format!("patron {} is not suspended or expired", patron.patron_id).as_str()));
            }
            if patron.fine_amount > 0 && !paid_fine {
                return Err(LibraryError::rejected(Rule::FineOutstanding,
                                                  format!("patron {} owes {}", patron.patron_id, patron.fine_amount).as_str()));
            }
            if !patron.annual_fee_paid && !paid_annual_fee {
                return Err(LibraryError::rejected(Rule::AnnualFeeUnpaid,
                                                  format!("patron {} has not paid the annual fee", patron.patron_id).as_str()));
            }
            if paid_fine {
                patron.fine_amount = 0;
            }
            if paid_annual_fee {
                patron.annual_fee_paid = true;
                patron.expiry_date = now + Duration::days(membership_days);
            }
            patron.status = PatronStatus::Active;
            patron.suspension_reason = None;
            Ok(())
        }).await
    }

    async fn patrons_with_fines(&self) -> LibraryResult<Vec<PatronDto>> {
        let now = self.context.clock.now();
        Ok(self.query_all().await?.iter()
            .filter(|p| p.fine_amount > 0)
            .map(|p| self.to_dto(p, now))
            .collect())
    }

    async fn patrons_with_overdue_loans(&self) -> LibraryResult<Vec<PatronDto>> {
        let now = self.context.clock.now();
        Ok(self.query_all().await?.iter()
            .filter(|p| p.has_overdue_loans(now))
            .map(|p| self.to_dto(p, now))
            .collect())
    }

    async fn borrowing_stats(&self) -> LibraryResult<BorrowingStats> {
        let now = self.context.clock.now();
        let mut stats = BorrowingStats::default();
        for patron in self.query_all().await? {
            stats.total_patrons += 1;
            match patron.effective_status(now) {
                PatronStatus::Active => stats.active_patrons += 1,
                PatronStatus::Suspended => stats.suspended_patrons += 1,
                PatronStatus::Expired => stats.expired_patrons += 1,
            }
            if patron.borrowed_books > 0 {
                stats.borrowing_patrons += 1;
            } else {
                stats.idle_patrons += 1;
            }
        }
        Ok(stats)
    }

    async fn top_borrowers(&self, limit: usize) -> LibraryResult<Vec<TopBorrower>> {
        let mut patrons = self.query_all().await?;
        patrons.sort_by(|a, b| b.borrowed_books.cmp(&a.borrowed_books).then_with(|| a.patron_id.cmp(&b.patron_id)));
        Ok(patrons.into_iter()
            .take(limit)
            .map(|p| TopBorrower {
                patron_id: p.patron_id,
                full_name: p.full_name,
                borrowed_books: p.borrowed_books,
                overdue_books: p.overdue_books,
                fine_amount: p.fine_amount,
            })
            .collect())
    }

    async fn borrowing_by_patron_type(&self) -> LibraryResult<TypeShares> {
        let patrons = self.query_all().await?;
        let total: i64 = patrons.iter().map(|p| p.borrowed_books).sum();
        let mut items_by_type: HashMap<String, i64> = HashMap::new();
        for patron in &patrons {
            *items_by_type.entry(patron.patron_type.to_string()).or_insert(0) += patron.borrowed_books;
        }
        Ok(items_by_type.into_iter()
            .map(|(patron_type, items)| {
                let percentage = if total > 0 { items as f64 * 100.0 / total as f64 } else { 0.0 };
                (patron_type, TypeShare { items, percentage })
            })
            .collect())
    }

    async fn lookup(&self, tx: &mut LendingTransaction, patron_id: &str) -> LibraryResult<Option<PatronEntity>> {
        tx.load::<PatronEntity>(patron_id).await
    }

    async fn check_eligibility(&self, tx: &mut LendingTransaction, patron_id: &str, count: usize) -> LibraryResult<PatronEntity> {
        let patron = self.load_existing(tx, patron_id).await?;
        let now = tx.now();
        if patron.status != PatronStatus::Active {
            return Err(LibraryError::rejected(Rule::PatronInactive,
                                              format!("patron {} is {}", patron_id, patron.status).as_str()));
        }
        if patron.expiry_date < now {
            return Err(LibraryError::rejected(Rule::MembershipExpired,
                                              format!("membership of patron {} expired", patron_id).as_str()));
        }
        if !patron.annual_fee_paid {
            return Err(LibraryError::rejected(Rule::AnnualFeeUnpaid,
                                              format!("patron {} has not paid the annual fee", patron_id).as_str()));
        }
        if patron.borrowed_books + count as i64 > patron.max_books {
            return Err(LibraryError::rejected(Rule::BorrowLimitExceeded,
                                              format!("patron {} has {} of {} items and asked for {}", patron_id,
                                                      patron.borrowed_books, patron.max_books, count).as_str()));
        }
        Ok(patron)
    }

    async fn record_borrow(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str, item_id: &str,
                           borrow_date: NaiveDateTime, due_date: NaiveDateTime) -> LibraryResult<()> {
        let mut patron = self.check_eligibility(tx, patron_id, 1).await?;
        patron.history.push(HistoryEntry::borrowed(borrow_ticket_id, item_id, borrow_date, due_date));
        patron.borrowed_books += 1;
        patron.updated_at = tx.now();
        debug!("patron {} borrows {} on {}", patron_id, item_id, borrow_ticket_id);
        tx.stage(&patron)
    }

    async fn record_return(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str, item_id: &str,
                           return_date: NaiveDateTime) -> LibraryResult<i64> {
        let mut patron = self.load_existing(tx, patron_id).await?;
        let fine_per_day = self.context.config.fine_per_day;
        let (fine, late) = match patron.outstanding_line(borrow_ticket_id, item_id) {
            Some(line) => {
                let fine = fine_for(line.due_date, return_date, fine_per_day);
                line.status = LoanStatus::Returned;
                line.return_date = Some(return_date);
                line.fine = fine;
                (fine, return_date > line.due_date)
            }
            None => {
                return Err(LibraryError::rejected(Rule::ItemNotOutstanding,
                                                  format!("item {} of {} is not borrowed by {}", item_id, borrow_ticket_id, patron_id).as_str()));
            }
        };
        patron.drop_loan()?;
        patron.fine_amount += fine;
        if late {
            patron.overdue_books += 1;
        }
        patron.updated_at = tx.now();
        tx.stage(&patron)?;
        Ok(fine)
    }

    async fn cancel_borrow(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str, item_id: &str) -> LibraryResult<()> {
        let mut patron = self.load_existing(tx, patron_id).await?;
        match patron.outstanding_line(borrow_ticket_id, item_id) {
            Some(line) => line.status = LoanStatus::Cancelled,
            None => {
                return Err(LibraryError::invariant(format!("no outstanding line for {} on {} of {}",
                                                           item_id, borrow_ticket_id, patron_id).as_str()));
            }
        }
        patron.drop_loan()?;
        patron.updated_at = tx.now();
        tx.stage(&patron)
    }

    async fn reinstate_return(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str, item_id: &str) -> LibraryResult<i64> {
        let mut patron = self.load_existing(tx, patron_id).await?;
        let line = patron.history.iter_mut().rev()
            .find(|h| h.is_line_of(borrow_ticket_id, item_id) && h.status == LoanStatus::Returned);
        let (fine, late) = match line {
            Some(line) => {
                let late = line.return_date.map(|r| r > line.due_date).unwrap_or(false);
                let fine = line.fine;
                line.status = LoanStatus::Borrowed;
                line.return_date = None;
                line.fine = 0;
                (fine, late)
            }
            None => {
                return Err(LibraryError::invariant(format!("no returned line for {} on {} of {}",
                                                           item_id, borrow_ticket_id, patron_id).as_str()));
            }
        };
        patron.borrowed_books += 1;
        patron.take_back_fine(fine, late)?;
        patron.updated_at = tx.now();
        tx.stage(&patron)?;
        Ok(fine)
    }

    async fn extend_loans(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str,
                          new_due_date: NaiveDateTime) -> LibraryResult<usize> {
        let mut patron = self.load_existing(tx, patron_id).await?;
        let mut extended = 0;
        for line in patron.history.iter_mut()
            .filter(|h| h.borrow_ticket_id == borrow_ticket_id && h.status == LoanStatus::Borrowed) {
            line.due_date = new_due_date;
            line.extended = true;
            extended += 1;
        }
        patron.updated_at = tx.now();
        tx.stage(&patron)?;
        Ok(extended)
    }

    async fn ticket_lines(&self, tx: &mut LendingTransaction, patron_id: &str, borrow_ticket_id: &str) -> LibraryResult<Vec<HistoryEntry>> {
        let patron = self.load_existing(tx, patron_id).await?;
        Ok(patron.history.into_iter()
            .filter(|h| h.borrow_ticket_id == borrow_ticket_id && h.status != LoanStatus::Cancelled)
            .collect())
    }
}

impl From<&PatronEntity> for PatronDto {
    fn from(other: &PatronEntity) -> Self {
        PatronDto {
            patron_id: other.patron_id.to_string(),
            version: other.version,
            full_name: other.full_name.to_string(),
            email: other.email.to_string(),
            patron_type: other.patron_type.to_string(),
            status: other.status,
            expiry_date: other.expiry_date,
            annual_fee_paid: other.annual_fee_paid,
            max_books: other.max_books,
            max_loan_days: other.max_loan_days,
            restricted_access: other.restricted_access,
            borrowed_books: other.borrowed_books,
            overdue_books: other.overdue_books,
            fine_amount: other.fine_amount,
            suspension_reason: other.suspension_reason.clone(),
            history: other.history.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

impl From<&PatronDto> for PatronEntity {
    fn from(other: &PatronDto) -> Self {
        PatronEntity {
            patron_id: other.patron_id.to_string(),
            version: other.version,
            full_name: other.full_name.to_string(),
            email: other.email.to_string(),
            patron_type: other.patron_type.to_string(),
            status: other.status,
            expiry_date: other.expiry_date,
            annual_fee_paid: other.annual_fee_paid,
            max_books: other.max_books,
            max_loan_days: other.max_loan_days,
            restricted_access: other.restricted_access,
            borrowed_books: other.borrowed_books,
            overdue_books: other.overdue_books,
            fine_amount: other.fine_amount,
            suspension_reason: other.suspension_reason.clone(),
            history: other.history.clone(),
            created_at: other.created_at,
            updated_at: other.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use crate::core::clock::FixedClock;
    use crate::core::domain::Configuration;
    use crate::core::factory::LibraryContext;
    use crate::core::library::{LoanStatus, PatronStatus};
    use crate::patrons::domain::model::PatronEntity;
    use crate::patrons::domain::PatronRegistry;
    use crate::patrons::domain::service::{fine_for, PatronRegistryImpl};
    use crate::patrons::dto::PatronChanges;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(9, 0, 0)).expect("valid date")
    }

    fn registry() -> (Arc<FixedClock>, LibraryContext, PatronRegistryImpl) {
        let clock = Arc::new(FixedClock::new(start()));
        let context = LibraryContext::in_memory(&Configuration::new("test"), clock.clone());
        let registry = PatronRegistryImpl::new(&context);
        (clock, context, registry)
    }

    #[tokio::test]
    async fn test_should_charge_whole_days_late() {
        let due = start();
        assert_eq!(25000, fine_for(due, due + Duration::days(5), 5000));
        assert_eq!(0, fine_for(due, due, 5000));
        assert_eq!(0, fine_for(due, due - Duration::days(3), 5000));
        assert_eq!(0, fine_for(due, due + Duration::hours(23), 5000));
    }

    #[tokio::test]
    async fn test_should_register_with_sequential_ids() {
        let (_, _, registry) = registry();
        let first = registry.register_patron("Ada", "ada@lib.org").await.expect("should register");
        let second = registry.register_patron("Bob", "bob@lib.org").await.expect("should register");
        assert_eq!("RD00001", first.patron_id.as_str());
        assert_eq!("RD00002", second.patron_id.as_str());
        assert_eq!(start() + Duration::days(365), first.expiry_date);
        let loaded = registry.find_patron("RD00001").await.expect("should find").expect("should exist");
        assert_eq!("Ada", loaded.full_name.as_str());
        assert!(registry.find_patron("RD00009").await.expect("should find").is_none());
    }

    #[tokio::test]
    async fn test_should_check_eligibility_in_order() {
        let (clock, context, registry) = registry();
        let patron = registry.register_patron("Ada", "ada@lib.org").await.expect("should register");
        let id = patron.patron_id.as_str();

        let mut tx = context.begin();
        let err = registry.check_eligibility(&mut tx, "RD99999", 1).await.expect_err("missing patron");
        assert_eq!(Some("patron_not_found"), err.rule());
        let err = registry.check_eligibility(&mut tx, id, 6).await.expect_err("over limit");
        assert_eq!(Some("borrow_limit_exceeded"), err.rule());
        registry.check_eligibility(&mut tx, id, 5).await.expect("within limit");

        registry.suspend_patron(id, "lost card").await.expect("should suspend").expect("should exist");
        let mut tx = context.begin();
        let err = registry.check_eligibility(&mut tx, id, 1).await.expect_err("suspended");
        assert_eq!(Some("patron_inactive"), err.rule());

        registry.renew_membership(id).await.expect("should renew");
        clock.advance_days(400);
        let mut tx = context.begin();
        let err = registry.check_eligibility(&mut tx, id, 1).await.expect_err("expired");
        assert_eq!(Some("membership_expired"), err.rule());
        let loaded = registry.find_patron(id).await.expect("should find").expect("should exist");
        assert_eq!(PatronStatus::Expired, loaded.status);
    }

    #[tokio::test]
    async fn test_should_record_borrow_and_return_with_fine() {
        let (_, context, registry) = registry();
        let patron = registry.register_patron("Ada", "ada@lib.org").await.expect("should register");
        let id = patron.patron_id.as_str();
        let due = start() + Duration::days(14);

        let mut tx = context.begin();
        registry.record_borrow(&mut tx, id, "BR00001", "TL00001", start(), due).await.expect("should record borrow");
        context.commit(tx).await.expect("should commit");

        let mut tx = context.begin();
        let fine = registry.record_return(&mut tx, id, "BR00001", "TL00001", due + Duration::days(5)).await.expect("should return");
        assert_eq!(25000, fine);
        let err = registry.record_return(&mut tx, id, "BR00001", "TL00001", due).await.expect_err("already returned");
        assert_eq!(Some("item_not_outstanding"), err.rule());
        context.commit(tx).await.expect("should commit");

        let loaded = registry.find_patron(id).await.expect("should find").expect("should exist");
        assert_eq!(0, loaded.borrowed_books);
        assert_eq!(1, loaded.overdue_books);
        assert_eq!(25000, loaded.fine_amount);
        assert_eq!(LoanStatus::Returned, loaded.history[0].status);
        assert_eq!(1, registry.patrons_with_fines().await.expect("should report").len());

        let mut tx = context.begin();
        assert_eq!(25000, registry.reinstate_return(&mut tx, id, "BR00001", "TL00001").await.expect("should reinstate"));
        let reverted: PatronEntity = registry.lookup(&mut tx, id).await.expect("should load").expect("should exist");
        assert_eq!(1, reverted.borrowed_books);
        assert_eq!(0, reverted.overdue_books);
        assert_eq!(0, reverted.fine_amount);
        assert_eq!(None, reverted.history[0].return_date);
    }

    #[tokio::test]
    async fn test_should_cancel_and_extend_lines_of_one_ticket() {
        let (clock, context, registry) = registry();
        let patron = registry.register_patron("Ada", "ada@lib.org").await.expect("should register");
        let id = patron.patron_id.as_str();
        let due = start() + Duration::days(14);

        let mut tx = context.begin();
        registry.record_borrow(&mut tx, id, "BR00001", "TL00001", start(), due).await.expect("should record borrow");
        registry.record_borrow(&mut tx, id, "BR00001", "TL00002", start(), due).await.expect("should record borrow");
        registry.record_borrow(&mut tx, id, "BR00002", "TL00003", start(), due).await.expect("should record borrow");
        assert_eq!(2, registry.extend_loans(&mut tx, id, "BR00001", due + Duration::days(7)).await.expect("should extend"));
        registry.cancel_borrow(&mut tx, id, "BR00001", "TL00002").await.expect("should cancel");
        assert!(registry.cancel_borrow(&mut tx, id, "BR00001", "TL00002").await.is_err());
        let lines = registry.ticket_lines(&mut tx, id, "BR00001").await.expect("should list lines");
        assert_eq!(1, lines.len());
        assert!(lines[0].extended);
        assert_eq!(due + Duration::days(7), lines[0].due_date);
        context.commit(tx).await.expect("should commit");

        let loaded = registry.find_patron(id).await.expect("should find").expect("should exist");
        assert_eq!(2, loaded.borrowed_books);
        clock.advance_days(15);
        let overdue = registry.patrons_with_overdue_loans().await.expect("should report");
        assert_eq!(1, overdue.len());
    }

    #[tokio::test]
    async fn test_should_restore_only_settled_patrons() {
        let (_, context, registry) = registry();
        let patron = registry.register_patron("Ada", "ada@lib.org").await.expect("should register");
        let id = patron.patron_id.as_str();

        let err = registry.restore_patron(id, false, false).await.expect_err("active patron");
        assert_eq!(Some("patron_not_restorable"), err.rule());

        let mut tx = context.begin();
        let mut entity = registry.lookup(&mut tx, id).await.expect("should load").expect("should exist");
        entity.fine_amount = 10000;
        tx.stage(&entity).expect("should stage");
        context.commit(tx).await.expect("should commit");
        registry.suspend_patron(id, "fines").await.expect("should suspend");

        let err = registry.restore_patron(id, false, false).await.expect_err("unpaid fine");
        assert_eq!(Some("fine_outstanding"), err.rule());
        let restored = registry.restore_patron(id, true, false).await.expect("should restore").expect("should exist");
        assert_eq!(PatronStatus::Active, restored.status);
        assert_eq!(0, restored.fine_amount);
        assert!(registry.restore_patron("RD99999", true, true).await.expect("should run").is_none());
    }

    #[tokio::test]
    async fn test_should_remove_patron_without_loans() {
        let (_, context, registry) = registry();
        let patron = registry.register_patron("Ada", "ada@lib.org").await.expect("should register");
        let id = patron.patron_id.as_str();

        let mut tx = context.begin();
        registry.record_borrow(&mut tx, id, "BR00001", "TL00001", start(), start()).await.expect("should record borrow");
        context.commit(tx).await.expect("should commit");
        let err = registry.remove_patron(id).await.expect_err("has loans");
        assert_eq!(Some("patron_has_loans"), err.rule());

        let mut tx = context.begin();
        registry.cancel_borrow(&mut tx, id, "BR00001", "TL00001").await.expect("should cancel");
        context.commit(tx).await.expect("should commit");
        assert!(registry.remove_patron(id).await.expect("should remove"));
        assert!(!registry.remove_patron(id).await.expect("should run"));
        assert!(registry.find_patron(id).await.expect("should find").is_none());
    }

    #[tokio::test]
    async fn test_should_update_patron_profile() {
        let (_, context, registry) = registry();
        let patron = registry.register_patron("Ada", "ada@lib.org").await.expect("should register");
        let id = patron.patron_id.as_str();

        let changes = PatronChanges {
            full_name: Some("Ada Lovelace".to_string()),
            patron_type: Some("researcher".to_string()),
            max_books: Some(8),
            max_loan_days: Some(30),
            restricted_access: Some(true),
            ..PatronChanges::default()
        };
        let updated = registry.update_patron(id, &changes).await.expect("should update").expect("should exist");
        assert_eq!("Ada Lovelace", updated.full_name.as_str());
        assert_eq!("ada@lib.org", updated.email.as_str());
        assert_eq!("researcher", updated.patron_type.as_str());
        assert_eq!(8, updated.max_books);
        assert_eq!(30, updated.max_loan_days);
        assert!(updated.restricted_access);

        let mut tx = context.begin();
        registry.check_eligibility(&mut tx, id, 8).await.expect("new limit applies");

        let err = registry.update_patron(id, &PatronChanges { max_books: Some(-1), ..PatronChanges::default() }).await
            .expect_err("negative limit");
        assert_eq!(Some("invalid_field"), err.rule());
        let loaded = registry.find_patron(id).await.expect("should find").expect("should exist");
        assert_eq!(8, loaded.max_books);
        assert!(registry.update_patron("RD99999", &changes).await.expect("should run").is_none());
    }

    #[tokio::test]
    async fn test_should_report_borrowing_stats() {
        let (clock, context, registry) = registry();
        let ada = registry.register_patron("Ada", "ada@lib.org").await.expect("should register").patron_id;
        let bob = registry.register_patron("Bob", "bob@lib.org").await.expect("should register").patron_id;
        let cyd = registry.register_patron("Cyd", "cyd@lib.org").await.expect("should register").patron_id;
        registry.update_patron(bob.as_str(), &PatronChanges { patron_type: Some("staff".to_string()), ..PatronChanges::default() })
            .await.expect("should update");
        registry.suspend_patron(cyd.as_str(), "noise").await.expect("should suspend");

        let mut tx = context.begin();
        let due = start() + Duration::days(14);
        registry.record_borrow(&mut tx, ada.as_str(), "BR00001", "TL00001", start(), due).await.expect("should record borrow");
        registry.record_borrow(&mut tx, bob.as_str(), "BR00002", "TL00002", start(), due).await.expect("should record borrow");
        registry.record_borrow(&mut tx, bob.as_str(), "BR00002", "TL00003", start(), due).await.expect("should record borrow");
        registry.record_borrow(&mut tx, bob.as_str(), "BR00002", "TL00004", start(), due).await.expect("should record borrow");
        context.commit(tx).await.expect("should commit");

        let stats = registry.borrowing_stats().await.expect("should count");
        assert_eq!(3, stats.total_patrons);
        assert_eq!(2, stats.active_patrons);
        assert_eq!(1, stats.suspended_patrons);
        assert_eq!(2, stats.borrowing_patrons);
        assert_eq!(1, stats.idle_patrons);

        let top = registry.top_borrowers(2).await.expect("should rank");
        assert_eq!(2, top.len());
        assert_eq!(bob, top[0].patron_id);
        assert_eq!(3, top[0].borrowed_books);
        assert_eq!(ada, top[1].patron_id);

        let shares = registry.borrowing_by_patron_type().await.expect("should split");
        assert_eq!(3, shares["staff"].items);
        assert_eq!(75.0, shares["staff"].percentage);
        assert_eq!(1, shares["standard"].items);

        clock.advance_days(400);
        let stats = registry.borrowing_stats().await.expect("should count");
        assert_eq!(2, stats.expired_patrons);
        assert_eq!(0, stats.active_patrons);
    }
}
