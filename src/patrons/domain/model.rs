use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::core::domain::{Configuration, Identifiable};
use crate::core::library::{LibraryError, LibraryResult, LoanStatus, PatronStatus, Rule};
use crate::core::repository::{Entity, PATRONS_TABLE, Table};
use crate::patrons::dto::PatronChanges;
use crate::utils::date::{opt_serializer, serializer};

pub const STANDARD_PATRON_TYPE: &str = "standard";

fn standard_patron_type() -> String {
    STANDARD_PATRON_TYPE.to_string()
}

// HistoryEntry is one borrowed item line of a patron's ledger.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub borrow_ticket_id: String,
    pub item_id: String,
    #[serde(with = "serializer")]
    pub borrow_date: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_date: NaiveDateTime,
    #[serde(with = "opt_serializer", default)]
    pub return_date: Option<NaiveDateTime>,
    pub status: LoanStatus,
    pub fine: i64,
    pub extended: bool,
}

impl HistoryEntry {
    pub fn borrowed(borrow_ticket_id: &str, item_id: &str, borrow_date: NaiveDateTime, due_date: NaiveDateTime) -> Self {
        Self {
            borrow_ticket_id: borrow_ticket_id.to_string(),
            item_id: item_id.to_string(),
            borrow_date,
            due_date,
            return_date: None,
            status: LoanStatus::Borrowed,
            fine: 0,
            extended: false,
        }
    }

    pub fn is_line_of(&self, borrow_ticket_id: &str, item_id: &str) -> bool {
        self.borrow_ticket_id == borrow_ticket_id && self.item_id == item_id
    }
}

// PatronEntity abstracts a library member together with the borrow and fine ledgers.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PatronEntity {
    pub patron_id: String,
    pub version: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default = "standard_patron_type")]
    pub patron_type: String,
    pub status: PatronStatus,
    #[serde(with = "serializer")]
    pub expiry_date: NaiveDateTime,
    pub annual_fee_paid: bool,
    pub max_books: i64,
    pub max_loan_days: i64,
    pub restricted_access: bool,
    pub borrowed_books: i64,
    pub overdue_books: i64,
    pub fine_amount: i64,
    pub suspension_reason: Option<String>,
    pub history: Vec<HistoryEntry>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl PatronEntity {
    pub fn new(patron_id: &str, full_name: &str, email: &str, config: &Configuration, now: NaiveDateTime) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            version: 0,
            full_name: full_name.to_string(),
            email: email.to_string(),
            patron_type: standard_patron_type(),
            status: PatronStatus::Active,
            expiry_date: now + Duration::days(config.membership_days),
            annual_fee_paid: true,
            max_books: config.default_max_books,
            max_loan_days: config.default_max_loan_days,
            restricted_access: false,
            borrowed_books: 0,
            overdue_books: 0,
            fine_amount: 0,
            suspension_reason: None,
            history: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    // an active membership past its expiry date reads as expired
    pub fn effective_status(&self, now: NaiveDateTime) -> PatronStatus {
        if self.status == PatronStatus::Active && self.expiry_date < now {
            PatronStatus::Expired
        } else {
            self.status
        }
    }

    pub fn is_holding(&self, item_id: &str) -> bool {
        self.history.iter().any(|h| h.item_id == item_id && h.status == LoanStatus::Borrowed)
    }

    pub fn outstanding_line(&mut self, borrow_ticket_id: &str, item_id: &str) -> Option<&mut HistoryEntry> {
        self.history.iter_mut()
            .find(|h| h.is_line_of(borrow_ticket_id, item_id) && h.status == LoanStatus::Borrowed)
    }

    pub fn has_overdue_loans(&self, now: NaiveDateTime) -> bool {
        self.history.iter().any(|h| h.status == LoanStatus::Borrowed && h.due_date < now)
    }

    // apply overwrites the profile fields named by changes; limits must stay usable
    pub fn apply(&mut self, changes: &PatronChanges) -> LibraryResult<()> {
        if let Some(max_books) = changes.max_books {
            if max_books < 0 {
                return Err(LibraryError::rejected(Rule::InvalidField,
                                                  format!("max_books must not be negative, got {}", max_books).as_str()));
            }
        }
        if let Some(max_loan_days) = changes.max_loan_days {
            if max_loan_days < 1 {
                return Err(LibraryError::rejected(Rule::InvalidField,
                                                  format!("max_loan_days must be at least 1, got {}", max_loan_days).as_str()));
            }
        }
        if let Some(full_name) = &changes.full_name {
            self.full_name = full_name.to_string();
        }
        if let Some(email) = &changes.email {
            self.email = email.to_string();
        }
        if let Some(patron_type) = &changes.patron_type {
            self.patron_type = patron_type.to_lowercase();
        }
        if let Some(max_books) = changes.max_books {
            self.max_books = max_books;
        }
        if let Some(max_loan_days) = changes.max_loan_days {
            self.max_loan_days = max_loan_days;
        }
        if let Some(restricted_access) = changes.restricted_access {
            self.restricted_access = restricted_access;
        }
        Ok(())
    }

    pub fn drop_loan(&mut self) -> LibraryResult<()> {
        if self.borrowed_books <= 0 {
            return Err(LibraryError::invariant(format!("patron {} has no borrowed item to give back", self.patron_id).as_str()));
        }
        self.borrowed_books -= 1;
        Ok(())
    }

    // take_back_fine undoes the charge of one returned line
    pub fn take_back_fine(&mut self, fine: i64, late: bool) -> LibraryResult<()> {
        if self.fine_amount < fine {
            return Err(LibraryError::invariant(format!("patron {} owes {} but {} would be taken back",
                                                       self.patron_id, self.fine_amount, fine).as_str()));
        }
        if late && self.overdue_books <= 0 {
            return Err(LibraryError::invariant(format!("patron {} has no overdue return to undo", self.patron_id).as_str()));
        }
        self.fine_amount -= fine;
        if late {
            self.overdue_books -= 1;
        }
        Ok(())
    }
}

impl Identifiable for PatronEntity {
    fn id(&self) -> String {
        self.patron_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Entity for PatronEntity {
    const TABLE: Table = PATRONS_TABLE;
    const ID_PREFIX: &'static str = "RD";
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use crate::core::domain::Configuration;
    use crate::core::library::{LibraryError, LoanStatus, PatronStatus};
    use crate::patrons::domain::model::{HistoryEntry, PatronEntity, STANDARD_PATRON_TYPE};
    use crate::patrons::dto::PatronChanges;

    #[tokio::test]
    async fn test_should_build_patron() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).expect("valid date");
        let patron = PatronEntity::new("RD00001", "Ada", "ada@lib.org", &Configuration::new("test"), now);
        assert_eq!(PatronStatus::Active, patron.effective_status(now));
        assert_eq!(5, patron.max_books);
        assert_eq!(14, patron.max_loan_days);
        assert!(patron.annual_fee_paid);
        assert!(!patron.restricted_access);
        assert_eq!(STANDARD_PATRON_TYPE, patron.patron_type.as_str());
        assert_eq!(PatronStatus::Expired, patron.effective_status(now + Duration::days(366)));
    }

    #[tokio::test]
    async fn test_should_find_outstanding_line() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).expect("valid date");
        let mut patron = PatronEntity::new("RD00001", "Ada", "ada@lib.org", &Configuration::new("test"), now);
        patron.history.push(HistoryEntry::borrowed("BR00001", "TL00001", now, now + Duration::days(14)));
        assert!(patron.is_holding("TL00001"));
        assert!(!patron.has_overdue_loans(now));
        assert!(patron.has_overdue_loans(now + Duration::days(15)));
        let line = patron.outstanding_line("BR00001", "TL00001").expect("should find line");
        line.status = LoanStatus::Returned;
        assert!(patron.outstanding_line("BR00001", "TL00001").is_none());
        assert!(!patron.is_holding("TL00001"));
    }

    #[tokio::test]
    async fn test_should_apply_profile_changes() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).expect("valid date");
        let mut patron = PatronEntity::new("RD00001", "Ada", "ada@lib.org", &Configuration::new("test"), now);
        let changes = PatronChanges {
            email: Some("ada@uni.edu".to_string()),
            patron_type: Some("Researcher".to_string()),
            max_books: Some(10),
            restricted_access: Some(true),
            ..PatronChanges::default()
        };
        patron.apply(&changes).expect("should apply");
        assert_eq!("Ada", patron.full_name.as_str());
        assert_eq!("ada@uni.edu", patron.email.as_str());
        assert_eq!("researcher", patron.patron_type.as_str());
        assert_eq!(10, patron.max_books);
        assert_eq!(14, patron.max_loan_days);
        assert!(patron.restricted_access);

        let err = patron.apply(&PatronChanges { max_loan_days: Some(0), ..PatronChanges::default() }).expect_err("zero days");
        assert_eq!(Some("invalid_field"), err.rule());
        assert_eq!(14, patron.max_loan_days);
    }

    #[tokio::test]
    async fn test_should_refuse_counter_underflow() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).expect("valid date");
        let mut patron = PatronEntity::new("RD00001", "Ada", "ada@lib.org", &Configuration::new("test"), now);
        assert!(matches!(patron.drop_loan(), Err(LibraryError::InvariantViolation { .. })));
        assert!(matches!(patron.take_back_fine(5000, false), Err(LibraryError::InvariantViolation { .. })));
        patron.fine_amount = 5000;
        assert!(matches!(patron.take_back_fine(5000, true), Err(LibraryError::InvariantViolation { .. })));
        patron.overdue_books = 1;
        patron.take_back_fine(5000, true).expect("should take back");
        assert_eq!(0, patron.fine_amount);
        assert_eq!(0, patron.overdue_books);
        assert_eq!(0, patron.borrowed_books);
    }
}
