use std::collections::BTreeMap;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::{LoanStatus, PatronStatus};
use crate::patrons::domain::model::HistoryEntry;
use crate::utils::date::serializer;

// PatronDto is the outward view of a library member and their loans.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct PatronDto {
    pub patron_id: String,
    pub version: i64,
    pub full_name: String,
    pub email: String,
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

impl PatronDto {
    pub fn outstanding(&self) -> Vec<&HistoryEntry> {
        self.history.iter().filter(|h| h.status == LoanStatus::Borrowed).collect()
    }
}

impl Identifiable for PatronDto {
    fn id(&self) -> String {
        self.patron_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// PatronChanges lists the profile fields an update touches; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatronChanges {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub patron_type: Option<String>,
    #[serde(default)]
    pub max_books: Option<i64>,
    #[serde(default)]
    pub max_loan_days: Option<i64>,
    #[serde(default)]
    pub restricted_access: Option<bool>,
}

// BorrowingStats counts patrons by membership status and by whether they hold any item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowingStats {
    pub total_patrons: usize,
    pub active_patrons: usize,
    pub suspended_patrons: usize,
    pub expired_patrons: usize,
    pub borrowing_patrons: usize,
    pub idle_patrons: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopBorrower {
    pub patron_id: String,
    pub full_name: String,
    pub borrowed_books: i64,
    pub overdue_books: i64,
    pub fine_amount: i64,
}

// TypeShare is the part of all borrowed items held by one patron type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    pub items: i64,
    pub percentage: f64,
}

pub type TypeShares = BTreeMap<String, TypeShare>;
