use std::collections::BTreeMap;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::TicketStatus;
use crate::utils::date::serializer;

// BorrowTicketDto is a data transfer object for the lending engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorrowTicketDto {
    pub ticket_id: String,
    pub version: i64,
    pub patron_id: String,
    pub item_ids: Vec<String>,
    #[serde(with = "serializer")]
    pub borrow_date: NaiveDateTime,
    #[serde(with = "serializer")]
    pub due_date: NaiveDateTime,
    pub ticket_status: TicketStatus,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl Identifiable for BorrowTicketDto {
    fn id(&self) -> String {
        self.ticket_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnTicketDto {
    pub return_id: String,
    pub version: i64,
    pub borrow_ticket_id: String,
    pub patron_id: String,
    pub item_ids: Vec<String>,
    #[serde(with = "serializer")]
    pub return_date: NaiveDateTime,
    pub total_fine: i64,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl Identifiable for ReturnTicketDto {
    fn id(&self) -> String {
        self.return_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// BorrowedItemStats counts the loan lines still out per title and category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BorrowedItemStats {
    pub by_title: BTreeMap<String, i64>,
    pub by_category: BTreeMap<String, i64>,
}
