use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::TicketStatus;
use crate::core::repository::{BORROW_TICKETS_TABLE, Entity, RETURN_TICKETS_TABLE, Table};
use crate::utils::date::serializer;

// BorrowTicketEntity records one borrow of several items sharing a due date
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct BorrowTicketEntity {
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

impl BorrowTicketEntity {
    pub fn new(ticket_id: &str, patron_id: &str, item_ids: &[String],
               borrow_date: NaiveDateTime, due_date: NaiveDateTime) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            version: 0,
            patron_id: patron_id.to_string(),
            item_ids: item_ids.to_vec(),
            borrow_date,
            due_date,
            ticket_status: TicketStatus::Borrowed,
            created_at: borrow_date,
            updated_at: borrow_date,
        }
    }

    pub fn covers(&self, item_id: &str) -> bool {
        self.item_ids.iter().any(|id| id == item_id)
    }

    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.ticket_status == TicketStatus::Borrowed && self.due_date < now
    }
}

impl Identifiable for BorrowTicketEntity {
    fn id(&self) -> String {
        self.ticket_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Entity for BorrowTicketEntity {
    const TABLE: Table = BORROW_TICKETS_TABLE;
    const ID_PREFIX: &'static str = "BR";
}

// ReturnTicketEntity records the items given back in one visit against a borrow ticket
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ReturnTicketEntity {
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

impl ReturnTicketEntity {
    pub fn new(return_id: &str, ticket: &BorrowTicketEntity, item_ids: &[String],
               return_date: NaiveDateTime, total_fine: i64, now: NaiveDateTime) -> Self {
        Self {
            return_id: return_id.to_string(),
            version: 0,
            borrow_ticket_id: ticket.ticket_id.to_string(),
            patron_id: ticket.patron_id.to_string(),
            item_ids: item_ids.to_vec(),
            return_date,
            total_fine,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Identifiable for ReturnTicketEntity {
    fn id(&self) -> String {
        self.return_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Entity for ReturnTicketEntity {
    const TABLE: Table = RETURN_TICKETS_TABLE;
    const ID_PREFIX: &'static str = "RT";
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};
    use crate::core::library::TicketStatus;
    use crate::lending::domain::model::{BorrowTicketEntity, ReturnTicketEntity};

    #[tokio::test]
    async fn test_should_build_tickets() {
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(9, 0, 0)).expect("valid date");
        let items = vec!["TL00001".to_string(), "TL00002".to_string()];
        let ticket = BorrowTicketEntity::new("BR00001", "RD00001", &items, now, now + Duration::days(14));
        assert!(ticket.covers("TL00002"));
        assert!(!ticket.covers("TL00003"));
        assert_eq!(TicketStatus::Borrowed, ticket.ticket_status);
        assert!(!ticket.is_overdue(now + Duration::days(14)));
        assert!(ticket.is_overdue(now + Duration::days(15)));

        let ret = ReturnTicketEntity::new("RT00001", &ticket, &items[..1], now, 0, now);
        assert_eq!("BR00001", ret.borrow_ticket_id.as_str());
        assert_eq!("RD00001", ret.patron_id.as_str());
        assert_eq!(1, ret.item_ids.len());
    }
}
