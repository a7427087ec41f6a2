use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::ReservationStatus;
use crate::core::repository::{Entity, RESERVATIONS_TABLE, Table};
use crate::utils::date::serializer;

// ReservationEntity abstracts a patron's hold on an item that is out on loan
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ReservationEntity {
    pub reservation_id: String,
    pub version: i64,
    pub patron_id: String,
    pub item_id: String,
    pub reservation_status: ReservationStatus,
    pub notified: bool,
    pub borrow_ticket_id: Option<String>,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub expires_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl ReservationEntity {
    pub fn new(reservation_id: &str, patron_id: &str, item_id: &str, hold_days: i64, now: NaiveDateTime) -> Self {
        Self {
            reservation_id: reservation_id.to_string(),
            version: 0,
            patron_id: patron_id.to_string(),
            item_id: item_id.to_string(),
            reservation_status: ReservationStatus::Pending,
            notified: false,
            borrow_ticket_id: None,
            created_at: now,
            expires_at: now + Duration::days(hold_days),
            updated_at: now,
        }
    }

    // an active reservation past its expiry no longer holds the slot
    pub fn is_lapsed(&self, now: NaiveDateTime) -> bool {
        self.reservation_status.is_active() && self.expires_at < now
    }

    pub fn is_live(&self, now: NaiveDateTime) -> bool {
        self.reservation_status.is_active() && !self.is_lapsed(now)
    }
}

impl Identifiable for ReservationEntity {
    fn id(&self) -> String {
        self.reservation_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Entity for ReservationEntity {
    const TABLE: Table = RESERVATIONS_TABLE;
    const ID_PREFIX: &'static str = "RS";
}
