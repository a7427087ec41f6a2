use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::ReservationStatus;
use crate::lending::dto::BorrowTicketDto;
use crate::utils::date::serializer;

// ReservationDto is a data transfer object for the reservation queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDto {
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

impl Identifiable for ReservationDto {
    fn id(&self) -> String {
        self.reservation_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ReadyNotice is the message payload handed to whoever delivers notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyNotice {
    pub reservation_id: String,
    pub patron_id: String,
    pub email: String,
    pub item_id: String,
    pub title: String,
    pub message: String,
    #[serde(with = "serializer")]
    pub pickup_by: NaiveDateTime,
}

// CompletedReservation pairs a fulfilled reservation with the borrow it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedReservation {
    pub reservation: ReservationDto,
    pub ticket: BorrowTicketDto,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExpiryOutcome {
    pub expired: Vec<ReservationDto>,
    pub promoted: Vec<ReservationDto>,
}
