use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::reservations::domain::ReservationQueue;

pub struct CancelReservationCommand {
    reservation_queue: Arc<dyn ReservationQueue>,
}

impl CancelReservationCommand {
    pub fn new(reservation_queue: Arc<dyn ReservationQueue>) -> Self {
        Self {
            reservation_queue,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelReservationCommandRequest {
    pub reservation_id: String,
}

impl CancelReservationCommandRequest {
    pub fn new(reservation_id: String) -> Self {
        Self {
            reservation_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CancelReservationCommandResponse {
    pub reservation_id: String,
}

#[async_trait]
impl Command<CancelReservationCommandRequest, CancelReservationCommandResponse> for CancelReservationCommand {
    async fn execute(&self, req: CancelReservationCommandRequest) -> Result<CancelReservationCommandResponse, CommandError> {
        if self.reservation_queue.cancel(req.reservation_id.as_str()).await? {
            Ok(CancelReservationCommandResponse { reservation_id: req.reservation_id })
        } else {
            Err(CommandError::not_found(format!("reservation {} not found", req.reservation_id).as_str()))
        }
    }
}
