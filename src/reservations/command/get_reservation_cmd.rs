use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::reservations::domain::ReservationQueue;
use crate::reservations::dto::ReservationDto;

pub struct GetReservationCommand {
    reservation_queue: Arc<dyn ReservationQueue>,
}

impl GetReservationCommand {
    pub fn new(reservation_queue: Arc<dyn ReservationQueue>) -> Self {
        Self {
            reservation_queue,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetReservationCommandRequest {
    pub reservation_id: String,
}

impl GetReservationCommandRequest {
    pub fn new(reservation_id: String) -> Self {
        Self {
            reservation_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetReservationCommandResponse {
    pub reservation: ReservationDto,
}

#[async_trait]
impl Command<GetReservationCommandRequest, GetReservationCommandResponse> for GetReservationCommand {
    async fn execute(&self, req: GetReservationCommandRequest) -> Result<GetReservationCommandResponse, CommandError> {
        self.reservation_queue.find_reservation(req.reservation_id.as_str()).await?
            .map(|reservation| GetReservationCommandResponse { reservation })
            .ok_or_else(|| CommandError::not_found(format!("reservation {} not found", req.reservation_id).as_str()))
    }
}
