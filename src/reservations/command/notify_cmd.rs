use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::reservations::domain::ReservationQueue;
use crate::reservations::dto::ReadyNotice;

pub struct NotifyReadyCommand {
    reservation_queue: Arc<dyn ReservationQueue>,
}

impl NotifyReadyCommand {
    pub fn new(reservation_queue: Arc<dyn ReservationQueue>) -> Self {
        Self {
            reservation_queue,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NotifyReadyCommandRequest {}

#[derive(Debug, Serialize)]
pub struct NotifyReadyCommandResponse {
    pub notices: Vec<ReadyNotice>,
}

#[async_trait]
impl Command<NotifyReadyCommandRequest, NotifyReadyCommandResponse> for NotifyReadyCommand {
    async fn execute(&self, _req: NotifyReadyCommandRequest) -> Result<NotifyReadyCommandResponse, CommandError> {
        let notices = self.reservation_queue.notify_ready().await?;
        Ok(NotifyReadyCommandResponse { notices })
    }
}
