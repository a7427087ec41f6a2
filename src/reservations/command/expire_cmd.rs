use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::reservations::domain::ReservationQueue;
use crate::reservations::dto::ExpiryOutcome;

pub struct ExpireReservationsCommand {
    reservation_queue: Arc<dyn ReservationQueue>,
}

impl ExpireReservationsCommand {
    pub fn new(reservation_queue: Arc<dyn ReservationQueue>) -> Self {
        Self {
            reservation_queue,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExpireReservationsCommandRequest {}

#[derive(Debug, Serialize)]
pub struct ExpireReservationsCommandResponse {
    #[serde(flatten)]
    pub outcome: ExpiryOutcome,
}

#[async_trait]
impl Command<ExpireReservationsCommandRequest, ExpireReservationsCommandResponse> for ExpireReservationsCommand {
    async fn execute(&self, _req: ExpireReservationsCommandRequest) -> Result<ExpireReservationsCommandResponse, CommandError> {
        let outcome = self.reservation_queue.expire_lapsed().await?;
        Ok(ExpireReservationsCommandResponse { outcome })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::core::clock::SystemClock;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::factory::LibraryContext;
    use crate::reservations::command::expire_cmd::{ExpireReservationsCommand, ExpireReservationsCommandRequest};
    use crate::reservations::factory;

    #[tokio::test]
    async fn test_should_run_expire_on_empty_queue() {
        let context = LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock));
        let cmd = ExpireReservationsCommand::new(factory::create_reservation_queue(&context));
        let res = cmd.execute(ExpireReservationsCommandRequest::default()).await.expect("should expire");
        assert!(res.outcome.expired.is_empty());
        assert!(res.outcome.promoted.is_empty());
    }
}
