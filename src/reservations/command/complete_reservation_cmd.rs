use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::reservations::domain::ReservationQueue;
use crate::reservations::dto::CompletedReservation;

pub struct CompleteReservationCommand {
    reservation_queue: Arc<dyn ReservationQueue>,
}

impl CompleteReservationCommand {
    pub fn new(reservation_queue: Arc<dyn ReservationQueue>) -> Self {
        Self {
            reservation_queue,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CompleteReservationCommandRequest {
    pub reservation_id: String,
}

impl CompleteReservationCommandRequest {
    pub fn new(reservation_id: String) -> Self {
        Self {
            reservation_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CompleteReservationCommandResponse {
    #[serde(flatten)]
    pub completed: CompletedReservation,
}

#[async_trait]
impl Command<CompleteReservationCommandRequest, CompleteReservationCommandResponse> for CompleteReservationCommand {
    async fn execute(&self, req: CompleteReservationCommandRequest) -> Result<CompleteReservationCommandResponse, CommandError> {
        self.reservation_queue.complete(req.reservation_id.as_str()).await?
            .map(|completed| CompleteReservationCommandResponse { completed })
            .ok_or_else(|| CommandError::not_found(format!("reservation {} not found", req.reservation_id).as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::catalog::factory::create_catalog_store;
    use crate::core::clock::SystemClock;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::factory::LibraryContext;
    use crate::core::library::ReservationStatus;
    use crate::lending::factory::create_lending_engine;
    use crate::patrons::factory::create_patron_registry;
    use crate::reservations::command::complete_reservation_cmd::{CompleteReservationCommand, CompleteReservationCommandRequest};
    use crate::reservations::factory;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_complete() {
        let context = CONTEXT.get().await;
        let patrons = create_patron_registry(context);
        let engine = create_lending_engine(context);
        let queue = factory::create_reservation_queue(context);
        let alice = patrons.register_patron("Alice", "alice@lib.org").await.expect("should register");
        let bob = patrons.register_patron("Bob", "bob@lib.org").await.expect("should register");
        let dune = create_catalog_store(context).add_item("Dune", "fiction", 1, false).await.expect("should add item");
        let ticket = engine.borrow(alice.patron_id.as_str(), &[dune.item_id.to_string()]).await.expect("should borrow");
        let reservation = queue.reserve(bob.patron_id.as_str(), dune.item_id.as_str()).await.expect("should reserve");

        let cmd = CompleteReservationCommand::new(queue);
        let early = cmd.execute(CompleteReservationCommandRequest::new(reservation.reservation_id.to_string())).await;
        assert!(matches!(early, Err(CommandError::Validation { .. })));

        engine.return_items(ticket.ticket_id.as_str(), &[dune.item_id.to_string()]).await.expect("should return");
        let res = cmd.execute(CompleteReservationCommandRequest::new(reservation.reservation_id.to_string()))
            .await.expect("should complete");
        assert_eq!(ReservationStatus::Completed, res.completed.reservation.reservation_status);
        assert_eq!(bob.patron_id, res.completed.ticket.patron_id);

        let missing = cmd.execute(CompleteReservationCommandRequest::new("RS99999".to_string())).await;
        assert!(matches!(missing, Err(CommandError::NotFound { .. })));
    }
}
