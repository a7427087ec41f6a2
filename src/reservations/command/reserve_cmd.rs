use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::reservations::domain::ReservationQueue;
use crate::reservations::dto::ReservationDto;

pub struct ReserveCommand {
    reservation_queue: Arc<dyn ReservationQueue>,
}

impl ReserveCommand {
    pub fn new(reservation_queue: Arc<dyn ReservationQueue>) -> Self {
        Self {
            reservation_queue,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReserveCommandRequest {
    pub patron_id: String,
    pub item_id: String,
}

impl ReserveCommandRequest {
    pub fn new(patron_id: &str, item_id: &str) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            item_id: item_id.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReserveCommandResponse {
    pub reservation: ReservationDto,
}

impl ReserveCommandResponse {
    pub fn new(reservation: ReservationDto) -> Self {
        Self {
            reservation,
        }
    }
}

#[async_trait]
impl Command<ReserveCommandRequest, ReserveCommandResponse> for ReserveCommand {
    async fn execute(&self, req: ReserveCommandRequest) -> Result<ReserveCommandResponse, CommandError> {
        let reservation = self.reservation_queue.reserve(req.patron_id.as_str(), req.item_id.as_str()).await?;
        Ok(ReserveCommandResponse::new(reservation))
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
    use crate::reservations::command::reserve_cmd::{ReserveCommand, ReserveCommandRequest};
    use crate::reservations::factory;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_reserve() {
        let context = CONTEXT.get().await;
        let patrons = create_patron_registry(context);
        let alice = patrons.register_patron("Alice", "alice@lib.org").await.expect("should register");
        let bob = patrons.register_patron("Bob", "bob@lib.org").await.expect("should register");
        let dune = create_catalog_store(context).add_item("Dune", "fiction", 1, false).await.expect("should add item");

        let cmd = ReserveCommand::new(factory::create_reservation_queue(context));
        let early = cmd.execute(ReserveCommandRequest::new(bob.patron_id.as_str(), dune.item_id.as_str())).await;
        assert!(matches!(early, Err(CommandError::Validation { reason_code: Some(ref code), .. }) if code == "item_available"));

        create_lending_engine(context).borrow(alice.patron_id.as_str(), &[dune.item_id.to_string()]).await.expect("should borrow");
        let res = cmd.execute(ReserveCommandRequest::new(bob.patron_id.as_str(), dune.item_id.as_str()))
            .await.expect("should reserve");
        assert_eq!(ReservationStatus::Pending, res.reservation.reservation_status);
        assert_eq!(bob.patron_id, res.reservation.patron_id);
    }
}
