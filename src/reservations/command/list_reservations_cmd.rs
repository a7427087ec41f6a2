use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::reservations::domain::ReservationQueue;
use crate::reservations::dto::ReservationDto;

pub struct ListReservationsCommand {
    reservation_queue: Arc<dyn ReservationQueue>,
}

impl ListReservationsCommand {
    pub fn new(reservation_queue: Arc<dyn ReservationQueue>) -> Self {
        Self {
            reservation_queue,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationList {
    Pending,
    Ready,
}

#[derive(Debug, Deserialize)]
pub struct ListReservationsCommandRequest {
    pub list: ReservationList,
    #[serde(default)]
    pub patron_id: Option<String>,
}

impl ListReservationsCommandRequest {
    pub fn new(list: ReservationList, patron_id: Option<String>) -> Self {
        Self {
            list,
            patron_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListReservationsCommandResponse {
    pub reservations: Vec<ReservationDto>,
}

#[async_trait]
impl Command<ListReservationsCommandRequest, ListReservationsCommandResponse> for ListReservationsCommand {
    async fn execute(&self, req: ListReservationsCommandRequest) -> Result<ListReservationsCommandResponse, CommandError> {
        let patron_id = req.patron_id.as_deref();
        let reservations = match req.list {
            ReservationList::Pending => self.reservation_queue.query_pending(patron_id).await?,
            ReservationList::Ready => self.reservation_queue.query_ready(patron_id).await?,
        };
        Ok(ListReservationsCommandResponse { reservations })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::catalog::factory::create_catalog_store;
    use crate::core::clock::SystemClock;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::factory::LibraryContext;
    use crate::lending::factory::create_lending_engine;
    use crate::patrons::factory::create_patron_registry;
    use crate::reservations::command::list_reservations_cmd::{ListReservationsCommand, ListReservationsCommandRequest, ReservationList};
    use crate::reservations::factory;

    #[tokio::test]
    async fn test_should_parse_list_request() {
        let req: ListReservationsCommandRequest = serde_json::from_str(r#"{"list": "ready"}"#).expect("should parse");
        assert_eq!(ReservationList::Ready, req.list);
        assert_eq!(None, req.patron_id);
    }

    #[tokio::test]
    async fn test_should_run_list_reservations() {
        let context = LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock));
        let patrons = create_patron_registry(&context);
        let queue = factory::create_reservation_queue(&context);
        let alice = patrons.register_patron("Alice", "alice@lib.org").await.expect("should register");
        let bob = patrons.register_patron("Bob", "bob@lib.org").await.expect("should register");
        let dune = create_catalog_store(&context).add_item("Dune", "fiction", 1, false).await.expect("should add item");
        create_lending_engine(&context).borrow(alice.patron_id.as_str(), &[dune.item_id.to_string()]).await.expect("should borrow");
        queue.reserve(bob.patron_id.as_str(), dune.item_id.as_str()).await.expect("should reserve");

        let cmd = ListReservationsCommand::new(queue);
        let res = cmd.execute(ListReservationsCommandRequest::new(ReservationList::Pending, None)).await.expect("should list");
        assert_eq!(1, res.reservations.len());
        let res = cmd.execute(ListReservationsCommandRequest::new(ReservationList::Pending, Some(alice.patron_id.to_string())))
            .await.expect("should list");
        assert!(res.reservations.is_empty());
        let res = cmd.execute(ListReservationsCommandRequest::new(ReservationList::Ready, None)).await.expect("should list");
        assert!(res.reservations.is_empty());
    }
}
