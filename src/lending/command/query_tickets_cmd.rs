use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::BorrowTicketDto;

pub struct QueryTicketsCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl QueryTicketsCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum TicketFilter {
    Unreturned,
    Overdue,
    Patron { patron_id: String },
}

#[derive(Debug, Deserialize)]
pub struct QueryTicketsCommandRequest {
    #[serde(flatten)]
    pub filter: TicketFilter,
}

impl QueryTicketsCommandRequest {
    pub fn new(filter: TicketFilter) -> Self {
        Self {
            filter,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryTicketsCommandResponse {
    pub tickets: Vec<BorrowTicketDto>,
}

#[async_trait]
impl Command<QueryTicketsCommandRequest, QueryTicketsCommandResponse> for QueryTicketsCommand {
    async fn execute(&self, req: QueryTicketsCommandRequest) -> Result<QueryTicketsCommandResponse, CommandError> {
        let tickets = match req.filter {
            TicketFilter::Unreturned => self.lending_engine.query_unreturned().await?,
            TicketFilter::Overdue => self.lending_engine.query_overdue().await?,
            TicketFilter::Patron { patron_id } => self.lending_engine.find_tickets_by_patron(patron_id.as_str()).await?,
        };
        Ok(QueryTicketsCommandResponse { tickets })
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
    use crate::lending::command::query_tickets_cmd::{QueryTicketsCommand, QueryTicketsCommandRequest, TicketFilter};
    use crate::lending::factory;
    use crate::patrons::factory::create_patron_registry;

    #[tokio::test]
    async fn test_should_parse_filters() {
        let req: QueryTicketsCommandRequest = serde_json::from_str(r#"{"filter": "patron", "patron_id": "RD00001"}"#)
            .expect("should parse");
        assert_eq!(TicketFilter::Patron { patron_id: "RD00001".to_string() }, req.filter);
        let req: QueryTicketsCommandRequest = serde_json::from_str(r#"{"filter": "overdue"}"#).expect("should parse");
        assert_eq!(TicketFilter::Overdue, req.filter);
    }

    #[tokio::test]
    async fn test_should_run_query_tickets() {
        let context = LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock));
        let engine = factory::create_lending_engine(&context);
        let patron = create_patron_registry(&context).register_patron("Ada", "ada@lib.org").await.expect("should register");
        let dune = create_catalog_store(&context).add_item("Dune", "fiction", 1, false).await.expect("should add item");
        engine.borrow(patron.patron_id.as_str(), &[dune.item_id.to_string()]).await.expect("should borrow");

        let cmd = QueryTicketsCommand::new(engine);
        let res = cmd.execute(QueryTicketsCommandRequest::new(TicketFilter::Unreturned)).await.expect("should query");
        assert_eq!(1, res.tickets.len());
        let res = cmd.execute(QueryTicketsCommandRequest::new(TicketFilter::Overdue)).await.expect("should query");
        assert!(res.tickets.is_empty());
        let res = cmd.execute(QueryTicketsCommandRequest::new(TicketFilter::Patron { patron_id: patron.patron_id.to_string() }))
            .await.expect("should query");
        assert_eq!(1, res.tickets.len());
    }
}
