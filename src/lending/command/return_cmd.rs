use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::ReturnTicketDto;

pub struct ReturnItemsCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl ReturnItemsCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReturnItemsCommandRequest {
    pub ticket_id: String,
    pub item_ids: Vec<String>,
}

impl ReturnItemsCommandRequest {
    pub fn new(ticket_id: &str, item_ids: Vec<String>) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            item_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReturnItemsCommandResponse {
    pub return_ticket: ReturnTicketDto,
}

impl ReturnItemsCommandResponse {
    pub fn new(return_ticket: ReturnTicketDto) -> Self {
        Self {
            return_ticket,
        }
    }
}

#[async_trait]
impl Command<ReturnItemsCommandRequest, ReturnItemsCommandResponse> for ReturnItemsCommand {
    async fn execute(&self, req: ReturnItemsCommandRequest) -> Result<ReturnItemsCommandResponse, CommandError> {
        let return_ticket = self.lending_engine.return_items(req.ticket_id.as_str(), &req.item_ids).await?;
        Ok(ReturnItemsCommandResponse::new(return_ticket))
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
    use crate::lending::command::return_cmd::{ReturnItemsCommand, ReturnItemsCommandRequest};
    use crate::lending::factory;
    use crate::patrons::factory::create_patron_registry;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_return() {
        let context = CONTEXT.get().await;
        let engine = factory::create_lending_engine(context);
        let patron = create_patron_registry(context).register_patron("Ada", "ada@lib.org").await.expect("should register");
        let dune = create_catalog_store(context).add_item("Dune", "fiction", 1, false).await.expect("should add item");
        let ticket = engine.borrow(patron.patron_id.as_str(), &[dune.item_id.to_string()]).await.expect("should borrow");

        let cmd = ReturnItemsCommand::new(engine);
        let res = cmd.execute(ReturnItemsCommandRequest::new(ticket.ticket_id.as_str(), vec![dune.item_id.to_string()]))
            .await.expect("should return");
        assert_eq!(ticket.ticket_id, res.return_ticket.borrow_ticket_id);
        assert_eq!(0, res.return_ticket.total_fine);

        let missing = cmd.execute(ReturnItemsCommandRequest::new("BR99999", vec![dune.item_id.to_string()])).await;
        assert!(matches!(missing, Err(CommandError::Validation { .. })));
    }
}
