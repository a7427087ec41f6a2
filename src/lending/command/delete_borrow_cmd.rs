use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;

pub struct DeleteBorrowCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl DeleteBorrowCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteBorrowCommandRequest {
    pub ticket_id: String,
}

impl DeleteBorrowCommandRequest {
    pub fn new(ticket_id: String) -> Self {
        Self {
            ticket_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteBorrowCommandResponse {
    pub ticket_id: String,
}

#[async_trait]
impl Command<DeleteBorrowCommandRequest, DeleteBorrowCommandResponse> for DeleteBorrowCommand {
    async fn execute(&self, req: DeleteBorrowCommandRequest) -> Result<DeleteBorrowCommandResponse, CommandError> {
        if self.lending_engine.delete_borrow(req.ticket_id.as_str()).await? {
            Ok(DeleteBorrowCommandResponse { ticket_id: req.ticket_id })
        } else {
            Err(CommandError::not_found(format!("borrow ticket {} not found", req.ticket_id).as_str()))
        }
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
    use crate::lending::command::delete_borrow_cmd::{DeleteBorrowCommand, DeleteBorrowCommandRequest};
    use crate::lending::factory;
    use crate::patrons::factory::create_patron_registry;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_delete_borrow() {
        let context = CONTEXT.get().await;
        let engine = factory::create_lending_engine(context);
        let catalog = create_catalog_store(context);
        let patron = create_patron_registry(context).register_patron("Ada", "ada@lib.org").await.expect("should register");
        let dune = catalog.add_item("Dune", "fiction", 1, false).await.expect("should add item");
        let ticket = engine.borrow(patron.patron_id.as_str(), &[dune.item_id.to_string()]).await.expect("should borrow");

        let cmd = DeleteBorrowCommand::new(engine);
        let res = cmd.execute(DeleteBorrowCommandRequest::new(ticket.ticket_id.to_string())).await.expect("should delete");
        assert_eq!(ticket.ticket_id, res.ticket_id);
        let item = catalog.find_item(dune.item_id.as_str()).await.expect("should find").expect("should exist");
        assert_eq!(1, item.available_copies);

        let again = cmd.execute(DeleteBorrowCommandRequest::new(ticket.ticket_id.to_string())).await;
        assert!(matches!(again, Err(CommandError::NotFound { .. })));
    }
}
