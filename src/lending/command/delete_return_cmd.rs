use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;

pub struct DeleteReturnCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl DeleteReturnCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteReturnCommandRequest {
    pub return_id: String,
}

impl DeleteReturnCommandRequest {
    pub fn new(return_id: String) -> Self {
        Self {
            return_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteReturnCommandResponse {
    pub return_id: String,
}

#[async_trait]
impl Command<DeleteReturnCommandRequest, DeleteReturnCommandResponse> for DeleteReturnCommand {
    async fn execute(&self, req: DeleteReturnCommandRequest) -> Result<DeleteReturnCommandResponse, CommandError> {
        if self.lending_engine.delete_return(req.return_id.as_str()).await? {
            Ok(DeleteReturnCommandResponse { return_id: req.return_id })
        } else {
            Err(CommandError::not_found(format!("return ticket {} not found", req.return_id).as_str()))
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
    use crate::core::library::TicketStatus;
    use crate::lending::command::delete_return_cmd::{DeleteReturnCommand, DeleteReturnCommandRequest};
    use crate::lending::factory;
    use crate::patrons::factory::create_patron_registry;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_delete_return() {
        let context = CONTEXT.get().await;
        let engine = factory::create_lending_engine(context);
        let patron = create_patron_registry(context).register_patron("Ada", "ada@lib.org").await.expect("should register");
        let dune = create_catalog_store(context).add_item("Dune", "fiction", 1, false).await.expect("should add item");
        let ticket = engine.borrow(patron.patron_id.as_str(), &[dune.item_id.to_string()]).await.expect("should borrow");
        let ret = engine.return_items(ticket.ticket_id.as_str(), &[dune.item_id.to_string()]).await.expect("should return");

        let cmd = DeleteReturnCommand::new(engine.clone());
        let res = cmd.execute(DeleteReturnCommandRequest::new(ret.return_id.to_string())).await.expect("should delete");
        assert_eq!(ret.return_id, res.return_id);
        let loaded = engine.find_borrow_ticket(ticket.ticket_id.as_str()).await.expect("should find").expect("should exist");
        assert_eq!(TicketStatus::Borrowed, loaded.ticket_status);

        let again = cmd.execute(DeleteReturnCommandRequest::new(ret.return_id.to_string())).await;
        assert!(matches!(again, Err(CommandError::NotFound { .. })));
    }
}
