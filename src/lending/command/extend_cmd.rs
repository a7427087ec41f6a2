use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::BorrowTicketDto;

pub struct ExtendCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl ExtendCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ExtendCommandRequest {
    pub ticket_id: String,
}

impl ExtendCommandRequest {
    pub fn new(ticket_id: String) -> Self {
        Self {
            ticket_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ExtendCommandResponse {
    pub ticket: BorrowTicketDto,
}

#[async_trait]
impl Command<ExtendCommandRequest, ExtendCommandResponse> for ExtendCommand {
    async fn execute(&self, req: ExtendCommandRequest) -> Result<ExtendCommandResponse, CommandError> {
        let ticket = self.lending_engine.extend(req.ticket_id.as_str()).await?;
        Ok(ExtendCommandResponse { ticket })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use chrono::Duration;
    use lazy_static::lazy_static;
    use crate::catalog::factory::create_catalog_store;
    use crate::core::clock::SystemClock;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::factory::LibraryContext;
    use crate::lending::command::extend_cmd::{ExtendCommand, ExtendCommandRequest};
    use crate::lending::factory;
    use crate::patrons::factory::create_patron_registry;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_extend() {
        let context = CONTEXT.get().await;
        let engine = factory::create_lending_engine(context);
        let patron = create_patron_registry(context).register_patron("Ada", "ada@lib.org").await.expect("should register");
        let dune = create_catalog_store(context).add_item("Dune", "fiction", 1, false).await.expect("should add item");
        let ticket = engine.borrow(patron.patron_id.as_str(), &[dune.item_id.to_string()]).await.expect("should borrow");

        let cmd = ExtendCommand::new(engine);
        let res = cmd.execute(ExtendCommandRequest::new(ticket.ticket_id.to_string())).await.expect("should extend");
        assert_eq!(ticket.due_date + Duration::days(7), res.ticket.due_date);

        let twice = cmd.execute(ExtendCommandRequest::new(ticket.ticket_id.to_string())).await;
        assert!(matches!(twice, Err(CommandError::Validation { reason_code: Some(ref code), .. }) if code == "already_extended"));
    }
}
