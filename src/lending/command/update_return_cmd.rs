use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::ReturnTicketDto;

pub struct UpdateReturnCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl UpdateReturnCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateReturnCommandRequest {
    pub return_id: String,
    pub item_ids: Vec<String>,
}

impl UpdateReturnCommandRequest {
    pub fn new(return_id: &str, item_ids: Vec<String>) -> Self {
        Self {
            return_id: return_id.to_string(),
            item_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateReturnCommandResponse {
    pub return_ticket: ReturnTicketDto,
}

#[async_trait]
impl Command<UpdateReturnCommandRequest, UpdateReturnCommandResponse> for UpdateReturnCommand {
    async fn execute(&self, req: UpdateReturnCommandRequest) -> Result<UpdateReturnCommandResponse, CommandError> {
        self.lending_engine.update_return(req.return_id.as_str(), &req.item_ids).await?
            .map(|return_ticket| UpdateReturnCommandResponse { return_ticket })
            .ok_or_else(|| CommandError::not_found(format!("return ticket {} not found", req.return_id).as_str()))
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
    use crate::lending::command::update_return_cmd::{UpdateReturnCommand, UpdateReturnCommandRequest};
    use crate::lending::factory;
    use crate::patrons::factory::create_patron_registry;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_update_return() {
        let context = CONTEXT.get().await;
        let engine = factory::create_lending_engine(context);
        let catalog = create_catalog_store(context);
        let patron = create_patron_registry(context).register_patron("Ada", "ada@lib.org").await.expect("should register");
        let dune = catalog.add_item("Dune", "fiction", 1, false).await.expect("should add item");
        let emma = catalog.add_item("Emma", "fiction", 1, false).await.expect("should add item");
        let items = vec![dune.item_id.to_string(), emma.item_id.to_string()];
        let ticket = engine.borrow(patron.patron_id.as_str(), &items).await.expect("should borrow");
        let ret = engine.return_items(ticket.ticket_id.as_str(), &items).await.expect("should return");

        let cmd = UpdateReturnCommand::new(engine);
        let res = cmd.execute(UpdateReturnCommandRequest::new(ret.return_id.as_str(), vec![emma.item_id.to_string()]))
            .await.expect("should update");
        assert_eq!(vec![emma.item_id.to_string()], res.return_ticket.item_ids);
        let item = catalog.find_item(dune.item_id.as_str()).await.expect("should find").expect("should exist");
        assert_eq!(0, item.available_copies);

        let missing = cmd.execute(UpdateReturnCommandRequest::new("RT99999", vec![emma.item_id.to_string()])).await;
        assert!(matches!(missing, Err(CommandError::NotFound { .. })));
    }
}
