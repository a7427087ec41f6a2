use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::BorrowTicketDto;

pub struct UpdateBorrowCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl UpdateBorrowCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateBorrowCommandRequest {
    pub ticket_id: String,
    pub item_ids: Vec<String>,
}

impl UpdateBorrowCommandRequest {
    pub fn new(ticket_id: &str, item_ids: Vec<String>) -> Self {
        Self {
            ticket_id: ticket_id.to_string(),
            item_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateBorrowCommandResponse {
    pub ticket: BorrowTicketDto,
}

impl UpdateBorrowCommandResponse {
    pub fn new(ticket: BorrowTicketDto) -> Self {
        Self {
            ticket,
        }
    }
}

#[async_trait]
impl Command<UpdateBorrowCommandRequest, UpdateBorrowCommandResponse> for UpdateBorrowCommand {
    async fn execute(&self, req: UpdateBorrowCommandRequest) -> Result<UpdateBorrowCommandResponse, CommandError> {
        self.lending_engine.update_borrow(req.ticket_id.as_str(), &req.item_ids).await?
            .map(UpdateBorrowCommandResponse::new)
            .ok_or_else(|| CommandError::not_found(format!("borrow ticket {} not found", req.ticket_id).as_str()))
    }
}
