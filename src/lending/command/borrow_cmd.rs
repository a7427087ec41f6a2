use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::BorrowTicketDto;

pub struct BorrowCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl BorrowCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BorrowCommandRequest {
    pub patron_id: String,
    pub item_ids: Vec<String>,
}

impl BorrowCommandRequest {
    pub fn new(patron_id: &str, item_ids: Vec<String>) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            item_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BorrowCommandResponse {
    pub ticket: BorrowTicketDto,
}

impl BorrowCommandResponse {
    pub fn new(ticket: BorrowTicketDto) -> Self {
        Self {
            ticket,
        }
    }
}

#[async_trait]
impl Command<BorrowCommandRequest, BorrowCommandResponse> for BorrowCommand {
    async fn execute(&self, req: BorrowCommandRequest) -> Result<BorrowCommandResponse, CommandError> {
        let ticket = self.lending_engine.borrow(req.patron_id.as_str(), &req.item_ids).await?;
        Ok(BorrowCommandResponse::new(ticket))
    }
}
