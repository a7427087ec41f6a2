use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::{BorrowTicketDto, ReturnTicketDto};

pub struct GetTicketCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl GetTicketCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetTicketCommandRequest {
    pub ticket_id: String,
}

impl GetTicketCommandRequest {
    pub fn new(ticket_id: String) -> Self {
        Self {
            ticket_id,
        }
    }
}

// a borrow ticket together with the return tickets filed against it
#[derive(Debug, Serialize)]
pub struct GetTicketCommandResponse {
    pub ticket: BorrowTicketDto,
    pub returns: Vec<ReturnTicketDto>,
}

#[async_trait]
impl Command<GetTicketCommandRequest, GetTicketCommandResponse> for GetTicketCommand {
    async fn execute(&self, req: GetTicketCommandRequest) -> Result<GetTicketCommandResponse, CommandError> {
        let ticket = self.lending_engine.find_borrow_ticket(req.ticket_id.as_str()).await?
            .ok_or_else(|| CommandError::not_found(format!("borrow ticket {} not found", req.ticket_id).as_str()))?;
        let returns = self.lending_engine.find_returns_by_ticket(req.ticket_id.as_str()).await?;
        Ok(GetTicketCommandResponse { ticket, returns })
    }
}
