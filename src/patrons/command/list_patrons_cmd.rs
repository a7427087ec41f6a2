use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronRegistry;
use crate::patrons::dto::PatronDto;

pub struct ListPatronsCommand {
    patron_registry: Arc<dyn PatronRegistry>,
}

impl ListPatronsCommand {
    pub fn new(patron_registry: Arc<dyn PatronRegistry>) -> Self {
        Self {
            patron_registry,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatronReport {
    Fines,
    Overdue,
}

#[derive(Debug, Deserialize)]
pub struct ListPatronsCommandRequest {
    pub report: PatronReport,
}

#[derive(Debug, Serialize)]
pub struct ListPatronsCommandResponse {
    pub patrons: Vec<PatronDto>,
}

#[async_trait]
impl Command<ListPatronsCommandRequest, ListPatronsCommandResponse> for ListPatronsCommand {
    async fn execute(&self, req: ListPatronsCommandRequest) -> Result<ListPatronsCommandResponse, CommandError> {
        let patrons = match req.report {
            PatronReport::Fines => self.patron_registry.patrons_with_fines().await?,
            PatronReport::Overdue => self.patron_registry.patrons_with_overdue_loans().await?,
        };
        Ok(ListPatronsCommandResponse { patrons })
    }
}
