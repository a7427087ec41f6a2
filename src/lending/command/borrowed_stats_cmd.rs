use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::lending::domain::LendingEngine;
use crate::lending::dto::BorrowedItemStats;

pub struct BorrowedStatsCommand {
    lending_engine: Arc<dyn LendingEngine>,
}

impl BorrowedStatsCommand {
    pub fn new(lending_engine: Arc<dyn LendingEngine>) -> Self {
        Self {
            lending_engine,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BorrowedStatsCommandRequest {}

#[derive(Debug, Serialize)]
pub struct BorrowedStatsCommandResponse {
    pub stats: BorrowedItemStats,
}

#[async_trait]
impl Command<BorrowedStatsCommandRequest, BorrowedStatsCommandResponse> for BorrowedStatsCommand {
    async fn execute(&self, _req: BorrowedStatsCommandRequest) -> Result<BorrowedStatsCommandResponse, CommandError> {
        let stats = self.lending_engine.borrowed_item_stats().await?;
        Ok(BorrowedStatsCommandResponse { stats })
    }
}
