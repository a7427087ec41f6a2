use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronRegistry;
use crate::patrons::dto::{BorrowingStats, TopBorrower, TypeShares};

const DEFAULT_TOP_BORROWERS: usize = 5;

fn default_limit() -> usize {
    DEFAULT_TOP_BORROWERS
}

pub struct PatronStatsCommand {
    patron_registry: Arc<dyn PatronRegistry>,
}

impl PatronStatsCommand {
    pub fn new(patron_registry: Arc<dyn PatronRegistry>) -> Self {
        Self {
            patron_registry,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(tag = "stats", rename_all = "snake_case")]
pub enum PatronStatsCommandRequest {
    Borrowing,
    TopBorrowers {
        #[serde(default = "default_limit")]
        limit: usize,
    },
    PatronTypes,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PatronStatsCommandResponse {
    Borrowing { stats: BorrowingStats },
    TopBorrowers { borrowers: Vec<TopBorrower> },
    PatronTypes { shares: TypeShares },
}

#[async_trait]
impl Command<PatronStatsCommandRequest, PatronStatsCommandResponse> for PatronStatsCommand {
    async fn execute(&self, req: PatronStatsCommandRequest) -> Result<PatronStatsCommandResponse, CommandError> {
        let res = match req {
            PatronStatsCommandRequest::Borrowing => {
                PatronStatsCommandResponse::Borrowing { stats: self.patron_registry.borrowing_stats().await? }
            }
            PatronStatsCommandRequest::TopBorrowers { limit } => {
                PatronStatsCommandResponse::TopBorrowers { borrowers: self.patron_registry.top_borrowers(limit).await? }
            }
            PatronStatsCommandRequest::PatronTypes => {
                PatronStatsCommandResponse::PatronTypes { shares: self.patron_registry.borrowing_by_patron_type().await? }
            }
        };
        Ok(res)
    }
}
