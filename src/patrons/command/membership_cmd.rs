use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronRegistry;
use crate::patrons::dto::PatronDto;

pub struct MembershipCommand {
    patron_registry: Arc<dyn PatronRegistry>,
}

impl MembershipCommand {
    pub fn new(patron_registry: Arc<dyn PatronRegistry>) -> Self {
        Self {
            patron_registry,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MembershipAction {
    Suspend { reason: String },
    Renew,
    Restore {
        #[serde(default)]
        paid_fine: bool,
        #[serde(default)]
        paid_annual_fee: bool,
    },
}

#[derive(Debug, Deserialize)]
pub struct MembershipCommandRequest {
    pub patron_id: String,
    #[serde(flatten)]
    pub action: MembershipAction,
}

impl MembershipCommandRequest {
    pub fn new(patron_id: &str, action: MembershipAction) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            action,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MembershipCommandResponse {
    pub patron: PatronDto,
}

impl MembershipCommandResponse {
    pub fn new(patron: PatronDto) -> Self {
        Self {
            patron,
        }
    }
}

#[async_trait]
impl Command<MembershipCommandRequest, MembershipCommandResponse> for MembershipCommand {
    async fn execute(&self, req: MembershipCommandRequest) -> Result<MembershipCommandResponse, CommandError> {
        let id = req.patron_id.as_str();
        let res = match req.action {
            MembershipAction::Suspend { ref reason } => self.patron_registry.suspend_patron(id, reason.as_str()).await?,
            MembershipAction::Renew => self.patron_registry.renew_membership(id).await?,
            MembershipAction::Restore { paid_fine, paid_annual_fee } => {
                self.patron_registry.restore_patron(id, paid_fine, paid_annual_fee).await?
            }
        };
        res.map(MembershipCommandResponse::new)
            .ok_or_else(|| CommandError::not_found(format!("patron {} not found", id).as_str()))
    }
}
