use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronRegistry;
use crate::patrons::dto::{PatronChanges, PatronDto};

pub struct UpdatePatronCommand {
    patron_registry: Arc<dyn PatronRegistry>,
}

impl UpdatePatronCommand {
    pub fn new(patron_registry: Arc<dyn PatronRegistry>) -> Self {
        Self {
            patron_registry,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePatronCommandRequest {
    pub patron_id: String,
    #[serde(flatten)]
    pub changes: PatronChanges,
}

impl UpdatePatronCommandRequest {
    pub fn new(patron_id: &str, changes: PatronChanges) -> Self {
        Self {
            patron_id: patron_id.to_string(),
            changes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatePatronCommandResponse {
    pub patron: PatronDto,
}

impl UpdatePatronCommandResponse {
    pub fn new(patron: PatronDto) -> Self {
        Self {
            patron,
        }
    }
}

#[async_trait]
impl Command<UpdatePatronCommandRequest, UpdatePatronCommandResponse> for UpdatePatronCommand {
    async fn execute(&self, req: UpdatePatronCommandRequest) -> Result<UpdatePatronCommandResponse, CommandError> {
        self.patron_registry.update_patron(req.patron_id.as_str(), &req.changes).await?
            .map(UpdatePatronCommandResponse::new)
            .ok_or_else(|| CommandError::not_found(format!("patron {} not found", req.patron_id).as_str()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::core::clock::SystemClock;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::factory::LibraryContext;
    use crate::patrons::command::add_patron_cmd::{AddPatronCommand, AddPatronCommandRequest};
    use crate::patrons::command::update_patron_cmd::{UpdatePatronCommand, UpdatePatronCommandRequest};
    use crate::patrons::dto::PatronChanges;
    use crate::patrons::factory;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_parse_partial_update() {
        let req: UpdatePatronCommandRequest = serde_json::from_str(
            r#"{"patron_id": "RD00001", "restricted_access": true, "max_books": 8}"#).expect("should parse");
        assert_eq!(Some(true), req.changes.restricted_access);
        assert_eq!(Some(8), req.changes.max_books);
        assert_eq!(None, req.changes.email);
    }

    #[tokio::test]
    async fn test_should_run_update_patron() {
        let context = CONTEXT.get().await;
        let add_cmd = AddPatronCommand::new(factory::create_patron_registry(context));
        let update_cmd = UpdatePatronCommand::new(factory::create_patron_registry(context));

        let added = add_cmd.execute(AddPatronCommandRequest::new("Ada", "ada@lib.org")).await.expect("should add patron");
        let changes = PatronChanges { email: Some("ada@uni.edu".to_string()), restricted_access: Some(true), ..Default::default() };
        let res = update_cmd.execute(UpdatePatronCommandRequest::new(added.patron.patron_id.as_str(), changes))
            .await.expect("should update patron");
        assert_eq!("ada@uni.edu", res.patron.email.as_str());
        assert_eq!("Ada", res.patron.full_name.as_str());
        assert!(res.patron.restricted_access);

        let missing = update_cmd.execute(UpdatePatronCommandRequest::new("RD99999", PatronChanges::default())).await;
        assert!(matches!(missing, Err(CommandError::NotFound { .. })));
    }
}
