use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::patrons::dto::PatronDto;
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronRegistry;

pub struct AddPatronCommand {
    patron_registry: Arc<dyn PatronRegistry>,
}

impl AddPatronCommand {
    pub fn new(patron_registry: Arc<dyn PatronRegistry>) -> Self {
        Self {
            patron_registry,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddPatronCommandRequest {
    pub full_name: String,
    pub email: String,
}

impl AddPatronCommandRequest {
    pub fn new(full_name: &str, email: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            email: email.to_string(),
        }
    }
}


#[derive(Debug, Serialize)]
pub struct AddPatronCommandResponse {
    pub patron: PatronDto,
}

impl AddPatronCommandResponse {
    pub fn new(patron: PatronDto) -> Self {
        Self {
            patron,
        }
    }
}

#[async_trait]
impl Command<AddPatronCommandRequest, AddPatronCommandResponse> for AddPatronCommand {
    async fn execute(&self, req: AddPatronCommandRequest) -> Result<AddPatronCommandResponse, CommandError> {
        self.patron_registry.register_patron(req.full_name.as_str(), req.email.as_str())
            .await.map_err(CommandError::from).map(AddPatronCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::core::clock::SystemClock;
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::factory::LibraryContext;
    use crate::core::library::PatronStatus;
    use crate::patrons::command::add_patron_cmd::{AddPatronCommand, AddPatronCommandRequest};
    use crate::patrons::factory;

    lazy_static! {
        static ref SUT_CMD: AsyncOnce<AddPatronCommand> = AsyncOnce::new(async {
                let context = LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock));
                AddPatronCommand::new(factory::create_patron_registry(&context))
            });
    }

    #[tokio::test]
    async fn test_should_run_add_patron() {
        let cmd = SUT_CMD.get().await;
        let res = cmd.execute(AddPatronCommandRequest::new("Ada Lovelace", "ada@lib.org")).await.expect("should add patron");
        assert!(res.patron.patron_id.starts_with("RD"));
        assert_eq!("ada@lib.org", res.patron.email.as_str());
        assert_eq!(PatronStatus::Active, res.patron.status);
    }
}
