use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronRegistry;

pub struct RemovePatronCommand {
    patron_registry: Arc<dyn PatronRegistry>,
}

impl RemovePatronCommand {
    pub fn new(patron_registry: Arc<dyn PatronRegistry>) -> Self {
        Self {
            patron_registry,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemovePatronCommandRequest {
    pub patron_id: String,
}

impl RemovePatronCommandRequest {
    pub fn new(patron_id: String) -> Self {
        Self {
            patron_id,
        }
    }
}


#[derive(Debug, Serialize)]
pub struct RemovePatronCommandResponse {
    pub patron_id: String,
}

impl RemovePatronCommandResponse {
    pub fn new(patron_id: String) -> Self {
        Self {
            patron_id,
        }
    }
}

#[async_trait]
impl Command<RemovePatronCommandRequest, RemovePatronCommandResponse> for RemovePatronCommand {
    async fn execute(&self, req: RemovePatronCommandRequest) -> Result<RemovePatronCommandResponse, CommandError> {
        if self.patron_registry.remove_patron(req.patron_id.as_str()).await? {
            Ok(RemovePatronCommandResponse::new(req.patron_id))
        } else {
            Err(CommandError::not_found(format!("patron {} not found", req.patron_id).as_str()))
        }
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
    use crate::patrons::command::remove_patron_cmd::{RemovePatronCommand, RemovePatronCommandRequest};
    use crate::patrons::factory;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_remove_patron() {
        let context = CONTEXT.get().await;
        let add_cmd = AddPatronCommand::new(factory::create_patron_registry(context));
        let remove_cmd = RemovePatronCommand::new(factory::create_patron_registry(context));

        let add_res = add_cmd.execute(AddPatronCommandRequest::new("Ada", "ada@lib.org")).await.expect("should add patron");
        let id = add_res.patron.patron_id;
        let res = remove_cmd.execute(RemovePatronCommandRequest::new(id.to_string())).await.expect("should remove patron");
        assert_eq!(id, res.patron_id);
        let again = remove_cmd.execute(RemovePatronCommandRequest::new(id.to_string())).await;
        assert!(matches!(again, Err(CommandError::NotFound { .. })));
    }
}
