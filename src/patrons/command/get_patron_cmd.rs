use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::patrons::dto::PatronDto;
use crate::core::command::{Command, CommandError};
use crate::patrons::domain::PatronRegistry;

pub struct GetPatronCommand {
    patron_registry: Arc<dyn PatronRegistry>,
}

impl GetPatronCommand {
    pub fn new(patron_registry: Arc<dyn PatronRegistry>) -> Self {
        Self {
            patron_registry,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetPatronCommandRequest {
    pub patron_id: String,
}

impl GetPatronCommandRequest {
    pub fn new(patron_id: String) -> Self {
        Self {
            patron_id,
        }
    }
}


#[derive(Debug, Serialize)]
pub struct GetPatronCommandResponse {
    pub patron: PatronDto,
}

impl GetPatronCommandResponse {
    pub fn new(patron: PatronDto) -> Self {
        Self {
            patron,
        }
    }
}

#[async_trait]
impl Command<GetPatronCommandRequest, GetPatronCommandResponse> for GetPatronCommand {
    async fn execute(&self, req: GetPatronCommandRequest) -> Result<GetPatronCommandResponse, CommandError> {
        match self.patron_registry.find_patron(req.patron_id.as_str()).await? {
            Some(patron) => Ok(GetPatronCommandResponse::new(patron)),
            None => Err(CommandError::not_found(format!("patron {} not found", req.patron_id).as_str())),
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
    use crate::patrons::command::get_patron_cmd::{GetPatronCommand, GetPatronCommandRequest};
    use crate::patrons::factory;

    lazy_static! {
        static ref CONTEXT: AsyncOnce<LibraryContext> = AsyncOnce::new(async {
                LibraryContext::in_memory(&Configuration::new("test"), Arc::new(SystemClock))
            });
    }

    #[tokio::test]
    async fn test_should_run_get_patron() {
        let context = CONTEXT.get().await;
        let add_cmd = AddPatronCommand::new(factory::create_patron_registry(context));
        let get_cmd = GetPatronCommand::new(factory::create_patron_registry(context));

        let add_res = add_cmd.execute(AddPatronCommandRequest::new("Ada", "ada@lib.org")).await.expect("should add patron");
        let get_res = get_cmd.execute(GetPatronCommandRequest::new(add_res.patron.patron_id.to_string())).await.expect("should get patron");
        assert_eq!(add_res.patron.patron_id, get_res.patron.patron_id);
        assert_eq!(add_res.patron.email, get_res.patron.email);

        let missing = get_cmd.execute(GetPatronCommandRequest::new("RD99999".to_string())).await;
        assert!(matches!(missing, Err(CommandError::NotFound { .. })));
    }
}
