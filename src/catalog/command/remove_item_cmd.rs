use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogStore;
use crate::core::command::{Command, CommandError};

pub struct RemoveItemCommand {
    catalog_store: Arc<dyn CatalogStore>,
}

impl RemoveItemCommand {
    pub fn new(catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog_store,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemCommandRequest {
    pub item_id: String,
}

impl RemoveItemCommandRequest {
    pub fn new(item_id: String) -> Self {
        Self {
            item_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RemoveItemCommandResponse {
    pub item_id: String,
}

impl RemoveItemCommandResponse {
    pub fn new(item_id: String) -> Self {
        Self {
            item_id,
        }
    }
}

#[async_trait]
impl Command<RemoveItemCommandRequest, RemoveItemCommandResponse> for RemoveItemCommand {
    async fn execute(&self, req: RemoveItemCommandRequest) -> Result<RemoveItemCommandResponse, CommandError> {
        if self.catalog_store.remove_item(req.item_id.as_str()).await? {
            Ok(RemoveItemCommandResponse::new(req.item_id))
        } else {
            Err(CommandError::not_found(format!("item {} not found", req.item_id).as_str()))
        }
    }
}
