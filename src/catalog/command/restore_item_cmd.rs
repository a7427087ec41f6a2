use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogStore;
use crate::catalog::dto::CatalogItemDto;
use crate::core::command::{Command, CommandError};

pub struct RestoreItemCommand {
    catalog_store: Arc<dyn CatalogStore>,
}

impl RestoreItemCommand {
    pub fn new(catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog_store,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RestoreItemCommandRequest {
    pub item_id: String,
}

#[derive(Debug, Serialize)]
pub struct RestoreItemCommandResponse {
    pub item: CatalogItemDto,
}

#[async_trait]
impl Command<RestoreItemCommandRequest, RestoreItemCommandResponse> for RestoreItemCommand {
    async fn execute(&self, req: RestoreItemCommandRequest) -> Result<RestoreItemCommandResponse, CommandError> {
        self.catalog_store.restore_item(req.item_id.as_str()).await?
            .map(|item| RestoreItemCommandResponse { item })
            .ok_or_else(|| CommandError::not_found(format!("item {} not found", req.item_id).as_str()))
    }
}
