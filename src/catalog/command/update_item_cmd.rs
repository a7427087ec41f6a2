use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogStore;
use crate::catalog::dto::{CatalogItemDto, ItemChanges};
use crate::core::command::{Command, CommandError};

pub struct UpdateItemCommand {
    catalog_store: Arc<dyn CatalogStore>,
}

impl UpdateItemCommand {
    pub fn new(catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog_store,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemCommandRequest {
    pub item_id: String,
    #[serde(flatten)]
    pub changes: ItemChanges,
}

impl UpdateItemCommandRequest {
    pub fn new(item_id: &str, changes: ItemChanges) -> Self {
        Self {
            item_id: item_id.to_string(),
            changes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateItemCommandResponse {
    pub item: CatalogItemDto,
}

impl UpdateItemCommandResponse {
    pub fn new(item: CatalogItemDto) -> Self {
        Self {
            item,
        }
    }
}

#[async_trait]
impl Command<UpdateItemCommandRequest, UpdateItemCommandResponse> for UpdateItemCommand {
    async fn execute(&self, req: UpdateItemCommandRequest) -> Result<UpdateItemCommandResponse, CommandError> {
        self.catalog_store.update_item(req.item_id.as_str(), &req.changes).await?
            .map(UpdateItemCommandResponse::new)
            .ok_or_else(|| CommandError::not_found(format!("item {} not found", req.item_id).as_str()))
    }
}
