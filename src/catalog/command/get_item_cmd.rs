use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogStore;
use crate::catalog::dto::CatalogItemDto;
use crate::core::command::{Command, CommandError};

pub struct GetItemCommand {
    catalog_store: Arc<dyn CatalogStore>,
}

impl GetItemCommand {
    pub fn new(catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog_store,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GetItemCommandRequest {
    pub item_id: String,
}

impl GetItemCommandRequest {
    pub fn new(item_id: String) -> Self {
        Self {
            item_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GetItemCommandResponse {
    pub item: CatalogItemDto,
}

impl GetItemCommandResponse {
    pub fn new(item: CatalogItemDto) -> Self {
        Self {
            item,
        }
    }
}

#[async_trait]
impl Command<GetItemCommandRequest, GetItemCommandResponse> for GetItemCommand {
    async fn execute(&self, req: GetItemCommandRequest) -> Result<GetItemCommandResponse, CommandError> {
        match self.catalog_store.find_item(req.item_id.as_str()).await? {
            Some(item) => Ok(GetItemCommandResponse::new(item)),
            None => Err(CommandError::not_found(format!("item {} not found", req.item_id).as_str())),
        }
    }
}
