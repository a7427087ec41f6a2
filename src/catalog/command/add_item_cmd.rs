use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogStore;
use crate::catalog::dto::CatalogItemDto;
use crate::core::command::{Command, CommandError};

pub struct AddItemCommand {
    catalog_store: Arc<dyn CatalogStore>,
}

impl AddItemCommand {
    pub fn new(catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog_store,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AddItemCommandRequest {
    pub title: String,
    pub category: String,
    pub copies: i64,
    #[serde(default)]
    pub restricted: bool,
}

impl AddItemCommandRequest {
    pub fn new(title: &str, category: &str, copies: i64) -> Self {
        Self {
            title: title.to_string(),
            category: category.to_string(),
            copies,
            restricted: false,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddItemCommandResponse {
    pub item: CatalogItemDto,
}

impl AddItemCommandResponse {
    pub fn new(item: CatalogItemDto) -> Self {
        Self {
            item,
        }
    }
}

#[async_trait]
impl Command<AddItemCommandRequest, AddItemCommandResponse> for AddItemCommand {
    async fn execute(&self, req: AddItemCommandRequest) -> Result<AddItemCommandResponse, CommandError> {
        self.catalog_store.add_item(req.title.as_str(), req.category.as_str(), req.copies, req.restricted)
            .await.map_err(CommandError::from).map(AddItemCommandResponse::new)
    }
}
