use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogStore;
use crate::catalog::dto::CatalogItemDto;
use crate::core::command::{Command, CommandError};

const DEFAULT_PAGE_SIZE: usize = 50;

pub struct QueryItemsCommand {
    catalog_store: Arc<dyn CatalogStore>,
}

impl QueryItemsCommand {
    pub fn new(catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog_store,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryItemsCommandRequest {
    #[serde(default)]
    pub predicate: HashMap<String, String>,
    pub page: Option<String>,
    pub page_size: Option<usize>,
}

impl QueryItemsCommandRequest {
    // page and page_size are paging controls; every other parameter filters
    pub fn from_params(mut params: HashMap<String, String>) -> Self {
        let page = params.remove("page");
        let page_size = params.remove("page_size").and_then(|s| s.parse::<usize>().ok());
        Self {
            predicate: params,
            page,
            page_size,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryItemsCommandResponse {
    pub items: Vec<CatalogItemDto>,
    pub next_page: Option<String>,
}

#[async_trait]
impl Command<QueryItemsCommandRequest, QueryItemsCommandResponse> for QueryItemsCommand {
    async fn execute(&self, req: QueryItemsCommandRequest) -> Result<QueryItemsCommandResponse, CommandError> {
        let res = self.catalog_store.query_items(&req.predicate, req.page.as_deref(),
                                                 req.page_size.unwrap_or(DEFAULT_PAGE_SIZE)).await?;
        Ok(QueryItemsCommandResponse { items: res.records, next_page: res.next_page })
    }
}
