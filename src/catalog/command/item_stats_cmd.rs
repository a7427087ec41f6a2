use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::catalog::domain::CatalogStore;
use crate::catalog::dto::ItemStats;
use crate::core::command::{Command, CommandError};

pub struct ItemStatsCommand {
    catalog_store: Arc<dyn CatalogStore>,
}

impl ItemStatsCommand {
    pub fn new(catalog_store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog_store,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemStatsCommandRequest {}

#[derive(Debug, Serialize)]
pub struct ItemStatsCommandResponse {
    pub stats: ItemStats,
}

#[async_trait]
impl Command<ItemStatsCommandRequest, ItemStatsCommandResponse> for ItemStatsCommand {
    async fn execute(&self, _req: ItemStatsCommandRequest) -> Result<ItemStatsCommandResponse, CommandError> {
        let stats = self.catalog_store.item_stats().await?;
        Ok(ItemStatsCommandResponse { stats })
    }
}
