use std::collections::BTreeMap;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::ItemStatus;
use crate::utils::date::serializer;

// CatalogItemDto is a data transfer object for the catalog service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItemDto {
    pub item_id: String,
    pub version: i64,
    pub title: String,
    pub category: String,
    pub total_copies: i64,
    pub available_copies: i64,
    pub restricted: bool,
    pub deleted: bool,
    pub item_status: ItemStatus,
    #[serde(with = "serializer")]
    pub created_at: NaiveDateTime,
    #[serde(with = "serializer")]
    pub updated_at: NaiveDateTime,
}

impl Identifiable for CatalogItemDto {
    fn id(&self) -> String {
        self.item_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

// ItemChanges lists the fields an update touches; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemChanges {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub restricted: Option<bool>,
    #[serde(default)]
    pub total_copies: Option<i64>,
}

// ItemStats sums the copies owned per title, category, status and restriction flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemStats {
    pub by_title: BTreeMap<String, i64>,
    pub by_category: BTreeMap<String, i64>,
    pub by_status: BTreeMap<String, i64>,
    pub by_restricted: BTreeMap<String, i64>,
}
