use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use crate::core::domain::Identifiable;
use crate::core::library::{ItemStatus, LibraryError, LibraryResult};
use crate::core::repository::{CATALOG_TABLE, Entity, Table};
use crate::utils::date::serializer;

// CatalogItemEntity abstracts a title held by the branch; every copy of it shares the record.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct CatalogItemEntity {
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

impl CatalogItemEntity {
    pub fn new(item_id: &str, title: &str, category: &str, copies: i64, restricted: bool, now: NaiveDateTime) -> Self {
        let mut item = Self {
            item_id: item_id.to_string(),
            version: 0,
            title: title.to_string(),
            category: category.to_string(),
            total_copies: copies,
            available_copies: copies,
            restricted,
            deleted: false,
            item_status: ItemStatus::Unavailable,
            created_at: now,
            updated_at: now,
        };
        item.refresh_status();
        item
    }

    pub fn lent_copies(&self) -> i64 {
        self.total_copies - self.available_copies
    }

    pub fn refresh_status(&mut self) {
        self.item_status = if self.available_copies > 0 && !self.deleted {
            ItemStatus::Available
        } else {
            ItemStatus::Unavailable
        };
    }

    pub fn take_copy(&mut self) -> LibraryResult<()> {
        if self.available_copies <= 0 {
            return Err(LibraryError::invariant(format!("item {} has no copy left to lend", self.item_id).as_str()));
        }
        self.available_copies -= 1;
        self.refresh_status();
        Ok(())
    }

    pub fn put_back_copy(&mut self) -> LibraryResult<()> {
        if self.available_copies >= self.total_copies {
            return Err(LibraryError::invariant(format!("item {} already has all {} copies on the shelf",
                                                       self.item_id, self.total_copies).as_str()));
        }
        self.available_copies += 1;
        self.refresh_status();
        Ok(())
    }
}

impl Identifiable for CatalogItemEntity {
    fn id(&self) -> String {
        self.item_id.to_string()
    }

    fn version(&self) -> i64 {
        self.version
    }
}

impl Entity for CatalogItemEntity {
    const TABLE: Table = CATALOG_TABLE;
    const ID_PREFIX: &'static str = "TL";
}
