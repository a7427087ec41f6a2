use std::sync::Arc;
use crate::catalog::domain::CatalogStore;
use crate::catalog::domain::service::CatalogStoreImpl;
use crate::core::factory::LibraryContext;

pub fn create_catalog_store(context: &LibraryContext) -> Arc<dyn CatalogStore> {
    Arc::new(CatalogStoreImpl::new(context))
}
