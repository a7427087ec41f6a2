use std::sync::Arc;
use crate::catalog::factory::create_catalog_store;
use crate::core::factory::LibraryContext;
use crate::lending::domain::LendingEngine;
use crate::lending::domain::service::LendingEngineImpl;
use crate::patrons::factory::create_patron_registry;

pub fn create_lending_engine(context: &LibraryContext) -> Arc<dyn LendingEngine> {
    Arc::new(LendingEngineImpl::new(context, create_patron_registry(context), create_catalog_store(context)))
}
