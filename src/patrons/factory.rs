use std::sync::Arc;
use crate::core::factory::LibraryContext;
use crate::patrons::domain::PatronRegistry;
use crate::patrons::domain::service::PatronRegistryImpl;

pub fn create_patron_registry(context: &LibraryContext) -> Arc<dyn PatronRegistry> {
    Arc::new(PatronRegistryImpl::new(context))
}
