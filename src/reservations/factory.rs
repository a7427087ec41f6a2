use std::sync::Arc;
use crate::catalog::factory::create_catalog_store;
use crate::core::factory::LibraryContext;
use crate::lending::domain::LendingEngine;
use crate::lending::domain::service::LendingEngineImpl;
use crate::patrons::factory::create_patron_registry;
use crate::reservations::domain::ReservationQueue;
use crate::reservations::domain::service::ReservationQueueImpl;

pub fn create_reservation_queue(context: &LibraryContext) -> Arc<dyn ReservationQueue> {
    let patrons = create_patron_registry(context);
    let catalog = create_catalog_store(context);
    let engine: Arc<dyn LendingEngine> = Arc::new(LendingEngineImpl::new(context, patrons.clone(), catalog.clone()));
    Arc::new(ReservationQueueImpl::new(context, patrons, catalog, engine))
}
