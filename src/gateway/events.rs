use async_trait::async_trait;
use tracing::warn;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;

#[async_trait]
pub trait EventPublisher: Sync + Send {
    async fn create_topic(&self, topic: &str) -> Result<String, LibraryError>;
    async fn get_topics(&self) -> Result<Vec<String>, LibraryError>;
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError>;
}

// publish_all sends events that belong to an already committed change; failures are only logged
// and the count of delivered events is returned.
pub async fn publish_all(publisher: &dyn EventPublisher, events: &[DomainEvent]) -> usize {
    let mut delivered = 0;
    for event in events {
        match publisher.publish(event).await {
            Ok(_) => delivered += 1,
            Err(err) => warn!("failed to publish {} for {}: {}", event.name, event.key, err),
        }
    }
    delivered
}
