use std::collections::BTreeSet;
use std::sync::Mutex;
use async_trait::async_trait;
use tracing::info;
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

// LogPublisher writes events to the structured log and keeps them for inspection.
#[derive(Debug, Default)]
pub struct LogPublisher {
    topics: Mutex<BTreeSet<String>>,
    published: Mutex<Vec<DomainEvent>>,
}

impl LogPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<DomainEvent> {
        self.published.lock().map(|events| events.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventPublisher for LogPublisher {
    async fn create_topic(&self, topic: &str) -> Result<String, LibraryError> {
        let mut topics = self.topics.lock().map_err(|_| LibraryError::runtime("topics lock poisoned", None))?;
        topics.insert(topic.to_string());
        Ok(format!("log:{}", topic))
    }

    async fn get_topics(&self) -> Result<Vec<String>, LibraryError> {
        let topics = self.topics.lock().map_err(|_| LibraryError::runtime("topics lock poisoned", None))?;
        Ok(topics.iter().map(|t| format!("log:{}", t)).collect())
    }

    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let json = serde_json::to_string(event)?;
        info!(event = event.name.as_str(), key = event.key.as_str(), "{}", json);
        let mut published = self.published.lock().map_err(|_| LibraryError::runtime("events lock poisoned", None))?;
        published.push(event.clone());
        Ok(())
    }
}
