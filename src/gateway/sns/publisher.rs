use std::collections::HashMap;
use std::sync::RwLock;
use aws_sdk_sns::Client;
use async_trait::async_trait;
use aws_sdk_sns::error::SdkError;
use aws_sdk_sns::operation::create_topic::CreateTopicError;
use aws_sdk_sns::operation::list_topics::ListTopicsError;
use aws_sdk_sns::operation::publish::PublishError;
use tracing::{debug, info};
use crate::core::events::DomainEvent;
use crate::core::library::LibraryError;
use crate::gateway::events::EventPublisher;

#[derive(Debug)]
pub struct SNSPublisher {
    client: Client,
    topics: RwLock<HashMap<String, String>>,
}

impl SNSPublisher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            topics: RwLock::new(HashMap::new()),
        }
    }

    fn cached_arn(&self, topic: &str) -> Option<String> {
        self.topics.read().ok().and_then(|topics| topics.get(topic).cloned())
    }
}

#[async_trait]
impl EventPublisher for SNSPublisher {
    // CreateTopic is idempotent in SNS, so it doubles as an arn lookup
    async fn create_topic(&self, topic: &str) -> Result<String, LibraryError> {
        let resp = self.client.create_topic().name(topic).send().await?;
        let arn = resp.topic_arn().unwrap_or_default().to_string();
        if let Ok(mut topics) = self.topics.write() {
            topics.insert(topic.to_string(), arn.to_string());
        }
        info!("Created topic with ARN: {}", arn);
        Ok(arn)
    }

    async fn get_topics(&self) -> Result<Vec<String>, LibraryError> {
        let mut topics = vec![];
        let resp = self.client.list_topics().send().await?;
        for topic in resp.topics().unwrap_or_default() {
            topics.push(topic.topic_arn().unwrap_or_default().to_string());
        }
        Ok(topics)
    }

    // one topic per bounded context; the event name travels as the subject
    async fn publish(&self, event: &DomainEvent) -> Result<(), LibraryError> {
        let topic = format!("lms-{}", event.group);
        let arn = match self.cached_arn(topic.as_str()) {
            Some(arn) => arn,
            None => self.create_topic(topic.as_str()).await?,
        };
        let json = serde_json::to_string(event)?;
        self.client.publish().topic_arn(arn).subject(event.name.as_str()).message(json).send().await?;
        debug!("published {} for {} to {}", event.name, event.key, topic);
        Ok(())
    }
}

impl From<SdkError<CreateTopicError>> for LibraryError {
    fn from(err: SdkError<CreateTopicError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}

impl From<SdkError<ListTopicsError>> for LibraryError {
    fn from(err: SdkError<ListTopicsError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}

impl From<SdkError<PublishError>> for LibraryError {
    fn from(err: SdkError<PublishError>) -> Self {
        LibraryError::runtime(format!("{:?}", err).as_str(), None)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use crate::core::events::DomainEvent;
    use crate::gateway::{factory, GatewayPublisherVia};

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_should_publish_to_sns() {
        let data = HashMap::from([("item_id", "TL00001")]);
        let event = DomainEvent::added("item_added", "catalog", "TL00001", &HashMap::new(), &data).expect("build event");
        let publisher = factory::create_publisher(GatewayPublisherVia::Sns).await;
        let arn = publisher.create_topic("lms-catalog").await.expect("should create topic");
        publisher.publish(&event).await.expect("should publish");
        let topics = publisher.get_topics().await.expect("should get topics");
        assert!(topics.contains(&arn));
    }
}
