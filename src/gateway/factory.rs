use std::sync::Arc;
use crate::gateway::events::EventPublisher;
use crate::gateway::GatewayPublisherVia;
use crate::gateway::logs::publisher::LogPublisher;
use crate::gateway::sns::publisher::SNSPublisher;
use crate::utils::ddb::build_sns_client;

pub async fn create_publisher(via: GatewayPublisherVia) -> Arc<dyn EventPublisher> {
    match via {
        GatewayPublisherVia::Sns => {
            let client = build_sns_client().await;
            Arc::new(SNSPublisher::new(client))
        }
        GatewayPublisherVia::Logs => {
            Arc::new(LogPublisher::new())
        }
    }
}
