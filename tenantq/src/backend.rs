//! Service wiring

use aws_config::{BehaviorVersion, Region};
use std::sync::Arc;
use tracing::info;

use tenantq_sns::{EphemeralNotificationService, NotificationPublisher, NotificationService, SdkNotificationService};
use tenantq_sqs::{EphemeralQueueService, QueueLifecycle, QueueService, SdkQueueService};

use crate::config::{AwsConfig, Backend, Config};
use crate::handler::ProvisioningHandler;

/// Load the shared SDK configuration for the configured region
///
/// Credentials come from the default provider chain.
pub async fn load_sdk_config(aws: &AwsConfig) -> aws_config::SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));

    if let Some(endpoint_url) = &aws.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}

/// Build a handler from configuration
pub async fn build_handler(config: &Config) -> ProvisioningHandler {
    let (queues, notifications): (Arc<dyn QueueService>, Arc<dyn NotificationService>) =
        match config.backend {
            Backend::Aws => {
                let sdk_config = load_sdk_config(&config.aws).await;
                (
                    Arc::new(SdkQueueService::from_conf(&sdk_config)),
                    Arc::new(SdkNotificationService::from_conf(&sdk_config)),
                )
            }
            Backend::Ephemeral => {
                let sns = EphemeralNotificationService::new(config.aws.region.clone());
                if let Some(topic_arn) = &config.notification.topic_arn {
                    sns.add_topic(topic_arn);
                }
                (
                    Arc::new(EphemeralQueueService::new(config.aws.region.clone())),
                    Arc::new(sns),
                )
            }
        };

    info!(backend = config.backend.as_str(), region = %config.aws.region,
        existence_probe = ?config.existence_probe, "Services ready");

    ProvisioningHandler::new(
        QueueLifecycle::new(queues).with_probe(config.existence_probe),
        NotificationPublisher::new(notifications),
    )
    .with_topic_arn(config.notification.topic_arn.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tenantq_core::RequestId;

    #[tokio::test]
    async fn test_ephemeral_handler_registers_topic() {
        let mut config = Config {
            backend: Backend::Ephemeral,
            ..Config::default()
        };
        config.notification.topic_arn = Some("arn:aws:sns:us-east-1:000000000000:Onboard".to_string());

        let handler = build_handler(&config).await;

        let ack = handler
            .notify(&json!({"default": "hello"}), "action", "OnboardCluster")
            .await
            .unwrap();
        assert!(ack.message_id.is_some());

        let response = handler
            .handle_event(
                json!({"body": {"action": "OnboardCluster", "restaurant_ids": ["1"], "environment": "dev"}}),
                &RequestId::new(),
            )
            .await
            .unwrap();
        assert!(response.starts_with("Created queues with URLs: ['https://sqs.us-east-1.amazonaws.com/"));
    }
}
