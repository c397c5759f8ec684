//! Structured notification publishing

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::service::{MessageAttribute, NotificationService, NotifyError, PublishAck, PublishRequest};

/// Message structure sent with every notification
pub const MESSAGE_STRUCTURE: &str = "json";

/// Publishes JSON messages carrying a single string attribute
#[derive(Clone)]
pub struct NotificationPublisher {
    service: Arc<dyn NotificationService>,
}

impl NotificationPublisher {
    pub fn new(service: Arc<dyn NotificationService>) -> Self {
        Self { service }
    }

    /// Serialize `message` as JSON and publish it to `topic_arn`
    ///
    /// With the `json` message structure SNS expects the payload to be an
    /// object with at least a `default` key. Errors from the service are
    /// returned unchanged.
    pub async fn publish<T>(
        &self,
        topic_arn: &str,
        message: &T,
        attribute_name: &str,
        attribute_value: &str,
    ) -> Result<PublishAck, NotifyError>
    where
        T: Serialize + ?Sized,
    {
        let attribute = MessageAttribute::string(attribute_value);
        info!(topic = %topic_arn, attribute = %attribute_name, value = %attribute_value,
            "Sending notification");

        let request = PublishRequest {
            topic_arn: topic_arn.to_string(),
            message: serde_json::to_string(message)?,
            message_structure: Some(MESSAGE_STRUCTURE.to_string()),
            attributes: BTreeMap::from([(attribute_name.to_string(), attribute)]),
        };

        self.service.publish(request).await
    }
}

impl std::fmt::Debug for NotificationPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationPublisher").finish_non_exhaustive()
    }
}
