//! AWS SDK backed notification service

use async_trait::async_trait;
use aws_sdk_sns::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_sns::types::MessageAttributeValue;
use aws_sdk_sns::Client;
use tracing::warn;

use crate::service::{NotificationService, NotifyError, PublishAck, PublishRequest};

/// Notification service talking to Amazon SNS
#[derive(Debug, Clone)]
pub struct SdkNotificationService {
    client: Client,
}

impl SdkNotificationService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl NotificationService for SdkNotificationService {
    async fn publish(&self, request: PublishRequest) -> Result<PublishAck, NotifyError> {
        let mut call = self
            .client
            .publish()
            .topic_arn(&request.topic_arn)
            .message(&request.message)
            .set_message_structure(request.message_structure.clone());

        for (name, attribute) in &request.attributes {
            let value = MessageAttributeValue::builder()
                .data_type(&attribute.data_type)
                .string_value(&attribute.string_value)
                .build()
                .map_err(|e| NotifyError::InvalidAttribute(format!("{}: {}", name, e)))?;
            call = call.message_attributes(name, value);
        }

        let output = call.send().await.map_err(|err| {
            warn!(topic = %request.topic_arn, error = %DisplayErrorContext(&err), "SNS publish failed");
            let message = match err.as_service_error() {
                Some(service) => format!(
                    "{}: {}",
                    service.code().unwrap_or("Unknown"),
                    service.message().unwrap_or_default()
                ),
                None => err.to_string(),
            };
            NotifyError::service(&request.topic_arn, message, err)
        })?;

        Ok(PublishAck {
            message_id: output.message_id().map(str::to_string),
            sequence_number: output.sequence_number().map(str::to_string),
        })
    }
}
