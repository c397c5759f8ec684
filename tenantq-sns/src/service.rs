//! Notification service abstraction

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Publish to {topic_arn} failed: {message}")]
    Service {
        topic_arn: String,
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("Message could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Invalid message attribute: {0}")]
    InvalidAttribute(String),
}

impl NotifyError {
    pub fn service(
        topic_arn: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Service {
            topic_arn: topic_arn.into(),
            message: message.into(),
            source: source.into(),
        }
    }
}

/// Typed message attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageAttribute {
    pub data_type: String,
    pub string_value: String,
}

impl MessageAttribute {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            data_type: "String".to_string(),
            string_value: value.into(),
        }
    }
}

/// A single publish call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub topic_arn: String,
    pub message: String,
    pub message_structure: Option<String>,
    pub attributes: BTreeMap<String, MessageAttribute>,
}

/// Acknowledgment returned by the notification service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishAck {
    pub message_id: Option<String>,
    pub sequence_number: Option<String>,
}

/// Notification service backend
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn publish(&self, request: PublishRequest) -> Result<PublishAck, NotifyError>;
}
