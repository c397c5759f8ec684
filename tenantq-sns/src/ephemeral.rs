//! SNS in-memory backend

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing::info;

use crate::service::{NotificationService, NotifyError, PublishAck, PublishRequest};

const ACCOUNT_ID: &str = "000000000000";

#[derive(Error, Debug)]
pub enum EphemeralError {
    #[error("Topic does not exist: {0}")]
    TopicNotFound(String),
    #[error("Injected Publish failure")]
    Injected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub arn: String,
    pub created_timestamp: i64,
}

impl Topic {
    pub fn from_arn(arn: &str) -> Self {
        Self {
            name: arn.rsplit(':').next().unwrap_or(arn).to_string(),
            arn: arn.to_string(),
            created_timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// A message accepted by the in-memory backend
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub message_id: String,
    pub request: PublishRequest,
}

/// In-memory notification service
///
/// Publishing to a topic that was never added fails like SNS's `NotFound`.
/// Accepted messages are kept for inspection.
#[derive(Debug)]
pub struct EphemeralNotificationService {
    region: String,
    topics: DashMap<String, Topic>,
    published: Mutex<Vec<PublishedMessage>>,
    failing: AtomicBool,
}

impl Default for EphemeralNotificationService {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}

impl EphemeralNotificationService {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            topics: DashMap::new(),
            published: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Create a topic in this backend's region and return it
    pub fn create_topic(&self, name: &str) -> Topic {
        let arn = format!("arn:aws:sns:{}:{}:{}", self.region, ACCOUNT_ID, name);
        self.add_topic(&arn)
    }

    /// Register a topic under an explicit ARN
    pub fn add_topic(&self, arn: &str) -> Topic {
        self.topics
            .entry(arn.to_string())
            .or_insert_with(|| {
                info!(arn = %arn, "Creating topic");
                Topic::from_arn(arn)
            })
            .clone()
    }

    /// Make publishing fail until called again with `false`
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().clone()
    }
}

#[async_trait]
impl NotificationService for EphemeralNotificationService {
    async fn publish(&self, request: PublishRequest) -> Result<PublishAck, NotifyError> {
        if self.failing.load(Ordering::SeqCst) {
            let err = EphemeralError::Injected;
            return Err(NotifyError::service(&request.topic_arn, err.to_string(), err));
        }

        if !self.topics.contains_key(&request.topic_arn) {
            let err = EphemeralError::TopicNotFound(request.topic_arn.clone());
            return Err(NotifyError::service(&request.topic_arn, err.to_string(), err));
        }

        let message_id = uuid::Uuid::new_v4().to_string();
        info!(arn = %request.topic_arn, message_id = %message_id,
            attributes = request.attributes.len(), "Published message");

        self.published.lock().push(PublishedMessage {
            message_id: message_id.clone(),
            request,
        });

        Ok(PublishAck {
            message_id: Some(message_id),
            sequence_number: None,
        })
    }
}
