//! Queue service abstraction

use async_trait::async_trait;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Remote queue service call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueOperation {
    GetQueueUrl,
    CreateQueue,
    DeleteQueue,
}

impl QueueOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetQueueUrl => "GetQueueUrl",
            Self::CreateQueue => "CreateQueue",
            Self::DeleteQueue => "DeleteQueue",
        }
    }
}

impl std::fmt::Display for QueueOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("{operation} failed for queue {queue}: {message}")]
    Service {
        operation: QueueOperation,
        queue: String,
        message: String,
        #[source]
        source: BoxError,
    },
    #[error("{operation} returned no queue URL for {queue}")]
    MissingUrl {
        operation: QueueOperation,
        queue: String,
    },
}

impl QueueError {
    pub fn service(
        operation: QueueOperation,
        queue: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Service {
            operation,
            queue: queue.into(),
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn operation(&self) -> QueueOperation {
        match self {
            Self::Service { operation, .. } | Self::MissingUrl { operation, .. } => *operation,
        }
    }
}

/// Answer to a lookup by queue name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueLookup {
    /// The queue exists; carries its URL
    Found(String),
    /// The service reported that no such queue exists
    Absent,
}

/// Queue service backend
///
/// `lookup` reports absence as `Ok(QueueLookup::Absent)` and reserves `Err`
/// for calls that failed for any other reason.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Resolve a queue URL by name
    async fn lookup(&self, name: &str) -> Result<QueueLookup, QueueError>;

    /// Create a queue and return its URL
    async fn create(&self, name: &str) -> Result<String, QueueError>;

    /// Delete the queue at `url`
    async fn delete(&self, url: &str) -> Result<(), QueueError>;
}
