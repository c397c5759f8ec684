//! SQS in-memory backend

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::service::{QueueError, QueueLookup, QueueOperation, QueueService};

const ACCOUNT_ID: &str = "000000000000";

#[derive(Error, Debug)]
pub enum EphemeralError {
    #[error("Queue does not exist: {0}")]
    QueueNotFound(String),
    #[error("Injected {0} failure")]
    Injected(QueueOperation),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Queue {
    pub name: String,
    pub url: String,
    pub arn: String,
    pub created_timestamp: i64,
}

impl Queue {
    pub fn new(name: String, region: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            url: format!("https://sqs.{}.amazonaws.com/{}/{}", region, ACCOUNT_ID, name),
            arn: format!("arn:aws:sqs:{}:{}:{}", region, ACCOUNT_ID, name),
            name,
            created_timestamp: now,
        }
    }
}

/// A call received by the in-memory backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueCall {
    Lookup(String),
    Create(String),
    Delete(String),
}

/// In-memory queue service
///
/// Behaves like SQS for the calls tenantq makes: `create` on an existing name
/// returns the existing URL and `delete` of an unknown URL fails. Every call
/// is recorded, and any operation can be made to fail on demand.
#[derive(Debug)]
pub struct EphemeralQueueService {
    region: String,
    queues: DashMap<String, Queue>,
    failing: DashSet<QueueOperation>,
    calls: Mutex<Vec<QueueCall>>,
}

impl Default for EphemeralQueueService {
    fn default() -> Self {
        Self::new("us-east-1")
    }
}

impl EphemeralQueueService {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            queues: DashMap::new(),
            failing: DashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every subsequent call of `operation` fail
    pub fn fail(&self, operation: QueueOperation) {
        self.failing.insert(operation);
    }

    /// Stop failing `operation`
    pub fn heal(&self, operation: QueueOperation) {
        self.failing.remove(&operation);
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.calls.lock().clone()
    }

    pub fn get_queue(&self, name: &str) -> Option<Queue> {
        self.queues.get(name).map(|q| q.value().clone())
    }

    /// Names of all existing queues, sorted
    pub fn queue_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.queues.iter().map(|q| q.key().clone()).collect();
        names.sort();
        names
    }

    fn record(&self, call: QueueCall) {
        self.calls.lock().push(call);
    }

    fn check(&self, operation: QueueOperation, queue: &str) -> Result<(), QueueError> {
        if self.failing.contains(&operation) {
            let err = EphemeralError::Injected(operation);
            return Err(QueueError::service(
                operation,
                queue,
                err.to_string(),
                err,
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl QueueService for EphemeralQueueService {
    async fn lookup(&self, name: &str) -> Result<QueueLookup, QueueError> {
        self.record(QueueCall::Lookup(name.to_string()));
        self.check(QueueOperation::GetQueueUrl, name)?;

        Ok(match self.queues.get(name) {
            Some(queue) => QueueLookup::Found(queue.url.clone()),
            None => QueueLookup::Absent,
        })
    }

    async fn create(&self, name: &str) -> Result<String, QueueError> {
        self.record(QueueCall::Create(name.to_string()));
        self.check(QueueOperation::CreateQueue, name)?;

        let queue = self
            .queues
            .entry(name.to_string())
            .or_insert_with(|| {
                let queue = Queue::new(name.to_string(), &self.region);
                info!(name = %name, url = %queue.url, "Creating queue");
                queue
            })
            .clone();
        Ok(queue.url)
    }

    async fn delete(&self, url: &str) -> Result<(), QueueError> {
        self.record(QueueCall::Delete(url.to_string()));

        let name = url.split('/').next_back().unwrap_or(url);
        self.check(QueueOperation::DeleteQueue, name)?;

        match self.queues.remove(name) {
            Some(_) => {
                info!(name = %name, "Deleting queue");
                Ok(())
            }
            None => {
                let err = EphemeralError::QueueNotFound(name.to_string());
                Err(QueueError::service(
                    QueueOperation::DeleteQueue,
                    name,
                    err.to_string(),
                    err,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let sqs = EphemeralQueueService::new("eu-west-1");

        let url = sqs.create("orders").await.unwrap();
        assert_eq!(url, "https://sqs.eu-west-1.amazonaws.com/000000000000/orders");
        assert_eq!(sqs.lookup("orders").await.unwrap(), QueueLookup::Found(url));
        assert_eq!(sqs.get_queue("orders").unwrap().arn, "arn:aws:sqs:eu-west-1:000000000000:orders");
    }

    #[tokio::test]
    async fn test_lookup_missing_queue_is_absent() {
        let sqs = EphemeralQueueService::default();
        assert_eq!(sqs.lookup("missing").await.unwrap(), QueueLookup::Absent);
    }

    #[tokio::test]
    async fn test_create_existing_returns_same_url() {
        let sqs = EphemeralQueueService::default();

        let first = sqs.create("orders").await.unwrap();
        let second = sqs.create("orders").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(sqs.queue_names(), vec!["orders".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_by_url() {
        let sqs = EphemeralQueueService::default();
        let url = sqs.create("orders").await.unwrap();

        sqs.delete(&url).await.unwrap();
        assert!(sqs.queue_names().is_empty());

        let err = sqs.delete(&url).await.unwrap_err();
        assert_eq!(err.operation(), QueueOperation::DeleteQueue);
    }

    #[tokio::test]
    async fn test_injected_failure_and_heal() {
        let sqs = EphemeralQueueService::default();
        sqs.fail(QueueOperation::GetQueueUrl);

        let err = sqs.lookup("orders").await.unwrap_err();
        assert!(err.to_string().contains("Injected GetQueueUrl failure"));

        sqs.heal(QueueOperation::GetQueueUrl);
        assert_eq!(sqs.lookup("orders").await.unwrap(), QueueLookup::Absent);
    }

    #[tokio::test]
    async fn test_calls_are_recorded() {
        let sqs = EphemeralQueueService::default();
        let url = sqs.create("a").await.unwrap();
        sqs.lookup("a").await.unwrap();
        sqs.delete(&url).await.unwrap();

        assert_eq!(
            sqs.calls(),
            vec![
                QueueCall::Create("a".to_string()),
                QueueCall::Lookup("a".to_string()),
                QueueCall::Delete(url),
            ]
        );
    }
}
