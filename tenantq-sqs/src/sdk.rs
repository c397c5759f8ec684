//! AWS SDK backed queue service

use async_trait::async_trait;
use aws_sdk_sqs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sqs::operation::get_queue_url::GetQueueUrlError;
use aws_sdk_sqs::Client;
use tracing::{debug, warn};

use crate::service::{QueueError, QueueLookup, QueueOperation, QueueService};

/// Queue service talking to Amazon SQS
///
/// Credentials, retries and timeouts come from the `SdkConfig` the client
/// was built with.
#[derive(Debug, Clone)]
pub struct SdkQueueService {
    client: Client,
}

impl SdkQueueService {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl QueueService for SdkQueueService {
    async fn lookup(&self, name: &str) -> Result<QueueLookup, QueueError> {
        let operation = QueueOperation::GetQueueUrl;

        match self.client.get_queue_url().queue_name(name).send().await {
            Ok(output) => output
                .queue_url()
                .map(|url| QueueLookup::Found(url.to_string()))
                .ok_or_else(|| QueueError::MissingUrl {
                    operation,
                    queue: name.to_string(),
                }),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(GetQueueUrlError::is_queue_does_not_exist) =>
            {
                debug!(queue = %name, "Queue does not exist");
                Ok(QueueLookup::Absent)
            }
            Err(err) => Err(service_error(operation, name, err)),
        }
    }

    async fn create(&self, name: &str) -> Result<String, QueueError> {
        let operation = QueueOperation::CreateQueue;

        let output = self
            .client
            .create_queue()
            .queue_name(name)
            .send()
            .await
            .map_err(|err| service_error(operation, name, err))?;

        output
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| QueueError::MissingUrl {
                operation,
                queue: name.to_string(),
            })
    }

    async fn delete(&self, url: &str) -> Result<(), QueueError> {
        self.client
            .delete_queue()
            .queue_url(url)
            .send()
            .await
            .map_err(|err| service_error(QueueOperation::DeleteQueue, url, err))?;

        Ok(())
    }
}

/// Wrap an SDK failure, keeping only the service's code and message
fn service_error<E, R>(operation: QueueOperation, queue: &str, err: SdkError<E, R>) -> QueueError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    warn!(operation = %operation, queue = %queue, error = %DisplayErrorContext(&err), "SQS call failed");

    let message = match err.as_service_error() {
        Some(service) => format!(
            "{}: {}",
            service.code().unwrap_or("Unknown"),
            service.message().unwrap_or_default()
        ),
        None => err.to_string(),
    };
    QueueError::service(operation, queue, message, err)
}
