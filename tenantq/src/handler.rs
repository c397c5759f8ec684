//! Provisioning request handler
//!
//! One invocation decodes its envelope, derives the queue names for the
//! requested tenants and creates or deletes each queue in turn. The first
//! failing call aborts the invocation; queues already created or deleted by
//! it stay that way.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{error, info, info_span, Instrument};

use tenantq_core::{ErrorCode, ErrorResponse, QueueName, QueueNamer, RequestId, TenantId};
use tenantq_sns::{NotificationPublisher, NotifyError, PublishAck};
use tenantq_sqs::{QueueError, QueueLifecycle};

use crate::event::{Action, Envelope, ProvisionRequest};

/// Response to any action other than onboarding or offboarding
pub const INVALID_ACTION: &str = "Invalid action specified";

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] serde_json::Error),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),
}

impl ProvisionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
            Self::Queue(_) => ErrorCode::QueueServiceFailure,
            Self::Notify(_) => ErrorCode::NotificationServiceFailure,
            Self::MissingConfiguration(_) => ErrorCode::MissingConfiguration,
        }
    }

    pub fn to_response(&self, request_id: &RequestId) -> ErrorResponse {
        ErrorResponse::new(self.code(), self.to_string()).with_request_id(request_id.as_str())
    }
}

/// Dispatches provisioning requests to the queue lifecycle
#[derive(Debug, Clone)]
pub struct ProvisioningHandler {
    namer: QueueNamer,
    queues: QueueLifecycle,
    publisher: NotificationPublisher,
    topic_arn: Option<String>,
}

impl ProvisioningHandler {
    pub fn new(queues: QueueLifecycle, publisher: NotificationPublisher) -> Self {
        Self {
            namer: QueueNamer::new(),
            queues,
            publisher,
            topic_arn: None,
        }
    }

    /// Topic used by [`ProvisioningHandler::notify`]
    pub fn with_topic_arn(mut self, topic_arn: Option<String>) -> Self {
        self.topic_arn = topic_arn;
        self
    }

    pub fn topic_arn(&self) -> Option<&str> {
        self.topic_arn.as_deref()
    }

    /// Handle a raw invocation event
    ///
    /// Errors are logged here and returned to the caller unchanged.
    pub async fn handle_event(
        &self,
        event: Value,
        request_id: &RequestId,
    ) -> Result<String, ProvisionError> {
        let span = info_span!("invocation", request_id = %request_id);

        async move {
            let result = match Envelope::from_value(event).and_then(|e| e.decode()) {
                Ok(request) => self.handle(&request).await,
                Err(err) => Err(err.into()),
            };

            if let Err(err) = &result {
                error!(error = %err, code = %err.code(), "Error occurred");
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Handle a decoded request
    pub async fn handle(&self, request: &ProvisionRequest) -> Result<String, ProvisionError> {
        info!(action = %request.action, environment = %request.environment,
            tenant_count = request.restaurant_ids.len(), "Handling request");

        match request.action {
            Action::OnboardCluster => {
                let urls = self
                    .onboard(&request.restaurant_ids, &request.environment)
                    .await?;
                Ok(format!("Created queues with URLs: [{}]", quoted(&urls)))
            }
            Action::OffboardCluster => {
                let names = self
                    .offboard(&request.restaurant_ids, &request.environment)
                    .await?;
                Ok(format!("Deleted queues: {{{}}}", quoted(&names)))
            }
            Action::Other(ref action) => {
                info!(action = %action, "Ignoring unknown action");
                Ok(INVALID_ACTION.to_string())
            }
        }
    }

    /// Ensure both queues exist for every tenant; returns their URLs
    pub async fn onboard(
        &self,
        tenants: &[TenantId],
        environment: &str,
    ) -> Result<Vec<String>, QueueError> {
        let names = self.namer.names_for_all(tenants, environment);

        let mut urls = Vec::with_capacity(names.len());
        for name in &names {
            urls.push(self.queues.create_or_reuse(name.as_str()).await?);
        }

        info!(count = urls.len(), "Onboarding complete");
        Ok(urls)
    }

    /// Remove every queue of the given tenants; returns the targeted names
    pub async fn offboard(
        &self,
        tenants: &[TenantId],
        environment: &str,
    ) -> Result<BTreeSet<QueueName>, QueueError> {
        let names = self.namer.names_for_all(tenants, environment);

        let mut deleted = 0;
        for name in &names {
            if self.queues.delete_if_exists(name.as_str()).await? {
                deleted += 1;
            }
        }

        info!(targeted = names.len(), deleted, "Offboarding complete");
        Ok(names)
    }

    /// Publish `message` to the configured topic
    pub async fn notify<T>(
        &self,
        message: &T,
        attribute_name: &str,
        attribute_value: &str,
    ) -> Result<PublishAck, ProvisionError>
    where
        T: Serialize + ?Sized,
    {
        let topic_arn = self
            .topic_arn
            .as_deref()
            .ok_or(ProvisionError::MissingConfiguration("notification.topic_arn"))?;

        Ok(self
            .publisher
            .publish(topic_arn, message, attribute_name, attribute_value)
            .await?)
    }
}

fn quoted<I>(items: I) -> String
where
    I: IntoIterator,
    I::Item: std::fmt::Display,
{
    items
        .into_iter()
        .map(|item| format!("'{}'", item))
        .collect::<Vec<_>>()
        .join(", ")
}
