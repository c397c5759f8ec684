//! Lambda Runtime API client
//!
//! Pulls invocations from the runtime API, runs them through the handler and
//! posts back either the response string or an error document.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use tenantq_core::{ErrorResponse, RequestId};

use crate::handler::{ProvisionError, ProvisioningHandler};

/// Environment variable naming the runtime API host
pub const RUNTIME_API_ENV: &str = "AWS_LAMBDA_RUNTIME_API";

const API_VERSION: &str = "2018-06-01";
const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("AWS_LAMBDA_RUNTIME_API is not set")]
    MissingApi,
    #[error("Runtime API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Runtime API returned {status} for {path}")]
    Status { status: u16, path: String },
    #[error("Invocation is missing the Lambda-Runtime-Aws-Request-Id header")]
    MissingRequestId,
}

/// A single invocation received from the runtime API
#[derive(Debug)]
pub struct NextInvocation {
    pub request_id: RequestId,
    pub payload: Result<Value, serde_json::Error>,
}

pub struct RuntimeClient {
    base_url: String,
    client: reqwest::Client,
}

impl RuntimeClient {
    /// Client for the runtime API at `host:port`
    pub fn new(api: &str) -> Self {
        Self {
            base_url: format!("http://{}/{}/runtime", api, API_VERSION),
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, RuntimeError> {
        let api = std::env::var(RUNTIME_API_ENV).map_err(|_| RuntimeError::MissingApi)?;
        Ok(Self::new(&api))
    }

    /// Block until the next invocation is available
    pub async fn next_invocation(&self) -> Result<NextInvocation, RuntimeError> {
        let path = "invocation/next";
        let response = self.client.get(self.url(path)).send().await?;
        check_status(response.status(), path)?;

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(RequestId::with_id)
            .ok_or(RuntimeError::MissingRequestId)?;

        let body = response.bytes().await?;

        Ok(NextInvocation {
            request_id,
            payload: serde_json::from_slice(&body),
        })
    }

    pub async fn send_response(
        &self,
        request_id: &RequestId,
        response: &str,
    ) -> Result<(), RuntimeError> {
        let path = format!("invocation/{}/response", request_id);
        let reply = self.client.post(self.url(&path)).json(&response).send().await?;
        check_status(reply.status(), &path)
    }

    pub async fn send_error(
        &self,
        request_id: &RequestId,
        error: &ErrorResponse,
    ) -> Result<(), RuntimeError> {
        let path = format!("invocation/{}/error", request_id);
        let reply = self
            .client
            .post(self.url(&path))
            .header(ERROR_TYPE_HEADER, error.code.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(error.to_json())
            .send()
            .await?;
        check_status(reply.status(), &path)
    }

    /// Fetch one invocation, handle it and report the outcome
    pub async fn process_next(&self, handler: &ProvisioningHandler) -> Result<(), RuntimeError> {
        let invocation = self.next_invocation().await?;
        let request_id = invocation.request_id;
        debug!(request_id = %request_id, "Received invocation");

        let result = match invocation.payload {
            Ok(event) => handler.handle_event(event, &request_id).await,
            Err(e) => Err(ProvisionError::from(e)),
        };

        match result {
            Ok(response) => self.send_response(&request_id, &response).await,
            Err(e) => self.send_error(&request_id, &e.to_response(&request_id)).await,
        }
    }

    /// Process invocations until the runtime API becomes unreachable
    pub async fn run(&self, handler: &ProvisioningHandler) -> Result<(), RuntimeError> {
        info!(api = %self.base_url, "Waiting for invocations");

        loop {
            if let Err(e) = self.process_next(handler).await {
                warn!(error = %e, "Runtime API interaction failed");
                return Err(e);
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

fn check_status(status: reqwest::StatusCode, path: &str) -> Result<(), RuntimeError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(RuntimeError::Status {
            status: status.as_u16(),
            path: path.to_string(),
        })
    }
}
