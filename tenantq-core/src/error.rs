//! Error codes and invocation error payloads

use serde::Serialize;
use thiserror::Error;

/// Classification shared by every error the handler can surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// The invocation envelope or its body could not be decoded
    InvalidRequest,
    /// A queue service call failed
    QueueServiceFailure,
    /// A notification service call failed
    NotificationServiceFailure,
    /// A required configuration value is absent
    MissingConfiguration,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "InvalidRequest",
            Self::QueueServiceFailure => "QueueServiceFailure",
            Self::NotificationServiceFailure => "NotificationServiceFailure",
            Self::MissingConfiguration => "MissingConfiguration",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest => 400,
            Self::QueueServiceFailure | Self::NotificationServiceFailure => 502,
            Self::MissingConfiguration => 500,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error reported back to whatever invoked the handler
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
    pub request_id: Option<String>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Format as a Lambda-style JSON error document
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct JsonError<'a> {
            error_message: &'a str,
            error_type: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            request_id: Option<&'a str>,
        }

        let error = JsonError {
            error_message: &self.message,
            error_type: self.code.as_str(),
            request_id: self.request_id.as_deref(),
        };

        serde_json::to_string(&error).unwrap_or_else(|_| {
            format!(
                r#"{{"errorMessage":"{}","errorType":"{}"}}"#,
                self.message.replace('"', "'"),
                self.code.as_str()
            )
        })
    }
}
