//! Invocation envelope and provisioning request

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tenantq_core::TenantId;

/// Requested provisioning action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    OnboardCluster,
    OffboardCluster,
    Other(String),
}

impl From<String> for Action {
    fn from(value: String) -> Self {
        match value.as_str() {
            "OnboardCluster" => Self::OnboardCluster,
            "OffboardCluster" => Self::OffboardCluster,
            _ => Self::Other(value),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        match action {
            Action::OnboardCluster => "OnboardCluster".to_string(),
            Action::OffboardCluster => "OffboardCluster".to_string(),
            Action::Other(value) => value,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OnboardCluster => f.write_str("OnboardCluster"),
            Self::OffboardCluster => f.write_str("OffboardCluster"),
            Self::Other(value) => f.write_str(value),
        }
    }
}

/// Decoded request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRequest {
    pub action: Action,
    pub restaurant_ids: Vec<TenantId>,
    pub environment: String,
}

/// Event delivered by the invoker
///
/// `body` is either the request object itself or a string holding its JSON
/// encoding (API Gateway proxy events). Other envelope fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub body: Value,
}

impl Envelope {
    pub fn from_value(event: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(event)
    }

    /// Decode the body into a request, parsing it first if it is a string
    pub fn decode(&self) -> Result<ProvisionRequest, serde_json::Error> {
        match &self.body {
            Value::String(encoded) => serde_json::from_str(encoded),
            decoded => serde_json::from_value(decoded.clone()),
        }
    }
}
