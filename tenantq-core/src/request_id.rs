//! Invocation request IDs

use uuid::Uuid;

/// Identifier of a single handler invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a fresh request ID
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Use an ID assigned by the caller (e.g. `Lambda-Runtime-Aws-Request-Id`)
    pub fn with_id(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
