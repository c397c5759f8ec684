//! Queue name derivation
//!
//! Every tenant gets one deployment queue per region tag. Names are built by
//! substituting the environment and tenant id verbatim into
//! `<REGION-TAG>-<ENVIRONMENT>-<TENANT_ID>-SQS-DEPLOYMENT`.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Suffix shared by every deployment queue
pub const QUEUE_SUFFIX: &str = "SQS-DEPLOYMENT";

/// Region tag prefixed to a queue name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionTag {
    UsEast,
    Cm,
}

impl RegionTag {
    pub const ALL: [RegionTag; 2] = [RegionTag::UsEast, RegionTag::Cm];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UsEast => "US-EAST",
            Self::Cm => "CM",
        }
    }
}

/// Opaque tenant identifier
///
/// Deserializes from a JSON string or a JSON integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'de> Deserialize<'de> for TenantId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Signed(n) => Self(n.to_string()),
            Raw::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// A derived queue name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QueueName(String);

impl QueueName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueueName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for QueueName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the deployment queue names for tenants
#[derive(Debug, Clone, Copy, Default)]
pub struct QueueNamer;

impl QueueNamer {
    pub fn new() -> Self {
        Self
    }

    /// Name of the queue for one tenant under one region tag
    pub fn name(&self, tag: RegionTag, tenant: &TenantId, environment: &str) -> QueueName {
        QueueName(format!(
            "{}-{}-{}-{}",
            tag.as_str(),
            environment,
            tenant,
            QUEUE_SUFFIX
        ))
    }

    /// Both queue names for a tenant, in `RegionTag::ALL` order
    pub fn names_for(&self, tenant: &TenantId, environment: &str) -> [QueueName; 2] {
        RegionTag::ALL.map(|tag| self.name(tag, tenant, environment))
    }

    /// Queue names for a list of tenants; duplicates collapse
    pub fn names_for_all<'a, I>(&self, tenants: I, environment: &str) -> BTreeSet<QueueName>
    where
        I: IntoIterator<Item = &'a TenantId>,
    {
        tenants
            .into_iter()
            .flat_map(|tenant| self.names_for(tenant, environment))
            .collect()
    }
}
