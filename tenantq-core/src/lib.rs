//! Core types for tenantq
//!
//! Queue naming, error classification and invocation request IDs shared by
//! every tenantq crate.

pub mod error;
pub mod naming;
pub mod request_id;

pub use error::{ErrorCode, ErrorResponse};
pub use naming::{QueueName, QueueNamer, RegionTag, TenantId};
pub use request_id::RequestId;
