//! Queue provisioning for tenantq
//!
//! Provides the queue service abstraction with two backends:
//! - Amazon SQS through the AWS SDK
//! - An in-memory emulation for local runs and tests
//!
//! and the idempotent create-or-reuse / delete-if-exists lifecycle on top.

mod ephemeral;
pub mod lifecycle;
mod sdk;
pub mod service;

pub use ephemeral::{EphemeralQueueService, Queue, QueueCall};
pub use lifecycle::{ExistenceProbe, QueueLifecycle};
pub use sdk::SdkQueueService;
pub use service::{QueueError, QueueLookup, QueueOperation, QueueService};
