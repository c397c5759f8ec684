//! Notification publishing for tenantq
//!
//! Provides the notification service abstraction with two backends:
//! - Amazon SNS through the AWS SDK
//! - An in-memory emulation that records published messages
//!
//! and the JSON-structured publisher built on it.

mod ephemeral;
pub mod publisher;
mod sdk;
pub mod service;

pub use ephemeral::{EphemeralNotificationService, PublishedMessage, Topic};
pub use publisher::NotificationPublisher;
pub use sdk::SdkNotificationService;
pub use service::{MessageAttribute, NotificationService, NotifyError, PublishAck, PublishRequest};
