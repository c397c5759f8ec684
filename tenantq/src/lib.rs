//! tenantq - deployment queue provisioning for tenants
//!
//! Onboarding creates the `US-EAST` and `CM` deployment queues of each
//! tenant in an environment; offboarding removes them. The handler can be
//! driven by the Lambda Runtime API, a local HTTP endpoint or the CLI.

pub mod backend;
pub mod config;
pub mod event;
pub mod handler;
pub mod router;
pub mod runtime;

pub use backend::build_handler;
pub use config::{Backend, Config};
pub use event::{Action, Envelope, ProvisionRequest};
pub use handler::{ProvisionError, ProvisioningHandler, INVALID_ACTION};
