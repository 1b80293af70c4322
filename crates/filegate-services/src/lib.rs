//! Filegate Services Layer
//!
//! Stateful pieces of the access subsystem and the facade the request
//! handlers call:
//!
//! - [`ConfirmationTokenStore`]: single-use, target-bound, expiring tokens for
//!   destructive operations.
//! - [`ConfirmationSweeper`]: background purge of abandoned tokens.
//! - [`AccessGate`]: upload authorization, two-step delete and safe path
//!   resolution.
//! - [`GateService`]: a config-built gate with its sweeper running.

pub mod clock;
pub mod confirmation;
pub mod gate;
pub mod service;
pub mod sweeper;

// Re-export commonly used types
#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use confirmation::{ConfirmationToken, ConfirmationTokenStore};
pub use gate::AccessGate;
pub use service::GateService;
pub use sweeper::ConfirmationSweeper;

pub use filegate_auth::{CredentialRegistry, InMemoryCredentialRegistry, UploadPolicyToken};
pub use filegate_storage::ResolvedPath;
