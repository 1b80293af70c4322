//! Filegate Core Library
//!
//! This crate provides the domain models, error taxonomy and configuration
//! shared by the token and path-safety crates of Filegate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::GateConfig;
pub use error::{AccessError, ErrorMetadata, LogLevel};
pub use models::{Credential, CredentialRecord, PolicyViolation, UploadPolicy};
