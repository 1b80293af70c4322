//! Filegate Storage Library
//!
//! Path-safety primitives that run before any filesystem call touches a
//! caller-supplied name:
//!
//! - [`PathGuard`] resolves a relative path under a base directory and rejects
//!   traversal, absolute paths and symlinks that point outside the base.
//! - [`validate_upload_filename`] restricts upload names to a single plain
//!   path component.
//!
//! Neither reads or writes file contents; only metadata and link targets are
//! inspected.

pub mod filename;
pub mod path_guard;

// Re-export commonly used types
pub use filename::validate_upload_filename;
pub use path_guard::{normalize_lexically, resolve, PathGuard, ResolvedPath};
