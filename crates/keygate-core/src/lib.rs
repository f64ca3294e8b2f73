//! keygate core: provisioning data model, ACL shapes, and the error surface.
//!
//! This crate defines the records the authorization pipeline consumes (keys,
//! packages, ACL objects, geo/device rule sets, session descriptors) together
//! with the stable error codes reported to the host. It carries no transport
//! or runtime dependencies so provisioning tools can reuse the same types.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths must surface as `KeygateError`/`Result`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod model;

/// Shared result type.
pub use error::{ErrorCode, KeygateError, Result};
