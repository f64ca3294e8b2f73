//! keygate gateway library entry.
//!
//! Wires the admission guards, ACL resolution, identity bridge, and session
//! handling into an ordered authorization pipeline, plus the HTTP adapter
//! that runs it in front of upstream handlers. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod context;
pub mod identity;
pub mod pipeline;
pub mod policy;
pub mod provision;
pub mod router;
pub mod transport;
