//! Top-level facade crate for keygate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use keygate_core::*;
}

pub mod gateway {
    pub use keygate_gateway::*;
}
