//! Transport layer (HTTP).
//!
//! Adapts inbound HTTP requests to pipeline input and translates pipeline
//! errors into responses.

pub mod http;
