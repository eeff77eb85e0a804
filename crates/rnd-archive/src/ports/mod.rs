//! Ports (Interfaces)
//!
//! Abstract interfaces that define how the client layer
//! talks to the archive backend.
//!
//! The HTTP implementation lives in `services::http_client`.

mod search_api;

// Re-exports
pub use search_api::*;
