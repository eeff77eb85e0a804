//! Value Objects
//!
//! Immutable objects defined by their attributes rather than identity.

mod severity;
mod sort_key;

pub use severity::*;
pub use sort_key::*;
