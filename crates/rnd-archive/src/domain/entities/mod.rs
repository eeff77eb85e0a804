//! Domain Entities
//!
//! Pure domain models without infrastructure dependencies.
//! - ResultItem / SearchPage: Charts as returned by the search endpoint
//! - SearchState / SearchQuery: What the browse page is currently asking for
//! - ToastMessage: Transient status messages

mod chart;
mod search_state;
mod toast;

pub use chart::*;
pub use search_state::*;
pub use toast::*;
