//! Record types and containers for search results
//!
//! This module defines the records written to batch files and the
//! classified outcome of a search page request.

mod container;
mod types;

pub use container::RecordContainer;
pub use types::*;
