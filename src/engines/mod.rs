//! Search engine module
//!
//! Defines the Engine trait: an engine turns a page request into an HTTP
//! request and an HTTP response into a classified [`crate::results::SearchOutcome`].

mod traits;

pub mod google_cse;

pub use google_cse::GoogleCse;
pub use traits::*;
