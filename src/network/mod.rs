//! HTTP networking module
//!
//! Provides the HTTP client used for search API calls and page fetches.

mod client;
mod user_agent;

pub use client::{HttpClient, RANDOM_USER_AGENT};
pub use user_agent::generate_user_agent;
