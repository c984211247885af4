pub mod client;
pub mod search;
pub mod types;

pub use client::{create_client, endpoint_from_env, get_token_from_env, DEFAULT_ENDPOINT};
pub use search::{build_search_query, fetch_all_issues, fetch_all_pull_requests, DateRange};
