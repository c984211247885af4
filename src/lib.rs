pub mod config;
pub mod fetch;
pub mod filter;
pub mod github;
pub mod model;
pub mod output;
pub mod snapshot;
pub mod stats;
