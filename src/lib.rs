pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;

pub use error::StatsError;
