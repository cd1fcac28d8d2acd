//! MongoDB database connector and utilities
//!
//! Provides connection management and MongoDB-specific helpers.

mod config;
mod connector;
mod health;

pub use config::{DEFAULT_DATABASE, MongoConfig};
pub use connector::{MongoError, connect_from_config, resolve_database};
pub use health::check_health;

// Re-export MongoDB types for convenience
pub use ::mongodb::{Client, Collection, Database};
