//! Database library providing the MongoDB connection used by the products service
//!
//! The connection is created once at startup and handed to repositories; nothing
//! in this crate holds global state.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB support
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::new("mongodb://localhost:27017/shop");
//! let client = mongodb::connect_from_config(&config).await?;
//! let db = mongodb::resolve_database(&client, &config);
//! ```

#[cfg(feature = "mongodb")]
pub mod mongodb;
