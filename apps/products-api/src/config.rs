//! Configuration for Products API

use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        // Store outages must surface as the operation's 500, not a 408
        if server.request_timeout <= mongodb.server_selection_timeout() {
            eyre::bail!(
                "REQUEST_TIMEOUT_SECS ({:?}) must exceed MONGODB_SERVER_SELECTION_TIMEOUT_SECS ({:?})",
                server.request_timeout,
                mongodb.server_selection_timeout()
            );
        }

        let mongodb = if mongodb.app_name.is_none() {
            mongodb.with_app_name(env!("CARGO_PKG_NAME"))
        } else {
            mongodb
        };

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
        })
    }
}
