use config::{Config, ConfigError, Environment, Source};
use serde::Deserialize;

/// Which `TodoStore` the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Mongo,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub bind_host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub store: StoreKind,
}

impl AppConfig {
    /// Loads configuration from environment variables (`PORT`, `BIND_HOST`,
    /// `MONGODB_URI`, `MONGODB_DATABASE`, `STORE`).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::default().try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        Config::builder()
            .set_default("bind_host", "0.0.0.0")?
            .set_default("port", 3000)?
            .set_default("mongodb_uri", "mongodb://localhost:27017/todoapp")?
            .set_default("mongodb_database", "todoapp")?
            .set_default("store", "mongo")?
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}
