use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};

use crate::config::{env_or, ConfigError};

/// Collection names, each overridable from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionNames {
    pub quotes: String,
    pub products: String,
    pub categories: String,
    pub special_orders: String,
    pub company_info: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        CollectionNames {
            quotes: "quotes".to_string(),
            products: "products".to_string(),
            categories: "categories".to_string(),
            special_orders: "special_orders".to_string(),
            company_info: "company_info".to_string(),
        }
    }
}

impl CollectionNames {
    fn from_env() -> Self {
        let defaults = CollectionNames::default();
        let pick = |key: &str, fallback: String| {
            env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .inspect(|v| debug!("{} = {}", key, v))
                .unwrap_or(fallback)
        };
        CollectionNames {
            quotes: pick("MONGO_QUOTE_COLLECTION", defaults.quotes),
            products: pick("MONGO_PRODUCT_COLLECTION", defaults.products),
            categories: pick("MONGO_CATEGORY_COLLECTION", defaults.categories),
            special_orders: pick("MONGO_SPECIAL_ORDER_COLLECTION", defaults.special_orders),
            company_info: pick("MONGO_COMPANY_INFO_COLLECTION", defaults.company_info),
        }
    }
}

/// Connection settings for the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    /// Username and password are either both set or both absent.
    pub username: Option<String>,
    pub password: Option<String>,
    pub collections: CollectionNames,
    pub pool_size: u32,
    /// Applies to both connecting and server selection.
    pub connection_timeout_secs: u64,
}

impl MongoConfig {
    /// `MONGO_URI` and `MONGO_DATABASE` are required. `MONGO_USERNAME` /
    /// `MONGO_PASSWORD`, `MONGO_POOL_SIZE` (10), `MONGO_CONNECTION_TIMEOUT`
    /// in seconds (5) and the `MONGO_*_COLLECTION` overrides are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        info!("Loading MongoDB configuration from environment variables");

        let uri = env::var("MONGO_URI").map_err(|_| {
            error!("MONGO_URI environment variable not found");
            ConfigError::EnvVarNotFound(
                "MONGO_URI (the document store is not configured: set MONGO_URI, e.g. mongodb://localhost:27017, and MONGO_DATABASE in .env)".to_string(),
            )
        })?;
        debug!("MongoDB URI loaded (length: {} chars)", uri.len());

        let database = env::var("MONGO_DATABASE").map_err(|_| {
            error!("MONGO_DATABASE environment variable not found");
            ConfigError::EnvVarNotFound(
                "MONGO_DATABASE (name of the database holding quotes, products and categories)".to_string(),
            )
        })?;
        debug!("MongoDB database: {}", database);

        let username = env::var("MONGO_USERNAME").ok();
        let password = env::var("MONGO_PASSWORD").ok();
        if username.is_none() {
            debug!("No MongoDB username specified");
        }

        let defaults = MongoConfig::default();
        let pool_size = env_or("MONGO_POOL_SIZE", defaults.pool_size)?;
        let connection_timeout_secs = env_or("MONGO_CONNECTION_TIMEOUT", defaults.connection_timeout_secs)?;

        let config = MongoConfig {
            uri,
            database,
            username,
            password,
            collections: CollectionNames::from_env(),
            pool_size,
            connection_timeout_secs,
        };

        config.validate()?;
        info!("MongoDB configuration loaded successfully");
        Ok(config)
    }

    /// Local settings for tests; quotes go to a separate collection.
    pub fn from_test_env() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "storefront_test".to_string(),
            username: None,
            password: None,
            collections: CollectionNames {
                quotes: "test_quotes".to_string(),
                ..CollectionNames::default()
            },
            pool_size: 2,
            connection_timeout_secs: 2,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| {
            error!("{}", message);
            Err(ConfigError::ValidationError(message.to_string()))
        };
        if !self.uri.starts_with("mongodb://") && !self.uri.starts_with("mongodb+srv://") {
            return invalid("MONGO_URI must start with mongodb:// or mongodb+srv://");
        }
        if self.database.trim().is_empty() {
            return invalid("MONGO_DATABASE cannot be empty");
        }
        if self.pool_size == 0 {
            return invalid("MONGO_POOL_SIZE must be greater than 0");
        }
        if self.connection_timeout_secs == 0 {
            return invalid("MONGO_CONNECTION_TIMEOUT must be greater than 0");
        }

        if self.username.as_deref() == Some("") || self.password.as_deref() == Some("") {
            return invalid("MONGO_USERNAME and MONGO_PASSWORD cannot be empty when set");
        }
        if self.username.is_some() != self.password.is_some() {
            return invalid("MONGO_USERNAME and MONGO_PASSWORD must be set together");
        }
        Ok(())
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "storefront".to_string(),
            username: None,
            password: None,
            collections: CollectionNames::default(),
            pool_size: 10,
            connection_timeout_secs: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MongoConfig::default();
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "storefront");
        assert_eq!(config.collections.quotes, "quotes");
        assert_eq!(config.collections.special_orders, "special_orders");
        assert_eq!(config.pool_size, 10);
        assert_eq!(config.connection_timeout_secs, 5);
    }

    #[test]
    fn test_test_config() {
        let config = MongoConfig::from_test_env();
        assert_eq!(config.collections.quotes, "test_quotes");
        assert_eq!(config.collections.products, "products");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_uri_scheme() {
        let mut config = MongoConfig::from_test_env();
        config.uri = "".to_string();
        assert!(config.validate().is_err());
        config.uri = "localhost:27017".to_string();
        assert!(config.validate().is_err());
        config.uri = "mongodb+srv://cluster0.example.net".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_pool_size() {
        let mut config = MongoConfig::from_test_env();
        config.pool_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_credentials_must_pair() {
        let mut config = MongoConfig::from_test_env();
        config.username = Some("admin".to_string());
        assert!(config.validate().is_err());
        config.password = Some("secret".to_string());
        assert!(config.validate().is_ok());
    }
}
