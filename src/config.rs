/// Configuration management for the Subgate core
use crate::error::{SubgateError, SubgateResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Main service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub storage: StorageConfig,
    pub notices: Option<NoticeConfig>,
    pub logging: LoggingConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub database: PathBuf,
}

/// Support contact for password-assistance notices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    pub support_phone: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> SubgateResult<Self> {
        dotenv::dotenv().ok();

        let data_directory: PathBuf = env::var("SUBGATE_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let database = env::var("SUBGATE_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("subgate.sqlite"));

        let notices = env::var("SUBGATE_SUPPORT_PHONE")
            .ok()
            .map(|support_phone| NoticeConfig { support_phone });

        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(ServiceConfig {
            storage: StorageConfig {
                data_directory,
                database,
            },
            notices,
            logging: LoggingConfig { level },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> SubgateResult<()> {
        if self.storage.database.as_os_str().is_empty() {
            return Err(SubgateError::Validation(
                "Database location cannot be empty".to_string(),
            ));
        }

        if let Some(notices) = &self.notices {
            if !notices.support_phone.chars().any(|c| c.is_ascii_digit()) {
                return Err(SubgateError::Validation(
                    "Support phone must contain digits".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServiceConfig {
        ServiceConfig {
            storage: StorageConfig {
                data_directory: "./data".into(),
                database: "./data/subgate.sqlite".into(),
            },
            notices: None,
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_database_location() {
        let mut config = config();
        config.storage.database = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_digitless_support_phone() {
        let mut config = config();
        config.notices = Some(NoticeConfig {
            support_phone: "call-us".to_string(),
        });
        assert!(config.validate().is_err());

        config.notices = Some(NoticeConfig {
            support_phone: "11955550000".to_string(),
        });
        assert!(config.validate().is_ok());
    }
}
