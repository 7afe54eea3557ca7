use crate::search::{IndexSchema, SearchConfig};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Indexing and search configuration
    #[serde(default)]
    pub search: SearchConfig,

    /// Declared index fields
    pub schema: IndexSchema,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("DOCSEARCH_CONFIG").unwrap_or_else(|_| "config/local.toml".to_string());
        Self::load_from(&config_path)
    }

    /// Load defaults, then `path` if it exists, then environment overrides
    pub fn load_from(path: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(path).required(false))
            // Override with environment variables (prefix: DOCSEARCH_)
            .add_source(
                config::Environment::with_prefix("DOCSEARCH")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("search.highlight_fields")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Check that the search settings and schema are usable together
    pub fn validate(&self) -> crate::error::Result<()> {
        self.search.validate()?;
        self.schema.validate()?;
        for field in &self.search.highlight_fields {
            if self.schema.kind_of(field).is_none() {
                return Err(crate::error::AppError::Validation(format!(
                    "highlight field '{field}' is not declared in the schema"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logs: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
