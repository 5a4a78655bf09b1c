use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibrisConfig {
    pub log: LogConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directives. `RUST_LOG` wins when set.
    pub filter: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// JSON seed file loaded at startup. Empty disables seeding.
    pub path: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: "info".to_string() }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { path: "libris/seed/catalog.json".to_string() }
    }
}

impl LibrisConfig {
    /// Load configuration from defaults, `libris.toml` if present, and
    /// `LIBRIS_`-prefixed environment variables, in that order of precedence.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("libris")
    }

    /// Like [`LibrisConfig::load`] with a different config file stem.
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&LibrisConfig::default())?)
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix("LIBRIS")
                    .separator("_")
                    .prefix_separator("_"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn seed_path(&self) -> Option<&str> {
        Some(self.seed.path.as_str()).filter(|path| !path.is_empty())
    }
}
