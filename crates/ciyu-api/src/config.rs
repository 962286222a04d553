use serde::Deserialize;

/// Deployment environment, drives log formatting
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Service configuration, read from environment variables.
///
/// | Variable | Default |
/// |---|---|
/// | `DATABASE_URL` | required |
/// | `ENV` | `development` |
/// | `HOST` / `PORT` | `0.0.0.0` / `3000` |
/// | `DATABASE_MAX_CONNECTIONS` | `10` |
/// | `ALLOWED_ORIGINS` | `http://localhost:8080` (comma separated) |
/// | `DEFAULT_QUEUE_SIZE` | `20` |
/// | `MAX_QUEUE_SIZE` | `200` |
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
    #[serde(default = "default_queue_size")]
    pub default_queue_size: usize,
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_database_max_connections() -> u32 {
    10
}

fn default_allowed_origins() -> String {
    "http://localhost:8080".to_string()
}

const fn default_queue_size() -> usize {
    20
}

const fn default_max_queue_size() -> usize {
    200
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ApiConfig {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Build the config from an explicit set of variables.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_queue_size == 0 {
            return Err(ConfigError::Invalid(
                "MAX_QUEUE_SIZE must be at least 1".to_string(),
            ));
        }
        if self.default_queue_size == 0 || self.default_queue_size > self.max_queue_size {
            return Err(ConfigError::Invalid(format!(
                "DEFAULT_QUEUE_SIZE must be between 1 and MAX_QUEUE_SIZE ({})",
                self.max_queue_size
            )));
        }
        Ok(())
    }

    pub fn parsed_allowed_origins(&self) -> Vec<String> {
        self.allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config =
            ApiConfig::from_vars(vars(&[("DATABASE_URL", "postgres://localhost/ciyu")])).unwrap();

        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.default_queue_size, 20);
        assert_eq!(config.max_queue_size, 200);
        assert_eq!(config.parsed_allowed_origins(), vec!["http://localhost:8080"]);
    }

    #[test]
    fn test_overrides() {
        let config = ApiConfig::from_vars(vars(&[
            ("DATABASE_URL", "postgres://db/ciyu"),
            ("ENV", "production"),
            ("PORT", "8081"),
            ("ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
            ("DEFAULT_QUEUE_SIZE", "10"),
        ]))
        .unwrap();

        assert!(!config.env.is_development());
        assert_eq!(config.port, 8081);
        assert_eq!(
            config.parsed_allowed_origins(),
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.default_queue_size, 10);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(
            ApiConfig::from_vars(vars(&[("PORT", "3000")])),
            Err(ConfigError::Env(_))
        ));
    }

    #[test]
    fn test_queue_size_bounds() {
        assert!(matches!(
            ApiConfig::from_vars(vars(&[
                ("DATABASE_URL", "postgres://db/ciyu"),
                ("DEFAULT_QUEUE_SIZE", "500"),
            ])),
            Err(ConfigError::Invalid(_))
        ));
    }
}
