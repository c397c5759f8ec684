//! Configuration management

use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use tenantq_sqs::ExistenceProbe;

/// Environment variable selecting the AWS region
pub const REGION_ENV: &str = "REGION";

/// Region used when `REGION` is unset
pub const DEFAULT_REGION: &str = "us-east-1";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub backend: Backend,

    #[serde(default)]
    pub existence_probe: ExistenceProbe,

    #[serde(default)]
    pub notification: NotificationConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws: AwsConfig::default(),
            backend: Backend::default(),
            existence_probe: ExistenceProbe::default(),
            notification: NotificationConfig::default(),
            server: ServerConfig::default(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint override, e.g. a local emulator
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint_url: None,
        }
    }
}

/// Which service implementations the handler talks to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Aws,
    Ephemeral,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Ephemeral => "ephemeral",
        }
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "ephemeral" => Ok(Self::Ephemeral),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub topic_arn: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// Reads `path` if given, otherwise an optional `tenantq.{toml,yaml,json}`
    /// in the working directory, then `TENANTQ_*` variables (`__` separates
    /// nested keys), then `REGION`.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path),
            None => config::File::with_name("tenantq").required(false),
        };

        let mut builder = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("TENANTQ")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Ok(region) = std::env::var(REGION_ENV) {
            builder = builder.set_override("aws.region", region)?;
        }

        Ok(builder.build()?.try_deserialize::<Config>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Config {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = from_toml("");

        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.aws.endpoint_url, None);
        assert_eq!(config.backend, Backend::Aws);
        assert_eq!(config.existence_probe, ExistenceProbe::Strict);
        assert_eq!(config.notification.topic_arn, None);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_full_file() {
        let config = from_toml(
            r#"
            backend = "ephemeral"
            existence_probe = "fail-open"
            log_level = "debug"

            [aws]
            region = "eu-west-1"
            endpoint_url = "http://localhost:4566"

            [notification]
            topic_arn = "arn:aws:sns:eu-west-1:000000000000:Onboard"

            [server]
            port = 9000
            "#,
        );

        assert_eq!(config.aws.region, "eu-west-1");
        assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
        assert_eq!(config.backend, Backend::Ephemeral);
        assert_eq!(config.existence_probe, ExistenceProbe::FailOpen);
        assert_eq!(
            config.notification.topic_arn.as_deref(),
            Some("arn:aws:sns:eu-west-1:000000000000:Onboard")
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_backend_from_str() {
        assert_eq!("AWS".parse::<Backend>(), Ok(Backend::Aws));
        assert_eq!("ephemeral".parse::<Backend>(), Ok(Backend::Ephemeral));
        assert!("local".parse::<Backend>().is_err());
    }

    #[test]
    fn test_load_layers_environment_over_file() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[aws]\nregion = \"eu-west-1\"\n\n[server]\nport = 9000"
        )
        .unwrap();

        // Both variables live in this one test; the environment is process-wide
        std::env::set_var(REGION_ENV, "ap-southeast-2");
        std::env::set_var(
            "TENANTQ_NOTIFICATION__TOPIC_ARN",
            "arn:aws:sns:ap-southeast-2:000000000000:Onboard",
        );

        let loaded = Config::load(Some(file.path()));

        std::env::remove_var(REGION_ENV);
        std::env::remove_var("TENANTQ_NOTIFICATION__TOPIC_ARN");

        let config = loaded.unwrap();
        assert_eq!(config.aws.region, "ap-southeast-2");
        assert_eq!(
            config.notification.topic_arn.as_deref(),
            Some("arn:aws:sns:ap-southeast-2:000000000000:Onboard")
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.backend, Backend::Aws);
    }
}
