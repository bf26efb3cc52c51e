//! Action server configuration loaded from `config/kic.toml` and the environment.
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | KIC_CONFIG | config/kic | Config file (extension optional). |
//! | KIC_RECOMMENDER_API__URL | "" | Base URL of the recommender API. |
//! | KIC_RECOMMENDER_API__TOKEN | "" | Access token (`Authorization: Token ...`). |
//! | KIC_RECOMMENDER_API__DEBUG | false | Log diagnostics of failed calls and query parameters. |
//! | KIC_RECOMMENDER_API__ENROLLMENT_POLICY | pass_through | `pass_through` \| `skip`. |
//! | KIC_RECOMMENDER_API__TIMEOUT_SECS | 30 | HTTP timeout per recommender call. |
//! | KIC_GATEWAY__HOST / KIC_GATEWAY__PORT | 127.0.0.1 / 5055 | Action server bind address. |

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_timeout_secs() -> u64 {
    30
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5055
}

/// What to send for enrolled courses that carry no course code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentPolicy {
    /// Send the entry's raw id (or its raw JSON when it has none).
    #[default]
    PassThrough,
    /// Leave the entry out of the filter.
    Skip,
}

/// Recommender API access (`recommender_api` section).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Base URL, e.g. `https://recommender.example.org/api/`.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub token: String,
    /// Log status, headers and body of failed calls under `kic::diagnostics`.
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub enrollment_policy: EnrollmentPolicy,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RecommenderConfig {
    /// True when both URL and token are set.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.token.trim().is_empty()
    }
}

/// HTTP bind address of the action server (`gateway` section).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl GatewayConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Full configuration of the action server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KicConfig {
    #[serde(default)]
    pub recommender_api: RecommenderConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Response texts file; the bundled texts are used when unset.
    #[serde(default)]
    pub responses_path: Option<String>,
}

impl KicConfig {
    /// Load config from file and environment.
    /// Precedence: env > `KIC_CONFIG` path or `config/kic` > defaults.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path = std::env::var("KIC_CONFIG").unwrap_or_else(|_| "config/kic".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load config from `path` (if it exists) layered under `KIC_*` environment variables.
    pub fn load_from(path: &Path) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("recommender_api.url", "")?
            .set_default("recommender_api.token", "")?
            .set_default("recommender_api.debug", false)?
            .set_default("recommender_api.enrollment_policy", "pass_through")?
            .set_default("recommender_api.timeout_secs", default_timeout_secs() as i64)?
            .set_default("gateway.host", default_host())?
            .set_default("gateway.port", default_port() as i64)?;

        let with_toml = path.with_extension("toml");
        let builder = if path.is_file() {
            builder.add_source(config::File::from(path))
        } else if with_toml.is_file() {
            builder.add_source(config::File::from(with_toml.as_path()))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("KIC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        built.try_deserialize()
    }
}
