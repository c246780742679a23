//! Env-driven configuration for the service, the CLI and the library.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Credentials are optional at load time: a missing key only
//! fails the request that needs it, so the service can start without them.
use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::history::store::STORAGE_KEY;
use crate::utils::redact::mask_secret;

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_REPLICATE_URL: &str = "https://api.replicate.com/v1";
pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";

#[derive(Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openrouter_url: String,
    pub replicate_api_token: Option<String>,
    pub replicate_url: String,
    pub site_url: String,
    pub api_host: String,
    pub api_port: String,
    pub api_url: String,
    pub data_dir: String,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Result<Self, env::VarError> {
        Ok(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or_default =
            |key: &str, default: &str| non_empty(key).unwrap_or_else(|| default.to_string());

        let api_host = or_default("API_HOST", "127.0.0.1");
        let api_port = or_default("API_PORT", "8189");
        let api_url = non_empty("COMIC_API_URL")
            .unwrap_or_else(|| format!("http://{}:{}", api_host, api_port));

        Config {
            openrouter_api_key: non_empty("OPENROUTER_API_KEY"),
            openrouter_url: or_default("OPENROUTER_API_URL", DEFAULT_OPENROUTER_URL),
            replicate_api_token: non_empty("REPLICATE_API_TOKEN"),
            replicate_url: or_default("REPLICATE_API_URL", DEFAULT_REPLICATE_URL),
            site_url: or_default("NEXT_PUBLIC_SITE_URL", DEFAULT_SITE_URL),
            api_host,
            api_port,
            api_url,
            data_dir: or_default("DATA_DIR", "./data"),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join(format!("{}.json", STORAGE_KEY))
    }

    pub fn download_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("images")
    }

    /// Log the effective configuration with credentials masked.
    pub fn print_env_vars(&self) {
        tracing::info!("OPENROUTER_API_KEY: {}", display_secret(&self.openrouter_api_key));
        tracing::info!("OPENROUTER_API_URL: {}", self.openrouter_url);
        tracing::info!("REPLICATE_API_TOKEN: {}", display_secret(&self.replicate_api_token));
        tracing::info!("REPLICATE_API_URL: {}", self.replicate_url);
        tracing::info!("NEXT_PUBLIC_SITE_URL: {}", self.site_url);
        tracing::info!("API_HOST: {}", self.api_host);
        tracing::info!("API_PORT: {}", self.api_port);
        tracing::info!("DATA_DIR: {}", self.data_dir);
    }
}

fn display_secret(secret: &Option<String>) -> String {
    secret.as_deref().map(mask_secret).unwrap_or_else(|| "<unset>".to_string())
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openrouter_api_key", &display_secret(&self.openrouter_api_key))
            .field("openrouter_url", &self.openrouter_url)
            .field("replicate_api_token", &display_secret(&self.replicate_api_token))
            .field("replicate_url", &self.replicate_url)
            .field("site_url", &self.site_url)
            .field("api_host", &self.api_host)
            .field("api_port", &self.api_port)
            .field("api_url", &self.api_url)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}
