use std::env;
use std::str::FromStr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Without a database URL the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub api_prefix: String,

    // Rate limiting, per peer IP. 0 disables the limiter.
    pub rate_clock_per_min: u32,
    pub rate_admin_per_min: u32,

    /// Seconds between background absence sweeps; 0 turns the sweeper off.
    pub sweep_interval_secs: u64,
    pub settings_cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            database_url: None,
            api_prefix: "/api".to_string(),
            rate_clock_per_min: 60,
            rate_admin_per_min: 600,
            sweep_interval_secs: 0,
            settings_cache_ttl_secs: 30,
        }
    }
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            server_addr: env::var("SERVER_ADDR").unwrap_or(defaults.server_addr),
            database_url: env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty()),
            api_prefix: env::var("API_PREFIX").unwrap_or(defaults.api_prefix),

            rate_clock_per_min: parsed("RATE_CLOCK_PER_MIN", defaults.rate_clock_per_min)?,
            rate_admin_per_min: parsed("RATE_ADMIN_PER_MIN", defaults.rate_admin_per_min)?,

            sweep_interval_secs: parsed("SWEEP_INTERVAL_SECS", defaults.sweep_interval_secs)?,
            settings_cache_ttl_secs: parsed(
                "SETTINGS_CACHE_TTL_SECS",
                defaults.settings_cache_ttl_secs,
            )?,
        })
    }
}
