use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::shared::errors::AppError;
use crate::shared::types::AssetPair;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerCfg {
    pub host: String,
    pub port: u16,
    /// Base used to build absolute `url`/`next` links in responses
    pub public_url: String,
}

impl Default for ServerCfg {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            public_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedCfg {
    pub base_url: String,
    pub asset: String,
    pub currency: String,
    /// Short name accepted in `/api/prices/{asset}` besides the asset id
    pub route_alias: String,
}

impl Default for FeedCfg {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            asset: "bitcoin".to_string(),
            currency: "usd".to_string(),
            route_alias: "btc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreCfg {
    /// SQLite file, or `:memory:`
    pub path: String,
    pub pool_size: u32,
    /// Drop any previous database file at startup
    pub reset_on_start: bool,
}

impl Default for StoreCfg {
    fn default() -> Self {
        Self {
            path: "database.db".to_string(),
            pool_size: 4,
            reset_on_start: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerCfg {
    pub interval_secs: u64,
    /// 0 = spawn every tick unconditionally
    pub max_concurrent_cycles: usize,
}

impl Default for SchedulerCfg {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            max_concurrent_cycles: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlertCfg {
    pub min: f64,
    pub max: f64,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self {
            min: 20_000.0,
            max: 30_000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyCfg {
    pub from: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiCfg {
    pub max_page_size: u32,
}

impl Default for ApiCfg {
    fn default() -> Self {
        Self { max_page_size: 1000 }
    }
}

/// Process-wide configuration, loaded once and read-only afterwards
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerCfg,
    pub feed: FeedCfg,
    pub store: StoreCfg,
    pub scheduler: SchedulerCfg,
    pub alert: AlertCfg,
    pub notify: Option<NotifyCfg>,
    pub api: ApiCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            AppError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, AppError> {
        let cfg: Self = toml::from_str(content)
            .map_err(|e| AppError::ConfigError(format!("Failed to parse config file: {}", e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.alert.min.is_finite() || !self.alert.max.is_finite() {
            return Err(AppError::ConfigError("alert band must be finite".to_string()));
        }
        if self.alert.min > self.alert.max {
            return Err(AppError::ConfigError(format!(
                "alert.min ({}) must not exceed alert.max ({})",
                self.alert.min, self.alert.max
            )));
        }
        if self.scheduler.interval_secs == 0 {
            return Err(AppError::ConfigError("scheduler.interval_secs must be > 0".to_string()));
        }
        if self.store.pool_size == 0 {
            return Err(AppError::ConfigError("store.pool_size must be > 0".to_string()));
        }
        if self.api.max_page_size == 0 {
            return Err(AppError::ConfigError("api.max_page_size must be > 0".to_string()));
        }
        if let Some(notify) = &self.notify {
            if notify.to.is_empty() {
                return Err(AppError::ConfigError("notify.to needs at least one recipient".to_string()));
            }
        }
        Ok(())
    }

    pub fn asset_pair(&self) -> AssetPair {
        AssetPair::new(self.feed.asset.clone(), self.feed.currency.clone())
    }
}
