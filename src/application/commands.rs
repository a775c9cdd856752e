//! CLI commands and handlers
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app;
use crate::domain::price::PriceFeed;
use crate::domain::sample::Sample;
use crate::shared::config::Config;
use crate::shared::errors::AppError;
use crate::shared::types::CalendarDate;

#[derive(Parser, Debug)]
#[command(name = "pricewatch")]
#[command(version, about = "Samples an asset price, stores it and serves the history")]
pub struct Cli {
    /// Path to TOML config file
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// SQLite database path, or :memory: (overrides config)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Seconds between live samples (overrides config)
    #[arg(long, global = true)]
    pub interval_secs: Option<u64>,

    /// Lower alert bound (overrides config)
    #[arg(long, global = true)]
    pub min: Option<f64>,

    /// Upper alert bound (overrides config)
    #[arg(long, global = true)]
    pub max: Option<f64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the sampler and the HTTP API (default)
    Serve,

    /// Fetch one quote and print it without storing
    Fetch {
        /// Historical date as DD-MM-YYYY; live price when omitted
        #[arg(long)]
        date: Option<String>,
    },
}

impl Cli {
    /// Config file (or defaults), then CLI overrides, then validation
    pub fn load_config(&self) -> Result<Config, AppError> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(db) = &self.db {
            config.store.path = db.clone();
        }
        if let Some(interval) = self.interval_secs {
            config.scheduler.interval_secs = interval;
        }
        if let Some(min) = self.min {
            config.alert.min = min;
        }
        if let Some(max) = self.max {
            config.alert.max = max;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub async fn execute(command: Commands, config: Config) -> Result<(), AppError> {
        match command {
            Commands::Serve => app::run(config)
                .await
                .map_err(|e| AppError::Unknown(format!("{:#}", e))),
            Commands::Fetch { date } => Self::execute_fetch_command(date, config).await,
        }
    }

    async fn execute_fetch_command(date: Option<String>, config: Config) -> Result<(), AppError> {
        let date = date
            .map(|d| d.parse::<CalendarDate>())
            .transpose()
            .map_err(|e| AppError::ConfigError(format!("--date {}: expected DD-MM-YYYY", e)))?;

        let pair = config.asset_pair();
        let feed = app::build_feed(&config);
        info!("🔍 Fetching {} in {}", pair.asset, pair.currency);

        let quote = feed.fetch(&pair.asset, date).await?;
        let sample = match date {
            Some(d) => Sample::backfill(&pair, quote, d),
            None => Sample::live(&pair, quote, CalendarDate::today()),
        };

        let json = serde_json::to_string_pretty(&sample)
            .map_err(|e| AppError::Unknown(e.to_string()))?;
        println!("{}", json);
        Ok(())
    }
}
