// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::path::{Path, PathBuf};

use clap::Parser;
use dirs::home_dir;
use log::LevelFilter;
use thiserror::Error;

pub mod model;

use model::{ConfigFile, Ntfy, Telegram};

pub use model::Config;

use crate::constants::{DEFAULT_LOOKBACK_WINDOW, DEFAULT_RATE_ASSET, DEFAULT_STATE_FILE};

const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";

#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown home directory")]
    HomeDir,
    #[error("impossible to read config file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_dir() -> Result<PathBuf, Error> {
    let home: PathBuf = home_dir().ok_or(Error::HomeDir)?;
    Ok(home.join(".mining_companion"))
}

fn default_config_file() -> Result<PathBuf, Error> {
    let mut default = default_dir()?.join("config");
    default.set_extension("toml");
    Ok(default)
}

fn require(value: &str, what: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::Invalid(format!("{} can't be empty", what)));
    }
    Ok(())
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file
    #[clap(short, long = "config")]
    pub config_file: Option<PathBuf>,
    /// Print more output
    #[clap(short, long)]
    pub verbose: bool,
    /// Print even more output
    #[clap(short, long)]
    pub debug: bool,
    /// Logging file location
    #[clap(short = 'o', long)]
    pub logfile: Option<PathBuf>,
    /// Don't send notifications, only update the state file
    #[clap(short = 'N', long)]
    pub disable_notifications: bool,
    /// State file location
    #[clap(short, long)]
    pub state_file: Option<PathBuf>,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.debug {
            LevelFilter::Debug
        } else if self.verbose {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }
    }
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, Error> {
        let config_file_path: PathBuf = match &args.config_file {
            Some(path) => path.clone(),
            None => default_config_file()?,
        };

        let config_file: ConfigFile = Self::read_config_file(&config_file_path)?;
        let config = Self::build(config_file, args)?;

        log::info!("{:?}", config);

        Ok(config)
    }

    fn read_config_file(path: &Path) -> Result<ConfigFile, Error> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    fn build(config_file: ConfigFile, args: &Args) -> Result<Self, Error> {
        let state_path: PathBuf = match args
            .state_file
            .clone()
            .or(config_file.state_file)
        {
            Some(path) => path,
            None => match config_file.main_path {
                Some(path) => path.join(DEFAULT_STATE_FILE),
                None => default_dir()?.join(DEFAULT_STATE_FILE),
            },
        };

        let config = Self {
            state_path,
            pools: config_file.pools,
            miner: config_file.miner,
            currency: config_file.currency,
            rate_asset: config_file
                .rate_asset
                .unwrap_or_else(|| DEFAULT_RATE_ASSET.to_string()),
            payment_policy: config_file.payment_policy,
            lookback: config_file.lookback.unwrap_or(DEFAULT_LOOKBACK_WINDOW),
            notifications_enabled: !args.disable_notifications,
            telegram: config_file.telegram.map(|telegram| Telegram {
                chat_id: telegram.chat_id.to_string(),
                auth_key: telegram.auth_key,
            }),
            ntfy: config_file.ntfy.map(|ntfy| Ntfy {
                url: ntfy.url.unwrap_or_else(|| DEFAULT_NTFY_URL.to_string()),
                topic: ntfy.topic,
                username: ntfy.username,
                password: ntfy.password,
                proxy: ntfy.proxy,
            }),
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.pools.is_empty() {
            return Err(Error::Invalid(String::from("no pool configured")));
        }

        for pool in self.pools.iter() {
            require(pool, "pool name")?;
        }

        if let Some(miner) = &self.miner {
            require(miner, "miner address")?;
        }

        if let Some(currency) = &self.currency {
            if currency.is_empty() || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(Error::Invalid(format!("invalid currency: {}", currency)));
            }
        }

        require(&self.rate_asset, "rate asset")?;

        if self.lookback == 0 {
            return Err(Error::Invalid(String::from("lookback must be at least 1")));
        }

        if let Some(telegram) = &self.telegram {
            require(&telegram.chat_id, "telegram chat_id")?;
            require(&telegram.auth_key, "telegram auth_key")?;
        }

        if let Some(ntfy) = &self.ntfy {
            require(&ntfy.url, "ntfy url")?;
            require(&ntfy.topic, "ntfy topic")?;
        }

        Ok(())
    }
}
