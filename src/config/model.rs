// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::fmt;
use std::path::PathBuf;

use crate::detector::PaymentPolicy;

pub struct Telegram {
    pub chat_id: String,
    pub auth_key: String,
}

/// Telegram accepts both numeric chat ids and `@channel` names
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{}", id),
            Self::Text(id) => write!(f, "{}", id),
        }
    }
}

#[derive(Deserialize)]
pub struct ConfigFileTelegram {
    pub chat_id: ChatId,
    pub auth_key: String,
}

pub struct Ntfy {
    pub url: String,
    pub topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub proxy: Option<String>,
}

#[derive(Deserialize)]
pub struct ConfigFileNtfy {
    pub url: Option<String>,
    pub topic: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub proxy: Option<String>,
}

pub struct Config {
    pub state_path: PathBuf,
    pub pools: Vec<String>,
    pub miner: Option<String>,
    pub currency: Option<String>,
    pub rate_asset: String,
    pub payment_policy: PaymentPolicy,
    pub lookback: usize,
    pub notifications_enabled: bool,
    pub telegram: Option<Telegram>,
    pub ntfy: Option<Ntfy>,
}

#[derive(Deserialize)]
pub struct ConfigFile {
    pub main_path: Option<PathBuf>,
    #[serde(default)]
    pub pools: Vec<String>,
    pub miner: Option<String>,
    pub currency: Option<String>,
    pub rate_asset: Option<String>,
    pub state_file: Option<PathBuf>,
    #[serde(default)]
    pub payment_policy: PaymentPolicy,
    pub lookback: Option<usize>,
    pub telegram: Option<ConfigFileTelegram>,
    pub ntfy: Option<ConfigFileNtfy>,
}

impl fmt::Debug for Telegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ chat_id: {} }}", self.chat_id)
    }
}

impl fmt::Debug for Ntfy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ url: {:?}, topic: {}, username: {:?}, proxy: {:?} }}",
            self.url, self.topic, self.username, self.proxy
        )
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ state_path: {:?}, pools: {:?}, miner: {:?}, currency: {:?}, rate_asset: {}, payment_policy: {:?}, lookback: {}, notifications_enabled: {}, telegram: {:?}, ntfy: {:?} }}",
            self.state_path,
            self.pools,
            self.miner,
            self.currency,
            self.rate_asset,
            self.payment_policy,
            self.lookback,
            self.notifications_enabled,
            self.telegram,
            self.ntfy
        )
    }
}
