// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::fmt;

use chrono::{DateTime, Utc};

use crate::pool::{Block, Miner, Transaction};
use crate::util::{self, Fiat};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Telegram,
    Ntfy,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Telegram => write!(f, "telegram"),
            Self::Ntfy => write!(f, "ntfy"),
        }
    }
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockMined {
    pub pool: String,
    pub number: u64,
    pub hash: String,
    pub reward: String,
    pub reward_fiat: Option<String>,
    pub time: String,
    pub round_time: String,
    pub luck: String,
}

impl BlockMined {
    pub fn new(pool: &str, block: &Block, fiat: Option<&Fiat>) -> Self {
        Self {
            pool: pool.to_string(),
            number: block.number,
            hash: block.hash.clone(),
            reward: util::format_weis(block.total_reward),
            reward_fiat: fiat.map(|f| f.convert(block.total_reward)),
            time: format_time(&block.timestamp),
            round_time: util::format_timespan(block.round_time),
            luck: util::format_luck(block.luck),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BalanceChanged {
    pub pool: String,
    pub address: String,
    pub url: String,
    pub balance: String,
    pub balance_fiat: Option<String>,
    pub balance_percentage: Option<String>,
}

impl BalanceChanged {
    pub fn new(pool: &str, miner: &Miner, fiat: Option<&Fiat>) -> Self {
        Self {
            pool: pool.to_string(),
            address: miner.address.clone(),
            url: miner.url.clone(),
            balance: miner.balance(),
            balance_fiat: miner.balance_fiat(fiat),
            balance_percentage: miner.balance_percentage(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PaymentReceived {
    pub pool: String,
    pub address: String,
    pub txid: String,
    pub amount: String,
    pub amount_fiat: Option<String>,
    pub time: String,
    pub duration: String,
}

impl PaymentReceived {
    pub fn new(pool: &str, address: &str, transaction: &Transaction, fiat: Option<&Fiat>) -> Self {
        Self {
            pool: pool.to_string(),
            address: address.to_string(),
            txid: transaction.txid.clone(),
            amount: util::format_weis(transaction.raw_amount),
            amount_fiat: fiat.map(|f| f.convert(transaction.raw_amount)),
            time: format_time(&transaction.timestamp),
            duration: util::format_timespan(transaction.duration),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NotificationEvent {
    BlockMined(BlockMined),
    BalanceChanged(BalanceChanged),
    PaymentReceived(PaymentReceived),
}

impl fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::BlockMined(event) => write!(f, "{} block {}", event.pool, event.number),
            Self::BalanceChanged(event) => write!(f, "{} balance {}", event.pool, event.balance),
            Self::PaymentReceived(event) => write!(f, "{} payment {}", event.pool, event.txid),
        }
    }
}
