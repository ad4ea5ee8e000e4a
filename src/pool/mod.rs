// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::detector;

mod ethermine;
mod flexpool;
pub mod model;

pub use self::ethermine::Ethermine;
pub use self::flexpool::Flexpool;
pub use self::model::{Block, Miner, Transaction};

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("pool api error: {0}")]
    Api(String),
    #[error("miner {0} not found")]
    MinerNotFound(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Data source for a single mining pool
#[async_trait]
pub trait PoolAdapter: Send + Sync {
    /// Name used in notifications
    fn display_name(&self) -> &str;

    fn miner_url(&self, address: &str) -> String;

    async fn list_recent_blocks(&self, count: usize) -> Result<Vec<Block>, Error>;

    async fn get_miner_balance(&self, address: &str) -> Result<u128, Error>;

    async fn get_payout_threshold(&self, address: &str) -> Result<u128, Error>;

    /// Newest first, at most `max_count`
    async fn list_miner_payments(
        &self,
        address: &str,
        max_count: usize,
    ) -> Result<Vec<Transaction>, Error>;

    /// Payments come back oldest first
    async fn get_miner(&self, address: &str, max_payments: usize) -> Result<Miner, Error> {
        let raw_balance: u128 = self.get_miner_balance(address).await?;
        let payout_threshold: u128 = self.get_payout_threshold(address).await?;
        let mut transactions: Vec<Transaction> =
            self.list_miner_payments(address, max_payments).await?;
        // Same-timestamp payouts keep the pool's chronology
        transactions.reverse();
        detector::sort_transactions(&mut transactions);

        Ok(Miner {
            address: address.to_string(),
            url: self.miner_url(address),
            raw_balance,
            payout_threshold,
            transactions,
        })
    }
}

/// Supported pools
pub enum Pool {
    Flexpool(Flexpool),
    Ethermine(Ethermine),
}

impl Pool {
    pub fn from_name(name: &str, client: Client) -> Option<Self> {
        match name {
            "flexpool" => Some(Self::Flexpool(Flexpool::new(client))),
            "ethermine" => Some(Self::Ethermine(Ethermine::new(client))),
            _ => None,
        }
    }
}

impl fmt::Debug for Pool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[async_trait]
impl PoolAdapter for Pool {
    fn display_name(&self) -> &str {
        match self {
            Self::Flexpool(pool) => pool.display_name(),
            Self::Ethermine(pool) => pool.display_name(),
        }
    }

    fn miner_url(&self, address: &str) -> String {
        match self {
            Self::Flexpool(pool) => pool.miner_url(address),
            Self::Ethermine(pool) => pool.miner_url(address),
        }
    }

    async fn list_recent_blocks(&self, count: usize) -> Result<Vec<Block>, Error> {
        match self {
            Self::Flexpool(pool) => pool.list_recent_blocks(count).await,
            Self::Ethermine(pool) => pool.list_recent_blocks(count).await,
        }
    }

    async fn get_miner_balance(&self, address: &str) -> Result<u128, Error> {
        match self {
            Self::Flexpool(pool) => pool.get_miner_balance(address).await,
            Self::Ethermine(pool) => pool.get_miner_balance(address).await,
        }
    }

    async fn get_payout_threshold(&self, address: &str) -> Result<u128, Error> {
        match self {
            Self::Flexpool(pool) => pool.get_payout_threshold(address).await,
            Self::Ethermine(pool) => pool.get_payout_threshold(address).await,
        }
    }

    async fn list_miner_payments(
        &self,
        address: &str,
        max_count: usize,
    ) -> Result<Vec<Transaction>, Error> {
        match self {
            Self::Flexpool(pool) => pool.list_miner_payments(address, max_count).await,
            Self::Ethermine(pool) => pool.list_miner_payments(address, max_count).await,
        }
    }
}

pub(crate) fn timestamp(secs: i64) -> Result<chrono::DateTime<chrono::Utc>, Error> {
    chrono::DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| Error::Malformed(format!("invalid timestamp {}", secs)))
}
