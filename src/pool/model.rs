// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::util::{self, Fiat};

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub number: u64,
    pub hash: String,
    pub timestamp: DateTime<Utc>,
    pub total_reward: u128,
    pub round_time: Duration,
    pub luck: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub txid: String,
    pub timestamp: DateTime<Utc>,
    pub raw_amount: u128,
    pub duration: Duration,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Miner {
    pub address: String,
    pub url: String,
    pub raw_balance: u128,
    pub payout_threshold: u128,
    /// Oldest first
    pub transactions: Vec<Transaction>,
}

impl Miner {
    pub fn balance(&self) -> String {
        util::format_weis(self.raw_balance)
    }

    pub fn balance_fiat(&self, fiat: Option<&Fiat>) -> Option<String> {
        fiat.map(|f| f.convert(self.raw_balance))
    }

    pub fn balance_percentage(&self) -> Option<String> {
        util::format_percentage(self.raw_balance, self.payout_threshold)
    }
}

impl fmt::Debug for Miner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ address: {}, balance: {}, raw_balance: {}, balance_percentage: {:?}, url: {}, transactions: {} }}",
            self.address,
            self.balance(),
            self.raw_balance,
            self.balance_percentage(),
            self.url,
            self.transactions.len()
        )
    }
}
