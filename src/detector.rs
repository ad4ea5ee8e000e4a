// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

//! Change detection between freshly fetched pool data and the cursors
//! persisted by the previous run.
//!
//! Blocks and payments are only reported when they fall into the lookback
//! window (the most recent `window` items), so a cold start or a long gap
//! between runs never floods the notification targets. Cursors always move
//! to the latest observed value, notified or not.

use crate::pool::{Block, Transaction};

/// Strategy used to decide which payments are new
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentPolicy {
    /// Locate the last reported txid and report every eligible payment
    /// after it. When the txid is unknown, every eligible payment is new.
    #[default]
    Scan,
    /// Report the most recent payment only, if its txid differs from the
    /// last reported one
    Latest,
}

/// Items to report plus the cursor to persist
#[derive(Debug, Clone, PartialEq)]
pub struct Detection<T, C> {
    pub events: Vec<T>,
    pub cursor: C,
}

/// Index of the first item eligible for notification
fn window_start(len: usize, window: usize) -> usize {
    len.saturating_sub(window)
}

pub fn sort_blocks(blocks: &mut [Block]) {
    blocks.sort_by(|a, b| a.number.cmp(&b.number));
}

/// Stable: payments sharing a timestamp keep their incoming order
pub fn sort_transactions(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}

pub fn detect_block_change(
    mut blocks: Vec<Block>,
    last_known_number: Option<u64>,
    window: usize,
) -> Detection<Block, Option<u64>> {
    if blocks.is_empty() {
        return Detection {
            events: Vec::new(),
            cursor: last_known_number,
        };
    }

    sort_blocks(&mut blocks);

    let cursor: Option<u64> = blocks.last().map(|block| block.number);
    let start: usize = window_start(blocks.len(), window);

    let events: Vec<Block> = blocks
        .into_iter()
        .skip(start)
        .filter(|block| match last_known_number {
            Some(last) => last < block.number,
            None => true,
        })
        .collect();

    Detection { events, cursor }
}

pub fn detect_balance_change(
    current_balance: u128,
    last_known_balance: Option<u128>,
) -> Detection<u128, u128> {
    let events: Vec<u128> = if last_known_balance != Some(current_balance) {
        vec![current_balance]
    } else {
        Vec::new()
    };

    Detection {
        events,
        cursor: current_balance,
    }
}

pub fn detect_payment_change(
    mut transactions: Vec<Transaction>,
    last_known_txid: Option<&str>,
    window: usize,
    policy: PaymentPolicy,
) -> Detection<Transaction, Option<String>> {
    if transactions.is_empty() {
        return Detection {
            events: Vec::new(),
            cursor: last_known_txid.map(String::from),
        };
    }

    sort_transactions(&mut transactions);

    let cursor: Option<String> = transactions.last().map(|trx| trx.txid.clone());

    let start: usize = match policy {
        PaymentPolicy::Scan => {
            let after_last_known: usize = last_known_txid
                .and_then(|txid| transactions.iter().rposition(|trx| trx.txid == txid))
                .map(|position| position + 1)
                .unwrap_or(0);
            window_start(transactions.len(), window).max(after_last_known)
        }
        PaymentPolicy::Latest => {
            let latest_is_known: bool = transactions
                .last()
                .map(|trx| Some(trx.txid.as_str()) == last_known_txid)
                .unwrap_or(true);
            if latest_is_known || window == 0 {
                transactions.len()
            } else {
                transactions.len() - 1
            }
        }
    };

    let events: Vec<Transaction> = transactions.into_iter().skip(start).collect();

    Detection { events, cursor }
}
