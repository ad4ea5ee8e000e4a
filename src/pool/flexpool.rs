// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{timestamp, Block, Error, PoolAdapter, Transaction};

const API_URL: &str = "https://flexpool.io/api/v1";
const DASHBOARD_URL: &str = "https://flexpool.io";

#[derive(Deserialize)]
struct Response<T> {
    error: Option<String>,
    result: Option<T>,
}

impl<T> Response<T> {
    fn into_result(self) -> Result<T, Error> {
        if let Some(error) = self.error {
            return Err(Error::Api(error));
        }
        self.result
            .ok_or_else(|| Error::Malformed(String::from("missing result")))
    }
}

#[derive(Deserialize)]
struct Page<T> {
    data: Vec<T>,
    total_pages: u32,
}

#[derive(Deserialize)]
struct RemoteBlock {
    number: u64,
    hash: String,
    timestamp: i64,
    total_rewards: u128,
    round_time: u64,
    luck: f64,
}

#[derive(Deserialize)]
struct MinerDetails {
    min_payout_threshold: u128,
}

#[derive(Deserialize)]
struct RemotePayment {
    txid: String,
    amount: u128,
    timestamp: i64,
    duration: u64,
}

impl TryFrom<RemoteBlock> for Block {
    type Error = Error;

    fn try_from(block: RemoteBlock) -> Result<Self, Self::Error> {
        Ok(Self {
            number: block.number,
            hash: block.hash,
            timestamp: timestamp(block.timestamp)?,
            total_reward: block.total_rewards,
            round_time: Duration::from_secs(block.round_time),
            luck: block.luck,
        })
    }
}

impl TryFrom<RemotePayment> for Transaction {
    type Error = Error;

    fn try_from(payment: RemotePayment) -> Result<Self, Self::Error> {
        Ok(Self {
            txid: payment.txid,
            timestamp: timestamp(payment.timestamp)?,
            raw_amount: payment.amount,
            duration: Duration::from_secs(payment.duration),
        })
    }
}

pub struct Flexpool {
    client: Client,
    base_url: String,
}

impl Flexpool {
    pub fn new(client: Client) -> Self {
        Self::with_url(client, API_URL)
    }

    pub fn with_url<S>(client: Client, base_url: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let url: String = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);
        let response: Response<T> = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_result()
    }
}

#[async_trait]
impl PoolAdapter for Flexpool {
    fn display_name(&self) -> &str {
        "Flexpool"
    }

    fn miner_url(&self, address: &str) -> String {
        format!("{}/{}", DASHBOARD_URL, address)
    }

    async fn list_recent_blocks(&self, count: usize) -> Result<Vec<Block>, Error> {
        let page: Page<RemoteBlock> = self
            .get("/pool/blocks", &[("page", String::from("0"))])
            .await?;

        let mut blocks: Vec<Block> = page
            .data
            .into_iter()
            .map(Block::try_from)
            .collect::<Result<_, _>>()?;

        // Most recent first, keep `count`
        blocks.sort_by(|a, b| b.number.cmp(&a.number));
        blocks.truncate(count);
        Ok(blocks)
    }

    async fn get_miner_balance(&self, address: &str) -> Result<u128, Error> {
        // Unknown miners come back with a null result
        self.get(&format!("/miner/{}/balance", address), &[])
            .await
            .map_err(|e| match e {
                Error::Malformed(_) => Error::MinerNotFound(address.to_string()),
                e => e,
            })
    }

    async fn get_payout_threshold(&self, address: &str) -> Result<u128, Error> {
        let details: MinerDetails = self
            .get(&format!("/miner/{}/details", address), &[])
            .await?;
        Ok(details.min_payout_threshold)
    }

    async fn list_miner_payments(
        &self,
        address: &str,
        max_count: usize,
    ) -> Result<Vec<Transaction>, Error> {
        let path: String = format!("/miner/{}/payments", address);
        let mut transactions: Vec<Transaction> = Vec::new();
        let mut current_page: u32 = 0;

        while transactions.len() < max_count {
            log::debug!("Fetching payments page {}", current_page);
            let page: Page<RemotePayment> = self
                .get(&path, &[("page", current_page.to_string())])
                .await?;

            if page.data.is_empty() {
                break;
            }

            for payment in page.data.into_iter() {
                transactions.push(Transaction::try_from(payment)?);
            }

            current_page += 1;
            if current_page >= page.total_pages {
                break;
            }
        }

        // Pages are newest first
        transactions.truncate(max_count);
        Ok(transactions)
    }
}
