// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{timestamp, Block, Error, PoolAdapter, Transaction};

const API_URL: &str = "https://api.ethermine.org";
const DASHBOARD_URL: &str = "https://ethermine.org/miners";
const NO_DATA: &str = "NO DATA";

#[derive(Deserialize)]
struct Response<T> {
    status: String,
    data: Option<T>,
    error: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Dashboard {
    current_statistics: CurrentStatistics,
}

#[derive(Deserialize)]
struct CurrentStatistics {
    unpaid: Option<u128>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    min_payout: u128,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Payout {
    paid_on: i64,
    start: u64,
    end: u64,
    amount: u128,
    tx_hash: String,
}

impl TryFrom<Payout> for Transaction {
    type Error = Error;

    fn try_from(payout: Payout) -> Result<Self, Self::Error> {
        Ok(Self {
            txid: payout.tx_hash,
            timestamp: timestamp(payout.paid_on)?,
            raw_amount: payout.amount,
            duration: Duration::from_secs(payout.end.saturating_sub(payout.start)),
        })
    }
}

pub struct Ethermine {
    client: Client,
    base_url: String,
}

impl Ethermine {
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

    async fn get_miner_data<T>(&self, address: &str, endpoint: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let url: String = format!("{}/miner/{}/{}", self.base_url, address, endpoint);
        log::debug!("GET {}", url);
        let body: String = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        parse_response(address, &body)
    }
}

fn parse_response<T>(address: &str, body: &str) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let response: Response<T> = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(error) => {
            // The pool answers "NO DATA" for addresses it has never seen
            if let Ok(response) = serde_json::from_str::<Response<String>>(body) {
                if response.data.as_deref() == Some(NO_DATA) {
                    return Err(Error::MinerNotFound(address.to_string()));
                }
            }
            return Err(Error::Malformed(error.to_string()));
        }
    };

    if response.status != "OK" {
        return Err(Error::Api(response.error.unwrap_or(response.status)));
    }

    response
        .data
        .ok_or_else(|| Error::MinerNotFound(address.to_string()))
}

#[async_trait]
impl PoolAdapter for Ethermine {
    fn display_name(&self) -> &str {
        "Ethermine"
    }

    fn miner_url(&self, address: &str) -> String {
        format!("{}/{}/dashboard", DASHBOARD_URL, address)
    }

    async fn list_recent_blocks(&self, _count: usize) -> Result<Vec<Block>, Error> {
        log::debug!("Ethermine doesn't expose block details, skipping");
        Ok(Vec::new())
    }

    async fn get_miner_balance(&self, address: &str) -> Result<u128, Error> {
        let dashboard: Dashboard = self.get_miner_data(address, "dashboard").await?;
        // No stats yet is not a zero balance
        dashboard
            .current_statistics
            .unpaid
            .ok_or_else(|| Error::Malformed(String::from("missing unpaid balance")))
    }

    async fn get_payout_threshold(&self, address: &str) -> Result<u128, Error> {
        let settings: Settings = self.get_miner_data(address, "settings").await?;
        Ok(settings.min_payout)
    }

    async fn list_miner_payments(
        &self,
        address: &str,
        max_count: usize,
    ) -> Result<Vec<Transaction>, Error> {
        let payouts: Vec<Payout> = self.get_miner_data(address, "payouts").await?;
        let mut transactions: Vec<Transaction> = payouts
            .into_iter()
            .map(Transaction::try_from)
            .collect::<Result<_, _>>()?;

        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        transactions.truncate(max_count);
        Ok(transactions)
    }
}
