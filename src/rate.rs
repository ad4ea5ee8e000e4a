// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::util::Fiat;

const COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("no {asset}/{currency} rate in response")]
    MissingRate { asset: String, currency: String },
}

#[async_trait]
pub trait RateSource: Send + Sync {
    async fn get_rate(&self, asset: &str, currency: &str) -> Result<f64, Error>;
}

type SimplePrice = HashMap<String, HashMap<String, f64>>;

pub struct CoinGecko {
    client: Client,
    base_url: String,
}

impl CoinGecko {
    pub fn new(client: Client) -> Self {
        Self::with_url(client, COINGECKO_URL)
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
}

fn extract_rate(prices: &SimplePrice, asset: &str, currency: &str) -> Result<f64, Error> {
    prices
        .get(&asset.to_lowercase())
        .and_then(|rates| rates.get(&currency.to_lowercase()))
        .copied()
        .ok_or_else(|| Error::MissingRate {
            asset: asset.to_string(),
            currency: currency.to_string(),
        })
}

#[async_trait]
impl RateSource for CoinGecko {
    async fn get_rate(&self, asset: &str, currency: &str) -> Result<f64, Error> {
        log::debug!("Getting {} price in {} on coingecko", asset, currency);
        let prices: SimplePrice = self
            .client
            .get(format!("{}/simple/price", self.base_url))
            .query(&[("ids", asset), ("vs_currencies", currency)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        log::debug!("{:?}", prices);
        extract_rate(&prices, asset, currency)
    }
}

/// Rate lookup failures only cost the fiat figures, never the run
pub async fn lookup_fiat<R>(source: &R, asset: &str, currency: Option<&str>) -> Option<Fiat>
where
    R: RateSource,
{
    let currency: &str = currency?;
    match source.get_rate(asset, currency).await {
        Ok(rate) => {
            log::info!("{} price: {} {}", asset, rate, currency);
            Some(Fiat::new(rate, currency.to_uppercase()))
        }
        Err(e) => {
            log::warn!("Impossible to get {} price in {}: {}", asset, currency, e);
            None
        }
    }
}
