// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

#[macro_use]
extern crate serde;

use anyhow::Result;
use clap::Parser;

mod common;
mod config;
mod constants;
mod db;
mod detector;
mod dispatcher;
mod logger;
mod pool;
mod primitives;
mod processor;
mod rate;
mod util;

use self::config::{Args, Config};
use self::db::JsonStateStore;
use self::dispatcher::Dispatcher;
use self::pool::Pool;
use self::processor::{Options, Processor};
use self::rate::CoinGecko;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    logger::init(args.log_level(), args.logfile.as_deref())?;

    let config = Config::from_args(&args)?;
    let client = common::http::client()?;

    let mut store = JsonStateStore::open(&config.state_path)?;

    let dispatcher = if config.notifications_enabled {
        Dispatcher::new(&config, client.clone())?
    } else {
        Dispatcher::default()
    };

    if config.notifications_enabled && dispatcher.targets().is_empty() {
        log::warn!("No notification target configured");
    }

    let fiat = rate::lookup_fiat(
        &CoinGecko::new(client.clone()),
        &config.rate_asset,
        config.currency.as_deref(),
    )
    .await;

    let mut pools: Vec<(String, Pool)> = Vec::with_capacity(config.pools.len());
    for name in config.pools.iter() {
        match Pool::from_name(name, client.clone()) {
            Some(pool) => pools.push((name.clone(), pool)),
            None => log::warn!("Unknown pool {}, skipping", name),
        }
    }

    let mut processor = Processor::new(&dispatcher, &mut store, Options::from(&config), fiat);
    processor.run(&pools).await;

    Ok(())
}
