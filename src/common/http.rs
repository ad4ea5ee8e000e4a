// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use reqwest::Client;

use crate::constants::DEFAULT_HTTP_TIMEOUT;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client shared by pool adapters, the rate lookup and the
/// Telegram dispatcher
pub fn client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(DEFAULT_HTTP_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}
