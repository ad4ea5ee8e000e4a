// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::time::Duration;

/// Only the most recent blocks/payments are eligible for notification
pub const DEFAULT_LOOKBACK_WINDOW: usize = 5;

pub const MAX_BLOCKS_COUNT: usize = 10;
pub const MAX_PAYMENTS_COUNT: usize = 10;

pub const NATIVE_DECIMALS: u32 = 18;
pub const NATIVE_SYMBOL: &str = "ETH";
pub const AMOUNT_PRECISION: i32 = 5;
pub const FIAT_PRECISION: i32 = 2;

pub const DEFAULT_RATE_ASSET: &str = "ethereum";
pub const DEFAULT_STATE_FILE: &str = "state.json";

pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);
