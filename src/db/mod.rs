// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use thiserror::Error;

mod state;

pub use self::state::{JsonStateStore, PoolState, StateStore};

#[derive(Debug, Error)]
pub enum Error {
    #[error("state file i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file format: {0}")]
    Json(#[from] serde_json::Error),
}
