// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// `RUST_LOG` takes precedence over `level`. Records written to `logfile`
/// carry a timestamp, stderr records don't.
pub fn init(level: LevelFilter, logfile: Option<&Path>) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(level.to_string()));

    match logfile {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
            builder.format_timestamp_secs();
        }
        None => {
            builder.format_timestamp(None);
        }
    }

    builder.init();

    Ok(())
}
