// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::Error;

/// Last reported values of a pool. An absent field means "never observed".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<u128>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<String>,
}

impl PoolState {
    /// Overwrite the fields set in `update`, keep the others
    pub fn merge(&mut self, update: &PoolState) {
        if let Some(block) = update.block {
            self.block = Some(block);
        }
        if let Some(balance) = update.balance {
            self.balance = Some(balance);
        }
        if let Some(payment) = &update.payment {
            self.payment = Some(payment.clone());
        }
    }
}

pub trait StateStore {
    fn read(&self, pool: &str) -> PoolState;

    fn write(&mut self, pool: &str, update: &PoolState) -> Result<(), Error>;
}

/// JSON file keyed by pool name
pub struct JsonStateStore {
    path: PathBuf,
    pools: BTreeMap<String, PoolState>,
}

impl JsonStateStore {
    pub fn open(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            log::info!("Creating state file at {:?}", path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, "{}")?;
        }

        let content: String = fs::read_to_string(path)?;
        let pools: BTreeMap<String, PoolState> = if content.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_json::from_str(&content)?
        };

        log::debug!("State loaded from {:?}: {:?}", path, pools);

        Ok(Self {
            path: path.to_path_buf(),
            pools,
        })
    }

    fn flush(&self) -> Result<(), Error> {
        let data: String = serde_json::to_string_pretty(&self.pools)?;
        let tmp: PathBuf = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StateStore for JsonStateStore {
    fn read(&self, pool: &str) -> PoolState {
        self.pools.get(pool).cloned().unwrap_or_default()
    }

    fn write(&mut self, pool: &str, update: &PoolState) -> Result<(), Error> {
        self.pools
            .entry(pool.to_string())
            .or_default()
            .merge(update);
        self.flush()
    }
}

#[cfg(test)]
mod test {
    use tempfile::TempDir;

    use super::*;

    const POOL: &str = "testpool";

    fn prefilled() -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{"testpool": {"block": 1234, "balance": 1234, "payment": "0x0000000"}}"#,
        )
        .unwrap();
        (dir, path)
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let store = JsonStateStore::open(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert_eq!(store.read(POOL), PoolState::default());
    }

    #[test]
    fn test_read() {
        let (_dir, path) = prefilled();
        let store = JsonStateStore::open(&path).unwrap();
        assert_eq!(
            store.read(POOL),
            PoolState {
                block: Some(1234),
                balance: Some(1234),
                payment: Some("0x0000000".to_string()),
            }
        );
        assert_eq!(store.read("unknown"), PoolState::default());
    }

    #[test]
    fn test_write_single_field() {
        let (_dir, path) = prefilled();
        let mut store = JsonStateStore::open(&path).unwrap();
        store
            .write(
                POOL,
                &PoolState {
                    block: Some(5678),
                    ..Default::default()
                },
            )
            .unwrap();

        let store = JsonStateStore::open(&path).unwrap();
        let state = store.read(POOL);
        assert_eq!(state.block, Some(5678));
        assert_eq!(state.balance, Some(1234));
        assert_eq!(state.payment, Some("0x0000000".to_string()));
    }

    #[test]
    fn test_write_empty_update_keeps_values() {
        let (_dir, path) = prefilled();
        let mut store = JsonStateStore::open(&path).unwrap();
        store.write(POOL, &PoolState::default()).unwrap();
        assert_eq!(store.read(POOL).block, Some(1234));
        assert_eq!(store.read(POOL).payment, Some("0x0000000".to_string()));
    }

    #[test]
    fn test_write_zero_values() {
        let (_dir, path) = prefilled();
        let mut store = JsonStateStore::open(&path).unwrap();
        store
            .write(
                POOL,
                &PoolState {
                    block: Some(0),
                    balance: Some(0),
                    payment: None,
                },
            )
            .unwrap();

        let store = JsonStateStore::open(&path).unwrap();
        assert_eq!(store.read(POOL).block, Some(0));
        assert_eq!(store.read(POOL).balance, Some(0));
    }

    #[test]
    fn test_write_new_pool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = JsonStateStore::open(&path).unwrap();
        store.write("flexpool", &PoolState::default()).unwrap();

        let content: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(content["flexpool"], serde_json::json!({}));
    }

    #[test]
    fn test_large_balance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut store = JsonStateStore::open(&path).unwrap();
        let balance: u128 = 25_000_000_000_000_000_000;
        store
            .write(
                POOL,
                &PoolState {
                    balance: Some(balance),
                    ..Default::default()
                },
            )
            .unwrap();

        let store = JsonStateStore::open(&path).unwrap();
        assert_eq!(store.read(POOL).balance, Some(balance));
    }

    #[test]
    fn test_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonStateStore::open(&path), Err(Error::Json(_))));
    }
}
