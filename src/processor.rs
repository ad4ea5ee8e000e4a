// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use crate::config::Config;
use crate::constants::{DEFAULT_LOOKBACK_WINDOW, MAX_BLOCKS_COUNT, MAX_PAYMENTS_COUNT};
use crate::db::{PoolState, StateStore};
use crate::detector::{self, PaymentPolicy};
use crate::dispatcher::Notifier;
use crate::pool::{self, Block, Miner, PoolAdapter};
use crate::primitives::{BalanceChanged, BlockMined, NotificationEvent, PaymentReceived};
use crate::util::Fiat;

#[derive(Debug, Clone)]
pub struct Options {
    pub miner: Option<String>,
    pub lookback: usize,
    pub payment_policy: PaymentPolicy,
    pub notifications_enabled: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            miner: None,
            lookback: DEFAULT_LOOKBACK_WINDOW,
            payment_policy: PaymentPolicy::default(),
            notifications_enabled: true,
        }
    }
}

impl From<&Config> for Options {
    fn from(config: &Config) -> Self {
        Self {
            miner: config.miner.clone(),
            lookback: config.lookback,
            payment_policy: config.payment_policy,
            notifications_enabled: config.notifications_enabled,
        }
    }
}

/// Outcome of a pool cycle
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub events: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Fetch → detect → notify → persist, one pool after the other
pub struct Processor<'a, N, S>
where
    N: Notifier,
    S: StateStore,
{
    notifier: &'a N,
    store: &'a mut S,
    opts: Options,
    fiat: Option<Fiat>,
}

impl<'a, N, S> Processor<'a, N, S>
where
    N: Notifier,
    S: StateStore,
{
    pub fn new(notifier: &'a N, store: &'a mut S, opts: Options, fiat: Option<Fiat>) -> Self {
        Self {
            notifier,
            store,
            opts,
            fiat,
        }
    }

    pub async fn run<P>(&mut self, pools: &[(String, P)])
    where
        P: PoolAdapter,
    {
        for (name, pool) in pools.iter() {
            log::debug!("Processing {}", name);
            match self.process_pool(name, pool).await {
                Ok(summary) => log::info!(
                    "{} processed: {} events, {} sent, {} failed",
                    name,
                    summary.events,
                    summary.sent,
                    summary.failed
                ),
                Err(e) => log::error!("Skipping {} for this run: {}", name, e),
            }
        }
    }

    /// A fetch failure aborts the cycle before anything is sent or saved
    pub async fn process_pool<P>(&mut self, name: &str, pool: &P) -> Result<Summary, pool::Error>
    where
        P: PoolAdapter,
    {
        let state: PoolState = self.store.read(name);
        log::debug!("Last {} state: {:?}", name, state);

        log::debug!("Watching last blocks");
        let blocks: Vec<Block> = pool.list_recent_blocks(MAX_BLOCKS_COUNT).await?;

        let miner: Option<Miner> = match &self.opts.miner {
            Some(address) => {
                log::debug!("Watching miner {}", address);
                let miner: Miner = pool.get_miner(address, MAX_PAYMENTS_COUNT).await?;
                log::debug!("{:?}", miner);
                Some(miner)
            }
            None => None,
        };

        let pool_name: &str = pool.display_name();
        let fiat: Option<&Fiat> = self.fiat.as_ref();
        let mut events: Vec<NotificationEvent> = Vec::new();
        let mut update = PoolState::default();

        let detection = detector::detect_block_change(blocks, state.block, self.opts.lookback);
        for block in detection.events.iter() {
            log::info!("New {} block {}", name, block.number);
            events.push(NotificationEvent::BlockMined(BlockMined::new(
                pool_name, block, fiat,
            )));
        }
        update.block = detection.cursor;

        if let Some(miner) = miner {
            let detection = detector::detect_balance_change(miner.raw_balance, state.balance);
            if !detection.events.is_empty() {
                log::info!("Miner balance has changed on {}", name);
                events.push(NotificationEvent::BalanceChanged(BalanceChanged::new(
                    pool_name, &miner, fiat,
                )));
            }
            update.balance = Some(detection.cursor);

            let detection = detector::detect_payment_change(
                miner.transactions,
                state.payment.as_deref(),
                self.opts.lookback,
                self.opts.payment_policy,
            );
            for transaction in detection.events.iter() {
                log::info!("New {} payment {}", name, transaction.txid);
                events.push(NotificationEvent::PaymentReceived(PaymentReceived::new(
                    pool_name,
                    &miner.address,
                    transaction,
                    fiat,
                )));
            }
            update.payment = detection.cursor;
        }

        let summary: Summary = self.dispatch(events).await;

        log::debug!("Saving {} state: {:?}", name, update);
        if let Err(e) = self.store.write(name, &update) {
            log::error!("Impossible to save {} state: {}", name, e);
        }

        Ok(summary)
    }

    async fn dispatch(&self, events: Vec<NotificationEvent>) -> Summary {
        let mut summary = Summary {
            events: events.len(),
            ..Default::default()
        };

        if !self.opts.notifications_enabled {
            if !events.is_empty() {
                log::info!("Notifications disabled, {} events not sent", events.len());
            }
            return summary;
        }

        if !self.notifier.has_targets() {
            if !events.is_empty() {
                log::warn!("No notification target, {} events not sent", events.len());
            }
            return summary;
        }

        for event in events.iter() {
            log::debug!("Sending {} notification", event);
            match self.notifier.send(event).await {
                Ok(_) => summary.sent += 1,
                Err(e) => {
                    log::error!("Impossible to send notification for {}: {}", event, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};

    use super::*;
    use crate::db;
    use crate::dispatcher;
    use crate::pool::Transaction;

    const POOL: &str = "testpool";
    const MINER: &str = "0xminer";

    #[derive(Default)]
    struct FakePool {
        blocks: Vec<u64>,
        balance: u128,
        payments: Vec<&'static str>,
        fail_blocks: bool,
        fail_miner: bool,
    }

    #[async_trait]
    impl PoolAdapter for FakePool {
        fn display_name(&self) -> &str {
            "Testpool"
        }

        fn miner_url(&self, address: &str) -> String {
            format!("https://testpool.io/{}", address)
        }

        async fn list_recent_blocks(&self, count: usize) -> Result<Vec<Block>, pool::Error> {
            if self.fail_blocks {
                return Err(pool::Error::Api(String::from("unreachable")));
            }
            let mut blocks: Vec<Block> = self
                .blocks
                .iter()
                .map(|number| Block {
                    number: *number,
                    hash: format!("0x{}", number),
                    timestamp: DateTime::<Utc>::from_timestamp(*number as i64, 0).unwrap(),
                    total_reward: 2_000_000_000_000_000_000,
                    round_time: Duration::from_secs(60),
                    luck: 1.0,
                })
                .collect();
            blocks.truncate(count);
            Ok(blocks)
        }

        async fn get_miner_balance(&self, address: &str) -> Result<u128, pool::Error> {
            if self.fail_miner {
                return Err(pool::Error::MinerNotFound(address.to_string()));
            }
            Ok(self.balance)
        }

        async fn get_payout_threshold(&self, _address: &str) -> Result<u128, pool::Error> {
            Ok(1_000_000_000_000_000_000)
        }

        async fn list_miner_payments(
            &self,
            _address: &str,
            _max_count: usize,
        ) -> Result<Vec<Transaction>, pool::Error> {
            Ok(self
                .payments
                .iter()
                .enumerate()
                .map(|(i, txid)| Transaction {
                    txid: txid.to_string(),
                    timestamp: DateTime::<Utc>::from_timestamp(1_000 + i as i64, 0).unwrap(),
                    raw_amount: 100_000_000_000_000_000,
                    duration: Duration::from_secs(3_600),
                })
                .collect())
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        attempts: Mutex<Vec<NotificationEvent>>,
        fail_blocks: bool,
        no_targets: bool,
    }

    impl FakeNotifier {
        fn attempts(&self) -> Vec<NotificationEvent> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        fn has_targets(&self) -> bool {
            !self.no_targets
        }

        async fn send(&self, event: &NotificationEvent) -> Result<(), dispatcher::Error> {
            self.attempts.lock().unwrap().push(event.clone());
            match event {
                NotificationEvent::BlockMined(_) if self.fail_blocks => {
                    Err(dispatcher::Error::Ntfy(String::from("connection refused")))
                }
                _ => Ok(()),
            }
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        pools: HashMap<String, PoolState>,
        fail_writes: bool,
    }

    impl StateStore for MemoryStore {
        fn read(&self, pool: &str) -> PoolState {
            self.pools.get(pool).cloned().unwrap_or_default()
        }

        fn write(&mut self, pool: &str, update: &PoolState) -> Result<(), db::Error> {
            if self.fail_writes {
                return Err(db::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.pools
                .entry(pool.to_string())
                .or_default()
                .merge(update);
            Ok(())
        }
    }

    fn with_miner() -> Options {
        Options {
            miner: Some(MINER.to_string()),
            ..Default::default()
        }
    }

    async fn cycle(
        notifier: &FakeNotifier,
        store: &mut MemoryStore,
        opts: Options,
        pool: &FakePool,
    ) -> Result<Summary, pool::Error> {
        let mut processor = Processor::new(notifier, store, opts, None);
        processor.process_pool(POOL, pool).await
    }

    #[tokio::test]
    async fn test_balance_lifecycle() {
        let mut store = MemoryStore::default();

        let notifier = FakeNotifier::default();
        let pool = FakePool {
            balance: 1,
            ..Default::default()
        };
        let summary = cycle(&notifier, &mut store, with_miner(), &pool).await.unwrap();
        assert_eq!(summary.events, 1);
        assert!(matches!(
            notifier.attempts()[0],
            NotificationEvent::BalanceChanged(_)
        ));
        assert_eq!(store.read(POOL).balance, Some(1));

        let notifier = FakeNotifier::default();
        let summary = cycle(&notifier, &mut store, with_miner(), &pool).await.unwrap();
        assert_eq!(summary, Summary::default());
        assert!(notifier.attempts().is_empty());
        assert_eq!(store.read(POOL).balance, Some(1));

        // Payout happened
        let notifier = FakeNotifier::default();
        let pool = FakePool {
            balance: 0,
            ..Default::default()
        };
        let summary = cycle(&notifier, &mut store, with_miner(), &pool).await.unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(store.read(POOL).balance, Some(0));
    }

    #[tokio::test]
    async fn test_new_payment() {
        let mut store = MemoryStore::default();
        store.pools.insert(
            POOL.to_string(),
            PoolState {
                block: None,
                balance: Some(5),
                payment: Some("trx1".to_string()),
            },
        );

        let notifier = FakeNotifier::default();
        let pool = FakePool {
            balance: 5,
            payments: vec!["trx1", "trx2"],
            ..Default::default()
        };
        let summary = cycle(&notifier, &mut store, with_miner(), &pool).await.unwrap();
        assert_eq!(summary.events, 1);
        match &notifier.attempts()[0] {
            NotificationEvent::PaymentReceived(payment) => {
                assert_eq!(payment.txid, "trx2");
                assert_eq!(payment.address, MINER);
                assert_eq!(payment.pool, "Testpool");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(store.read(POOL).payment, Some("trx2".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_failure_isolation() {
        let mut store = MemoryStore::default();
        store.pools.insert(
            POOL.to_string(),
            PoolState {
                block: Some(9),
                balance: Some(1),
                payment: None,
            },
        );

        let notifier = FakeNotifier {
            fail_blocks: true,
            ..Default::default()
        };
        let pool = FakePool {
            blocks: (1..=10).collect(),
            balance: 2,
            ..Default::default()
        };
        let summary = cycle(&notifier, &mut store, with_miner(), &pool).await.unwrap();

        let attempts = notifier.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(matches!(attempts[0], NotificationEvent::BlockMined(_)));
        assert!(matches!(attempts[1], NotificationEvent::BalanceChanged(_)));
        assert_eq!(
            summary,
            Summary {
                events: 2,
                sent: 1,
                failed: 1
            }
        );

        let state = store.read(POOL);
        assert_eq!(state.block, Some(10));
        assert_eq!(state.balance, Some(2));
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_pool() {
        let prior = PoolState {
            block: Some(3),
            balance: Some(7),
            payment: Some("trx1".to_string()),
        };

        for pool in [
            FakePool {
                fail_blocks: true,
                ..Default::default()
            },
            FakePool {
                blocks: vec![4, 5],
                fail_miner: true,
                ..Default::default()
            },
        ] {
            let mut store = MemoryStore::default();
            store.pools.insert(POOL.to_string(), prior.clone());
            let notifier = FakeNotifier::default();

            let result = cycle(&notifier, &mut store, with_miner(), &pool).await;
            assert!(result.is_err());
            assert!(notifier.attempts().is_empty());
            assert_eq!(store.read(POOL), prior);
        }
    }

    #[tokio::test]
    async fn test_notifications_disabled() {
        let mut store = MemoryStore::default();
        let notifier = FakeNotifier::default();
        let opts = Options {
            notifications_enabled: false,
            ..with_miner()
        };
        let pool = FakePool {
            blocks: vec![1, 2],
            balance: 3,
            payments: vec!["trx1"],
            ..Default::default()
        };
        let summary = cycle(&notifier, &mut store, opts, &pool).await.unwrap();
        assert_eq!(summary.events, 4);
        assert_eq!(summary.sent, 0);
        assert!(notifier.attempts().is_empty());
        assert_eq!(
            store.read(POOL),
            PoolState {
                block: Some(2),
                balance: Some(3),
                payment: Some("trx1".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_no_targets_counts_nothing_as_sent() {
        let mut store = MemoryStore::default();
        let notifier = FakeNotifier {
            no_targets: true,
            ..Default::default()
        };
        let pool = FakePool {
            blocks: vec![1],
            balance: 3,
            ..Default::default()
        };
        let summary = cycle(&notifier, &mut store, with_miner(), &pool).await.unwrap();
        assert_eq!(
            summary,
            Summary {
                events: 2,
                sent: 0,
                failed: 0
            }
        );
        assert!(notifier.attempts().is_empty());
        assert_eq!(store.read(POOL).block, Some(1));
        assert_eq!(store.read(POOL).balance, Some(3));
    }

    #[tokio::test]
    async fn test_blocks_only_without_miner() {
        let mut store = MemoryStore::default();
        let notifier = FakeNotifier::default();
        let pool = FakePool {
            blocks: (1..=10).collect(),
            fail_miner: true,
            ..Default::default()
        };
        let summary = cycle(&notifier, &mut store, Options::default(), &pool)
            .await
            .unwrap();

        // Cold start: only the lookback window is notified
        assert_eq!(summary.events, DEFAULT_LOOKBACK_WINDOW);
        let numbers: Vec<u64> = notifier
            .attempts()
            .iter()
            .filter_map(|event| match event {
                NotificationEvent::BlockMined(block) => Some(block.number),
                _ => None,
            })
            .collect();
        assert_eq!(numbers, vec![6, 7, 8, 9, 10]);

        let state = store.read(POOL);
        assert_eq!(state.block, Some(10));
        assert_eq!(state.balance, None);
        assert_eq!(state.payment, None);
    }

    #[tokio::test]
    async fn test_state_write_failure_is_not_fatal() {
        let mut store = MemoryStore {
            fail_writes: true,
            ..Default::default()
        };
        let notifier = FakeNotifier::default();
        let pool = FakePool {
            balance: 1,
            ..Default::default()
        };
        let summary = cycle(&notifier, &mut store, with_miner(), &pool).await.unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(store.read(POOL), PoolState::default());
    }

    #[tokio::test]
    async fn test_run_continues_after_failing_pool() {
        let mut store = MemoryStore::default();
        let notifier = FakeNotifier::default();
        let pools = vec![
            (
                String::from("broken"),
                FakePool {
                    fail_blocks: true,
                    ..Default::default()
                },
            ),
            (
                String::from("working"),
                FakePool {
                    balance: 42,
                    ..Default::default()
                },
            ),
        ];

        let mut processor = Processor::new(&notifier, &mut store, with_miner(), None);
        processor.run(&pools).await;

        assert_eq!(notifier.attempts().len(), 1);
        assert_eq!(store.read("broken"), PoolState::default());
        assert_eq!(store.read("working").balance, Some(42));
    }

    #[tokio::test]
    async fn test_fiat_in_events() {
        let mut store = MemoryStore::default();
        let notifier = FakeNotifier::default();
        let pool = FakePool {
            balance: 500_000_000_000_000_000,
            ..Default::default()
        };
        let fiat = Fiat::new(2000.0, "EUR");
        let mut processor = Processor::new(&notifier, &mut store, with_miner(), Some(fiat));
        processor.process_pool(POOL, &pool).await.unwrap();

        match &notifier.attempts()[0] {
            NotificationEvent::BalanceChanged(balance) => {
                assert_eq!(balance.balance, "0.5 ETH");
                assert_eq!(balance.balance_fiat, Some("1000 EUR".to_string()));
                assert_eq!(balance.balance_percentage, Some("50%".to_string()));
                assert_eq!(balance.url, "https://testpool.io/0xminer");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
