// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

mod ntfy;
mod telegram;
pub mod template;

use self::ntfy::Ntfy;
use self::telegram::Telegram;

use crate::config::Config;
use crate::primitives::{NotificationEvent, Target};

#[derive(Debug, Error)]
pub enum Error {
    #[error("telegram: {0}")]
    Telegram(reqwest::Error),
    #[error("ntfy: {0}")]
    Ntfy(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// `false` when events would be dropped without being delivered
    fn has_targets(&self) -> bool {
        true
    }

    async fn send(&self, event: &NotificationEvent) -> Result<(), Error>;
}

/// Sends every event to all the enabled targets
#[derive(Default)]
pub struct Dispatcher {
    telegram: Option<Telegram>,
    ntfy: Option<Ntfy>,
}

impl Dispatcher {
    pub fn new(config: &Config, client: Client) -> Result<Self, Error> {
        let mut dispatcher = Self::default();

        if let Some(telegram) = &config.telegram {
            dispatcher.telegram = Some(Telegram::new(
                client,
                telegram.chat_id.clone(),
                telegram.auth_key.clone(),
            ));
        }

        if let Some(ntfy) = &config.ntfy {
            dispatcher.ntfy = Some(Ntfy::new(ntfy)?);
        }

        Ok(dispatcher)
    }

    pub fn targets(&self) -> Vec<Target> {
        let mut targets = Vec::new();
        if self.telegram.is_some() {
            targets.push(Target::Telegram);
        }
        if self.ntfy.is_some() {
            targets.push(Target::Ntfy);
        }
        targets
    }
}

#[async_trait]
impl Notifier for Dispatcher {
    fn has_targets(&self) -> bool {
        !self.targets().is_empty()
    }

    /// Every target is attempted; the last failure is returned
    async fn send(&self, event: &NotificationEvent) -> Result<(), Error> {
        let mut result: Result<(), Error> = Ok(());

        if let Some(telegram) = &self.telegram {
            match telegram.send(event).await {
                Ok(_) => log::info!("Sent {} notification: {}", Target::Telegram, event),
                Err(e) => {
                    log::warn!("Impossible to send {} notification: {}", Target::Telegram, e);
                    result = Err(e);
                }
            }
        }

        if let Some(ntfy) = &self.ntfy {
            match ntfy.send(event).await {
                Ok(_) => log::info!("Sent {} notification: {}", Target::Ntfy, event),
                Err(e) => {
                    log::warn!("Impossible to send {} notification: {}", Target::Ntfy, e);
                    result = Err(e);
                }
            }
        }

        if self.telegram.is_none() && self.ntfy.is_none() {
            log::debug!("No notification target configured, dropping {}", event);
        }

        result
    }
}
