// Copyright (c) 2021-2022 Yuki Kishimoto
// Distributed under the MIT software license

use async_trait::async_trait;
use ntfy::{Auth, Dispatcher, Payload};

use super::{template, Error, Notifier};
use crate::config::model::Ntfy as NtfyConfig;
use crate::primitives::NotificationEvent;

pub struct Ntfy {
    dispatcher: Dispatcher,
    topic: String,
}

impl Ntfy {
    pub fn new(config: &NtfyConfig) -> Result<Self, Error> {
        let auth: Option<Auth> = match (&config.username, &config.password) {
            (Some(username), Some(password)) => Some(Auth::new(username, password)),
            _ => None,
        };

        let dispatcher = Dispatcher::new(&config.url, auth, config.proxy.as_ref())
            .map_err(|e| Error::Ntfy(e.to_string()))?;

        Ok(Self {
            dispatcher,
            topic: config.topic.clone(),
        })
    }
}

#[async_trait]
impl Notifier for Ntfy {
    async fn send(&self, event: &NotificationEvent) -> Result<(), Error> {
        let payload = Payload::new(&self.topic)
            .message(template::plain_text(event))
            .title(template::title(event));

        self.dispatcher
            .send(&payload)
            .await
            .map_err(|e| Error::Ntfy(e.to_string()))
    }
}
