// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use async_trait::async_trait;
use reqwest::Client;

use super::{template, Error, Notifier};
use crate::primitives::NotificationEvent;

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

pub struct Telegram {
    client: Client,
    base_url: String,
    chat_id: String,
    auth_key: String,
}

impl Telegram {
    pub fn new(client: Client, chat_id: String, auth_key: String) -> Self {
        Self::with_url(client, TELEGRAM_API_URL, chat_id, auth_key)
    }

    pub fn with_url<S>(client: Client, base_url: S, chat_id: String, auth_key: String) -> Self
    where
        S: Into<String>,
    {
        Self {
            client,
            base_url: base_url.into(),
            chat_id,
            auth_key,
        }
    }

    fn payload(&self, event: &NotificationEvent) -> SendMessage<'_> {
        SendMessage {
            chat_id: &self.chat_id,
            text: template::markdown(event),
            parse_mode: "MarkdownV2",
            disable_web_page_preview: true,
        }
    }
}

#[async_trait]
impl Notifier for Telegram {
    async fn send(&self, event: &NotificationEvent) -> Result<(), Error> {
        let payload = self.payload(event);
        log::debug!("Telegram payload: {:?}", payload);

        let url: String = format!("{}/bot{}/sendMessage", self.base_url, self.auth_key);

        // Strip the url from errors, it carries the auth key
        self.client
            .post(url)
            .json(&payload)
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| Error::Telegram(e.without_url()))?;

        Ok(())
    }
}
