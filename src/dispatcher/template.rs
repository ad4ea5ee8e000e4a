// Copyright (c) 2021-2024 Yuki Kishimoto
// Distributed under the MIT software license

use crate::primitives::NotificationEvent;

const MARKDOWN_SPECIAL_CHARS: &[char] = &[
    '\\', '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

struct Message {
    title: String,
    fields: Vec<(&'static str, String)>,
}

fn with_fiat(amount: &str, fiat: &Option<String>) -> String {
    match fiat {
        Some(fiat) => format!("{} ({})", amount, fiat),
        None => amount.to_string(),
    }
}

fn message(event: &NotificationEvent) -> Message {
    match event {
        NotificationEvent::BlockMined(block) => Message {
            title: format!("⛏️ New block mined by {} ⛏️", block.pool),
            fields: vec![
                ("Number", block.number.to_string()),
                ("Hash", block.hash.clone()),
                ("Reward", with_fiat(&block.reward, &block.reward_fiat)),
                ("Time", block.time.clone()),
                ("Round time", block.round_time.clone()),
                ("Luck", block.luck.clone()),
            ],
        },
        NotificationEvent::BalanceChanged(balance) => {
            let mut fields = vec![
                ("Address", balance.address.clone()),
                ("Balance", with_fiat(&balance.balance, &balance.balance_fiat)),
            ];
            if let Some(percentage) = &balance.balance_percentage {
                fields.push(("Payout threshold", percentage.clone()));
            }
            fields.push(("Dashboard", balance.url.clone()));
            Message {
                title: format!("💰 Balance updated on {} 💰", balance.pool),
                fields,
            }
        }
        NotificationEvent::PaymentReceived(payment) => Message {
            title: format!("💸 Payment received from {} 💸", payment.pool),
            fields: vec![
                ("Address", payment.address.clone()),
                ("Amount", with_fiat(&payment.amount, &payment.amount_fiat)),
                ("Transaction", payment.txid.clone()),
                ("Time", payment.time.clone()),
                ("Duration", payment.duration.clone()),
            ],
        },
    }
}

pub fn markdown_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if MARKDOWN_SPECIAL_CHARS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn title(event: &NotificationEvent) -> String {
    message(event).title
}

pub fn plain_text(event: &NotificationEvent) -> String {
    let message = message(event);
    let mut text = message.title;
    for (label, value) in message.fields.iter() {
        text.push_str(&format!("\n{}: {}", label, value));
    }
    text
}

/// Telegram MarkdownV2 rendering
pub fn markdown(event: &NotificationEvent) -> String {
    let message = message(event);
    let mut text = format!("*{}*", markdown_escape(&message.title));
    for (label, value) in message.fields.iter() {
        text.push_str(&format!(
            "\n_{}_: {}",
            markdown_escape(label),
            markdown_escape(value)
        ));
    }
    text
}
