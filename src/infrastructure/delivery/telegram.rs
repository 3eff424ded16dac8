//! Delivery through the Telegram Bot API.

use crate::core::errors::FinanceError;
use crate::core::models::message::OutgoingMessage;
use crate::infrastructure::delivery::Delivery;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::debug;

pub struct TelegramDelivery {
    client: Client,
    api_url: String,
    bot_token: String,
}

impl TelegramDelivery {
    pub fn new(api_url: String, bot_token: String) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token,
        }
    }

    /// `sendMessage` payload. Options become a one-button-per-row inline keyboard.
    pub fn payload(chat_id: &str, message: &OutgoingMessage) -> Value {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": message.text,
            "parse_mode": "Markdown",
        });
        if !message.options.is_empty() {
            let rows: Vec<Value> = message
                .options
                .iter()
                .map(|o| json!([{ "text": o.label, "callback_data": o.value }]))
                .collect();
            payload["reply_markup"] = json!({ "inline_keyboard": rows });
        }
        payload
    }
}

#[async_trait]
impl Delivery for TelegramDelivery {
    async fn send(&self, endpoint: &str, message: &OutgoingMessage) -> Result<(), FinanceError> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        let resp = self
            .client
            .post(&url)
            .json(&Self::payload(endpoint, message))
            .send()
            .await
            .map_err(|e| FinanceError::DeliveryError(format!("Failed to reach Telegram: {}", e)))?;

        let status = resp.status();
        if status.is_success() {
            debug!(chat_id = %endpoint, "Telegram message sent");
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(FinanceError::DeliveryError(format!(
            "Telegram API returned {}: {}",
            status, body
        )))
    }
}
