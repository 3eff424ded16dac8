pub mod in_memory;
pub mod telegram;

use crate::core::errors::FinanceError;
use crate::core::models::message::OutgoingMessage;
use async_trait::async_trait;

/// Outbound channel to a user's endpoint. Failures are reported, never retried.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn send(&self, endpoint: &str, message: &OutgoingMessage) -> Result<(), FinanceError>;
}
