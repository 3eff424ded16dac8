use crate::core::errors::FinanceError;
use crate::core::models::message::OutgoingMessage;
use crate::infrastructure::delivery::Delivery;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Records every message instead of sending it. Endpoints registered with
/// [`InMemoryDelivery::fail_endpoint`] reject their messages.
#[derive(Clone, Default)]
pub struct InMemoryDelivery {
    sent: Arc<RwLock<Vec<(String, OutgoingMessage)>>>,
    failing: Arc<RwLock<HashSet<String>>>,
}

impl InMemoryDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_endpoint(&self, endpoint: &str) {
        self.failing.write().await.insert(endpoint.to_string());
    }

    pub async fn sent(&self) -> Vec<(String, OutgoingMessage)> {
        self.sent.read().await.clone()
    }

    pub async fn sent_to(&self, endpoint: &str) -> Vec<OutgoingMessage> {
        self.sent
            .read()
            .await
            .iter()
            .filter(|(to, _)| to == endpoint)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

#[async_trait]
impl Delivery for InMemoryDelivery {
    async fn send(&self, endpoint: &str, message: &OutgoingMessage) -> Result<(), FinanceError> {
        if self.failing.read().await.contains(endpoint) {
            return Err(FinanceError::DeliveryError(format!("Endpoint {} unreachable", endpoint)));
        }
        self.sent.write().await.push((endpoint.to_string(), message.clone()));
        Ok(())
    }
}
