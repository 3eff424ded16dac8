pub mod in_memory;

use crate::core::errors::FinanceError;
use crate::core::models::audit::AppLog;
use async_trait::async_trait;

/// Audit trail of business actions, separate from operational tracing.
#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn log_action(
        &self,
        action: &str,
        details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), FinanceError>;
    async fn get_logs(&self) -> Result<Vec<AppLog>, FinanceError>;
}
