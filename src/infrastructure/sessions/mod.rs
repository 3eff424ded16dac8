pub mod in_memory;
pub mod session_keys;

use crate::core::errors::FinanceError;
use crate::core::flows::Session;
use async_trait::async_trait;

/// Per-user conversation state between turns. At most one session per user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save(&self, user_id: &str, session: Session) -> Result<(), FinanceError>;
    /// Removes and returns the user's session.
    async fn take(&self, user_id: &str) -> Result<Option<Session>, FinanceError>;
    async fn get(&self, user_id: &str) -> Result<Option<Session>, FinanceError>;
}
