use crate::core::errors::FinanceError;
use crate::core::flows::Session;
use crate::infrastructure::sessions::{SessionStore, session_keys::session_key};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save(&self, user_id: &str, session: Session) -> Result<(), FinanceError> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session_key(user_id), session);
        Ok(())
    }

    async fn take(&self, user_id: &str) -> Result<Option<Session>, FinanceError> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.remove(&session_key(user_id)))
    }

    async fn get(&self, user_id: &str) -> Result<Option<Session>, FinanceError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&session_key(user_id)).cloned())
    }
}
