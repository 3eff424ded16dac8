mod notification_tests;
mod scheduler_tests;

use crate::core::clock::{Clock, FixedClock};
use crate::core::conversation::ConversationService;
use crate::core::errors::FinanceError;
use crate::core::flows::TransactionDraft;
use crate::core::models::message::{IncomingUpdate, OutgoingMessage, UserInput};
use crate::core::models::summary::{Categories, MonthlySummary};
use crate::core::models::transaction::{NewTransaction, Transaction, TransactionFilter, TransactionKind, TransactionStatus};
use crate::core::models::user::User;
use crate::core::notifications::{NotificationService, NotificationSettings};
use crate::core::services::FinanceService;
use crate::infrastructure::delivery::in_memory::InMemoryDelivery;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::sessions::in_memory::InMemorySessionStore;
use crate::infrastructure::storage::Storage;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub struct TestContext<S: Storage + Clone = InMemoryStorage> {
    pub storage: S,
    pub logging: InMemoryLogging,
    pub sessions: InMemorySessionStore,
    pub delivery: InMemoryDelivery,
    pub clock: Arc<FixedClock>,
    pub finance: Arc<FinanceService<InMemoryLogging, S>>,
    pub conversations: ConversationService<InMemoryLogging, S, InMemorySessionStore>,
    pub notifications: NotificationService<InMemoryLogging, S>,
}

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Friday 2024-03-15, noon.
pub fn test_today() -> NaiveDate {
    day(2024, 3, 15)
}

pub fn create_test_context() -> TestContext {
    create_test_context_with(InMemoryStorage::new())
}

pub fn create_test_context_with<S: Storage + Clone>(storage: S) -> TestContext<S> {
    let logging = InMemoryLogging::new();
    let sessions = InMemorySessionStore::new();
    let delivery = InMemoryDelivery::new();
    let clock = Arc::new(FixedClock::at(test_today()));
    let dyn_clock: Arc<dyn Clock> = clock.clone();
    let finance = Arc::new(FinanceService::new(storage.clone(), logging.clone(), dyn_clock));
    let conversations = ConversationService::new(finance.clone(), sessions.clone(), Arc::new(delivery.clone()));
    let notifications = NotificationService::new(
        finance.clone(),
        Arc::new(delivery.clone()),
        NotificationSettings {
            days_ahead: 3,
            due_delay: Duration::ZERO,
            summary_delay: Duration::ZERO,
        },
    );
    TestContext {
        storage,
        logging,
        sessions,
        delivery,
        clock,
        finance,
        conversations,
        notifications,
    }
}

impl<S: Storage + Clone> TestContext<S> {
    /// Sends a chat message from `user_id`, whose endpoint is the user id itself.
    pub async fn say(&self, user_id: &str, text: &str) -> OutgoingMessage {
        self.conversations
            .handle(IncomingUpdate {
                user_id: user_id.to_string(),
                display_name: Some(format!("User {}", user_id)),
                endpoint: Some(user_id.to_string()),
                input: UserInput::parse_text(text),
            })
            .await
    }

    pub async fn choose(&self, user_id: &str, value: &str) -> OutgoingMessage {
        self.conversations
            .handle(IncomingUpdate {
                user_id: user_id.to_string(),
                display_name: None,
                endpoint: Some(user_id.to_string()),
                input: UserInput::Choice(value.to_string()),
            })
            .await
    }

    pub async fn say_all(&self, user_id: &str, lines: &[&str]) -> Vec<OutgoingMessage> {
        let mut replies = Vec::new();
        for line in lines {
            replies.push(self.say(user_id, line).await);
        }
        replies
    }

    pub async fn register(&self, user_id: &str, endpoint: Option<&str>) {
        self.finance.register_user(user_id, None, endpoint).await.unwrap();
    }

    /// Records a transaction directly through the service.
    pub async fn record(
        &self,
        user_id: &str,
        kind: TransactionKind,
        category: &str,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Transaction {
        self.finance
            .record_transaction(
                user_id,
                TransactionDraft {
                    kind,
                    category: category.to_string(),
                    description: format!("{} {}", category, amount),
                    amount,
                    due_date,
                    installment: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn all_transactions(&self, user_id: &str) -> Vec<Transaction> {
        self.storage
            .get_transactions(user_id, &TransactionFilter::default())
            .await
            .unwrap()
    }

    pub async fn audit_actions(&self) -> Vec<String> {
        self.finance
            .get_app_logs()
            .await
            .unwrap()
            .into_iter()
            .map(|log| log.action)
            .collect()
    }
}

/// In-memory storage whose inserts or batch queries can be made to fail.
#[derive(Clone, Default)]
pub struct FlakyStorage {
    inner: InMemoryStorage,
    fail_inserts: Arc<AtomicBool>,
    fail_queries: Arc<AtomicBool>,
    insert_attempts: Arc<AtomicUsize>,
}

impl FlakyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_inserts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    fn check_query(&self) -> Result<(), FinanceError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(FinanceError::StorageError("query failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn create_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        endpoint: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<bool, FinanceError> {
        self.inner.create_user(user_id, display_name, endpoint, created_at).await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, FinanceError> {
        self.inner.get_user(user_id).await
    }

    async fn create_transaction(&self, transaction: NewTransaction) -> Result<String, FinanceError> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(FinanceError::StorageError("insert failed".to_string()));
        }
        self.inner.create_transaction(transaction).await
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>, FinanceError> {
        self.inner.get_transaction(transaction_id).await
    }

    async fn get_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, FinanceError> {
        self.inner.get_transactions(user_id, filter).await
    }

    async fn update_transaction_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
        payment_date: Option<NaiveDate>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, FinanceError> {
        self.inner
            .update_transaction_status(transaction_id, status, payment_date, updated_at)
            .await
    }

    async fn get_due_transactions(&self, today: NaiveDate, days_ahead: i64) -> Result<Vec<Transaction>, FinanceError> {
        self.check_query()?;
        self.inner.get_due_transactions(today, days_ahead).await
    }

    async fn get_categories(&self, user_id: &str) -> Result<Categories, FinanceError> {
        self.inner.get_categories(user_id).await
    }

    async fn get_monthly_summary(&self, user_id: &str, year: i32, month: u32) -> Result<MonthlySummary, FinanceError> {
        self.inner.get_monthly_summary(user_id, year, month).await
    }

    async fn get_user_ids_with_transactions(&self) -> Result<Vec<String>, FinanceError> {
        self.check_query()?;
        self.inner.get_user_ids_with_transactions().await
    }

    async fn get_transactions_created_since(&self, since: DateTime<Utc>) -> Result<Vec<Transaction>, FinanceError> {
        self.check_query()?;
        self.inner.get_transactions_created_since(since).await
    }
}
