use crate::core::clock::Clock;
use crate::core::constants::{TRANSACTION_CREATED, TRANSACTION_PAID, USER_REGISTERED};
use crate::core::errors::FinanceError;
use crate::core::flows::TransactionDraft;
use crate::core::models::{
    audit::AppLog,
    summary::{Categories, MonthlySummary},
    transaction::{Transaction, TransactionFilter, TransactionKind, TransactionStatus},
    user::User,
};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

pub struct FinanceService<L: LoggingService, S: Storage> {
    storage: S,
    logging: L,
    clock: Arc<dyn Clock>,
}

impl<L: LoggingService, S: Storage> FinanceService<L, S> {
    pub fn new(storage: S, logging: L, clock: Arc<dyn Clock>) -> Self {
        FinanceService { storage, logging, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    async fn log_and_audit(
        &self,
        action: &str,
        log_details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), FinanceError> {
        self.logging.log_action(action, log_details, user_id).await
    }

    /// Audit failures after a committed write are reported but not surfaced.
    async fn audit_committed(&self, action: &str, log_details: serde_json::Value, user_id: &str) {
        if let Err(e) = self.log_and_audit(action, log_details, Some(user_id)).await {
            warn!(action, user_id = %user_id, error = %e, "Failed to write audit log");
        }
    }

    /// Creates the user on first contact; afterwards only refreshes the endpoint.
    pub async fn register_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        endpoint: Option<&str>,
    ) -> Result<bool, FinanceError> {
        let created = self
            .storage
            .create_user(user_id, display_name, endpoint, self.clock.now())
            .await?;
        if created {
            info!(user_id = %user_id, "Registered new user");
            self.audit_committed(
                USER_REGISTERED,
                json!({ "user_id": user_id, "display_name": display_name, "endpoint": endpoint }),
                user_id,
            )
            .await;
        }
        Ok(created)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, FinanceError> {
        self.storage.get_user(user_id).await
    }

    pub async fn record_transaction(&self, user_id: &str, draft: TransactionDraft) -> Result<Transaction, FinanceError> {
        let new_transaction = draft.into_new_transaction(user_id, self.clock.now());
        let id = self.storage.create_transaction(new_transaction.clone()).await?;
        let transaction = new_transaction.into_transaction(id);

        info!(
            user_id = %user_id,
            transaction_id = %transaction.id,
            kind = %transaction.kind,
            "Recorded transaction"
        );
        self.audit_committed(
            TRANSACTION_CREATED,
            json!({
                "transaction_id": transaction.id,
                "kind": transaction.kind,
                "category": transaction.category,
                "amount": transaction.amount,
                "due_date": transaction.due_date,
                "installments": transaction.installment.as_ref().map(|i| i.total_installments),
            }),
            user_id,
        )
        .await;
        Ok(transaction)
    }

    /// An open expense owned by `user_id`. Another user's transaction is
    /// reported as not found.
    pub async fn find_payable(&self, user_id: &str, transaction_id: &str) -> Result<Transaction, FinanceError> {
        let transaction = self
            .storage
            .get_transaction(transaction_id)
            .await?
            .filter(|t| t.user_id == user_id)
            .ok_or_else(|| FinanceError::TransactionNotFound(transaction_id.to_string()))?;
        if transaction.kind != TransactionKind::Expense {
            return Err(FinanceError::NotAnExpense(transaction_id.to_string()));
        }
        if transaction.status == TransactionStatus::Paid {
            return Err(FinanceError::TransactionAlreadyPaid(transaction_id.to_string()));
        }
        Ok(transaction)
    }

    /// Returns whether a record was modified. Unknown ids, foreign
    /// transactions and repeated payments all yield `false`.
    pub async fn mark_paid(&self, user_id: &str, transaction_id: &str, paid_on: NaiveDate) -> Result<bool, FinanceError> {
        let owned = self
            .storage
            .get_transaction(transaction_id)
            .await?
            .is_some_and(|t| t.user_id == user_id);
        if !owned {
            return Ok(false);
        }
        let modified = self
            .storage
            .update_transaction_status(transaction_id, TransactionStatus::Paid, Some(paid_on), self.clock.now())
            .await?;
        if modified {
            info!(user_id = %user_id, transaction_id = %transaction_id, "Marked transaction as paid");
            self.audit_committed(
                TRANSACTION_PAID,
                json!({ "transaction_id": transaction_id, "payment_date": paid_on }),
                user_id,
            )
            .await;
        }
        Ok(modified)
    }

    pub async fn list_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, FinanceError> {
        self.storage.get_transactions(user_id, filter).await
    }

    pub async fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<Transaction>, FinanceError> {
        let mut transactions = self.storage.get_transactions(user_id, &TransactionFilter::default()).await?;
        transactions.truncate(limit);
        Ok(transactions)
    }

    pub async fn open_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, FinanceError> {
        self.storage.get_transactions(user_id, &TransactionFilter::open()).await
    }

    pub async fn categories(&self, user_id: &str) -> Result<Categories, FinanceError> {
        self.storage.get_categories(user_id).await
    }

    pub async fn monthly_report(&self, user_id: &str, year: i32, month: u32) -> Result<MonthlySummary, FinanceError> {
        self.storage.get_monthly_summary(user_id, year, month).await
    }

    /// Open expenses due on or before `today + days_ahead`.
    pub async fn due_transactions(&self, days_ahead: i64) -> Result<Vec<Transaction>, FinanceError> {
        self.storage.get_due_transactions(self.clock.today(), days_ahead).await
    }

    pub async fn user_ids_with_transactions(&self) -> Result<Vec<String>, FinanceError> {
        self.storage.get_user_ids_with_transactions().await
    }

    pub async fn transactions_created_since(&self, since: DateTime<Utc>) -> Result<Vec<Transaction>, FinanceError> {
        self.storage.get_transactions_created_since(since).await
    }

    pub async fn record_audit(
        &self,
        action: &str,
        log_details: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(), FinanceError> {
        self.log_and_audit(action, log_details, user_id).await
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, FinanceError> {
        self.logging.get_logs().await
    }
}
