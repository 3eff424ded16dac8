use crate::core::errors::FinanceError;
use crate::core::models::{
    summary::{Categories, MonthlySummary},
    transaction::{NewTransaction, Transaction, TransactionFilter, TransactionStatus},
    user::User,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

/// Persistence gateway for users and transactions.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Returns `true` when the user did not exist yet. For an existing user the
    /// endpoint is updated in place if a different one is supplied.
    async fn create_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        endpoint: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<bool, FinanceError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, FinanceError>;
    /// Inserts the record and returns the identifier assigned to it.
    async fn create_transaction(&self, transaction: NewTransaction) -> Result<String, FinanceError>;
    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>, FinanceError>;
    /// Newest-created first.
    async fn get_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, FinanceError>;
    /// `true` iff a record was modified. A record already in `status` is left
    /// untouched.
    async fn update_transaction_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
        payment_date: Option<NaiveDate>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, FinanceError>;
    /// Open expenses due on or before `today + days_ahead`, in insertion order.
    async fn get_due_transactions(&self, today: NaiveDate, days_ahead: i64) -> Result<Vec<Transaction>, FinanceError>;
    async fn get_categories(&self, user_id: &str) -> Result<Categories, FinanceError>;
    /// Aggregates over transactions *created* in the given month.
    async fn get_monthly_summary(&self, user_id: &str, year: i32, month: u32) -> Result<MonthlySummary, FinanceError>;
    /// Distinct owners, in order of their first transaction.
    async fn get_user_ids_with_transactions(&self) -> Result<Vec<String>, FinanceError>;
    async fn get_transactions_created_since(&self, since: DateTime<Utc>) -> Result<Vec<Transaction>, FinanceError>;
}

pub mod in_memory;
