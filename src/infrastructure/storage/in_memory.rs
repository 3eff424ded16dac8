use crate::core::errors::FinanceError;
use crate::core::models::{
    summary::{Categories, MonthlySummary, add_amount, net_amount},
    transaction::{NewTransaction, Transaction, TransactionFilter, TransactionKind, TransactionStatus},
    user::User,
};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Transactions are kept in insertion order so queries that don't sort return
/// records in the order they were created.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn month_bounds(year: i32, month: u32) -> Result<(DateTime<Utc>, DateTime<Utc>), FinanceError> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| FinanceError::invalid_input("month", "Invalid month", format!("{}/{} is not a month", month, year)))?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| FinanceError::invalid_input("month", "Invalid month", "Month is out of range"))?;
    Ok((
        start.and_time(NaiveTime::MIN).and_utc(),
        end.and_time(NaiveTime::MIN).and_utc(),
    ))
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
        endpoint: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<bool, FinanceError> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.get_mut(user_id) {
            if let Some(endpoint) = endpoint {
                if existing.endpoint.as_deref() != Some(endpoint) {
                    existing.endpoint = Some(endpoint.to_string());
                }
            }
            return Ok(false);
        }
        users.insert(
            user_id.to_string(),
            User {
                id: user_id.to_string(),
                display_name: display_name.map(String::from),
                endpoint: endpoint.map(String::from),
                created_at,
            },
        );
        Ok(true)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, FinanceError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn create_transaction(&self, transaction: NewTransaction) -> Result<String, FinanceError> {
        let id = Uuid::new_v4().to_string();
        let mut transactions = self.transactions.write().await;
        transactions.push(transaction.into_transaction(id.clone()));
        Ok(id)
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>, FinanceError> {
        let transactions = self.transactions.read().await;
        Ok(transactions.iter().find(|t| t.id == transaction_id).cloned())
    }

    async fn get_transactions(
        &self,
        user_id: &str,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, FinanceError> {
        let transactions = self.transactions.read().await;
        let mut found: Vec<Transaction> = transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id && filter.matches(t))
            .cloned()
            .collect();
        // stable: equal timestamps keep reverse insertion order
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn update_transaction_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
        payment_date: Option<NaiveDate>,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, FinanceError> {
        let mut transactions = self.transactions.write().await;
        let Some(transaction) = transactions.iter_mut().find(|t| t.id == transaction_id) else {
            return Ok(false);
        };
        if transaction.status == status {
            return Ok(false);
        }
        transaction.status = status;
        if payment_date.is_some() {
            transaction.payment_date = payment_date;
        }
        transaction.updated_at = updated_at;
        Ok(true)
    }

    async fn get_due_transactions(&self, today: NaiveDate, days_ahead: i64) -> Result<Vec<Transaction>, FinanceError> {
        let cutoff = Duration::try_days(days_ahead)
            .and_then(|window| today.checked_add_signed(window))
            .ok_or_else(|| {
                FinanceError::invalid_input(
                    "days_ahead",
                    "Invalid window",
                    format!("{} days ahead of {} is out of range", days_ahead, today),
                )
            })?;
        let transactions = self.transactions.read().await;
        Ok(transactions
            .iter()
            .filter(|t| t.kind == TransactionKind::Expense && t.is_open() && t.due_date <= cutoff)
            .cloned()
            .collect())
    }

    async fn get_categories(&self, user_id: &str) -> Result<Categories, FinanceError> {
        let transactions = self.transactions.read().await;
        let mut categories = Categories::default();
        for t in transactions.iter().filter(|t| t.user_id == user_id) {
            match t.kind {
                TransactionKind::Income => categories.income.insert(t.category.clone()),
                TransactionKind::Expense => categories.expense.insert(t.category.clone()),
            };
        }
        Ok(categories)
    }

    async fn get_monthly_summary(&self, user_id: &str, year: i32, month: u32) -> Result<MonthlySummary, FinanceError> {
        let (start, end) = month_bounds(year, month)?;
        let transactions = self.transactions.read().await;
        let mut summary = MonthlySummary::default();
        for t in transactions
            .iter()
            .filter(|t| t.user_id == user_id && t.created_at >= start && t.created_at < end)
        {
            match t.kind {
                TransactionKind::Income => summary.income_total = add_amount(summary.income_total, t.amount)?,
                TransactionKind::Expense => summary.expense_total = add_amount(summary.expense_total, t.amount)?,
            }
            summary.count += 1;
        }
        summary.net = net_amount(summary.income_total, summary.expense_total)?;
        Ok(summary)
    }

    async fn get_user_ids_with_transactions(&self) -> Result<Vec<String>, FinanceError> {
        let transactions = self.transactions.read().await;
        let mut seen: Vec<String> = Vec::new();
        for t in transactions.iter() {
            if !seen.contains(&t.user_id) {
                seen.push(t.user_id.clone());
            }
        }
        Ok(seen)
    }

    async fn get_transactions_created_since(&self, since: DateTime<Utc>) -> Result<Vec<Transaction>, FinanceError> {
        let transactions = self.transactions.read().await;
        Ok(transactions.iter().filter(|t| t.created_at >= since).cloned().collect())
    }
}
