use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Open,
    Paid,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionStatus::Open => "open",
            TransactionStatus::Paid => "paid",
        };
        write!(f, "{}", s)
    }
}

/// One slice of a multi-payment purchase. `current_installment` is fixed at 1
/// when the record is created and is never advanced.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct InstallmentInfo {
    pub total_installments: u32,
    pub current_installment: u32,
    #[schema(value_type = String, example = "100.00")]
    pub installment_amount: Decimal,
}

impl InstallmentInfo {
    pub fn first_of(total_installments: u32, installment_amount: Decimal) -> Self {
        InstallmentInfo {
            total_installments,
            current_installment: 1,
            installment_amount,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    #[schema(value_type = String, example = "150.50")]
    pub amount: Decimal,
    #[schema(value_type = String, example = "2024-12-25")]
    pub due_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "2024-12-26")]
    pub payment_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    pub installment: Option<InstallmentInfo>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn is_installment(&self) -> bool {
        self.installment.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.status == TransactionStatus::Open
    }
}

/// Insert payload handed to the storage gateway; the gateway assigns the id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTransaction {
    pub user_id: String,
    pub kind: TransactionKind,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub installment: Option<InstallmentInfo>,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    pub fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            user_id: self.user_id,
            kind: self.kind,
            category: self.category,
            description: self.description,
            amount: self.amount,
            due_date: self.due_date,
            payment_date: None,
            status: TransactionStatus::Open,
            installment: self.installment,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub category: Option<String>,
}

impl TransactionFilter {
    pub fn open() -> Self {
        TransactionFilter {
            status: Some(TransactionStatus::Open),
            ..Default::default()
        }
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.kind.is_none_or(|k| k == tx.kind)
            && self.status.is_none_or(|s| s == tx.status)
            && self.category.as_deref().is_none_or(|c| c == tx.category)
    }
}
