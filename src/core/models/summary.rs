use crate::core::errors::FinanceError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Categories {
    pub income: BTreeSet<String>,
    pub expense: BTreeSet<String>,
}

impl Categories {
    pub fn is_empty(&self) -> bool {
        self.income.is_empty() && self.expense.is_empty()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MonthlySummary {
    #[schema(value_type = String, example = "1000.00")]
    pub income_total: Decimal,
    #[schema(value_type = String, example = "400.00")]
    pub expense_total: Decimal,
    #[schema(value_type = String, example = "600.00")]
    pub net: Decimal,
    pub count: usize,
}

/// Adds `amount` to a running total without overflowing.
pub fn add_amount(total: Decimal, amount: Decimal) -> Result<Decimal, FinanceError> {
    total
        .checked_add(amount)
        .ok_or_else(|| FinanceError::AmountOverflow(format!("{} + {}", total, amount)))
}

pub fn net_amount(income: Decimal, expense: Decimal) -> Result<Decimal, FinanceError> {
    income
        .checked_sub(expense)
        .ok_or_else(|| FinanceError::AmountOverflow(format!("{} - {}", income, expense)))
}
