use crate::core::constants::MAX_AMOUNT;
use crate::core::errors::FinanceError;
use chrono::{NaiveDate, NaiveTime, Weekday};
use rust_decimal::Decimal;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%d/%m/%Y";
const TODAY_LITERALS: [&str; 2] = ["hoje", "today"];

/// Parses a monetary amount, accepting either `.` or `,` as decimal separator.
pub fn parse_amount(input: &str) -> Result<Decimal, FinanceError> {
    let normalized = input.trim().replace(',', ".");
    let amount = Decimal::from_str(&normalized).map_err(|_| {
        FinanceError::invalid_input(
            "amount",
            "Invalid amount",
            format!("`{}` is not a number", input.trim()),
        )
    })?;
    if amount.abs() > Decimal::from(MAX_AMOUNT) {
        return Err(FinanceError::invalid_input(
            "amount",
            "Amount too large",
            format!("Amounts are limited to {}", MAX_AMOUNT),
        ));
    }
    Ok(amount)
}

/// Parses `dd/mm/yyyy` or the literal `hoje`/`today`, which resolves to `today`.
/// Callers pass the date the input was received.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate, FinanceError> {
    let normalized = input.trim().to_lowercase();
    if TODAY_LITERALS.contains(&normalized.as_str()) {
        return Ok(today);
    }
    NaiveDate::parse_from_str(&normalized, DATE_FORMAT).map_err(|_| {
        FinanceError::invalid_input(
            "date",
            "Invalid date",
            format!("`{}` is not a dd/mm/yyyy date", input.trim()),
        )
    })
}

pub fn parse_installment_count(input: &str) -> Result<u32, FinanceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FinanceError::invalid_input(
            "installments",
            "Missing installments",
            "Installment count cannot be empty",
        ));
    }
    match trimmed.parse::<i64>() {
        Ok(count) if count > 0 => u32::try_from(count).map_err(|_| {
            FinanceError::invalid_input("installments", "Invalid installments", "Installment count is too large")
        }),
        Ok(_) => Err(FinanceError::invalid_input(
            "installments",
            "Invalid installments",
            "Installment count must be positive",
        )),
        Err(_) => Err(FinanceError::invalid_input(
            "installments",
            "Invalid installments",
            format!("`{}` is not an integer", trimmed),
        )),
    }
}

/// `HH:MM`, used by the scheduler configuration.
pub fn parse_time_of_day(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M").ok()
}

pub fn parse_weekday(input: &str) -> Option<Weekday> {
    input.trim().parse::<Weekday>().ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `R$ 1234.50`: always two decimal places.
pub fn format_money(amount: Decimal) -> String {
    format!("R$ {:.2}", amount)
}
