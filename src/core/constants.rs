// Audit actions
pub const USER_REGISTERED: &str = "USER_REGISTERED";
pub const TRANSACTION_CREATED: &str = "TRANSACTION_CREATED";
pub const TRANSACTION_PAID: &str = "TRANSACTION_PAID";
pub const NOTIFICATION_JOB_COMPLETED: &str = "NOTIFICATION_JOB_COMPLETED";

pub const DEFAULT_DUE_DAYS_AHEAD: i64 = 3;
pub const DEFAULT_DUE_NOTIFICATION_DELAY_MS: u64 = 500;
pub const DEFAULT_SUMMARY_DELAY_MS: u64 = 1000;
/// Largest amount, in either direction, a single entry may carry.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000;
pub const RECENT_TRANSACTIONS_LIMIT: usize = 10;
pub const DAILY_SUMMARY_DUE_TODAY_LIMIT: usize = 3;
pub const WEEKLY_REPORT_WINDOW_DAYS: i64 = 7;

// Option values sent back by the installment keyboard
pub const INSTALLMENT_YES: &str = "installment_yes";
pub const INSTALLMENT_NO: &str = "installment_no";
