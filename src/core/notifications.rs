//! Scheduled notification jobs. Each job body is an ordinary async method so
//! it can be run by the scheduler, the HTTP surface or a test alike.

use crate::core::constants::{
    DAILY_SUMMARY_DUE_TODAY_LIMIT, DEFAULT_DUE_DAYS_AHEAD, DEFAULT_DUE_NOTIFICATION_DELAY_MS,
    DEFAULT_SUMMARY_DELAY_MS, NOTIFICATION_JOB_COMPLETED, WEEKLY_REPORT_WINDOW_DAYS,
};
use crate::core::errors::FinanceError;
use crate::core::messages;
use crate::core::models::message::OutgoingMessage;
use crate::core::models::summary::{add_amount, net_amount};
use crate::core::models::transaction::{Transaction, TransactionKind};
use crate::core::services::FinanceService;
use crate::infrastructure::delivery::Delivery;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::{Duration as ChronoDuration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DueStatus {
    Overdue { days: i64 },
    DueToday,
    DueTomorrow,
    Upcoming { days: i64 },
}

impl DueStatus {
    pub fn classify(due_date: NaiveDate, today: NaiveDate) -> Self {
        match (due_date - today).num_days() {
            days if days < 0 => DueStatus::Overdue { days: -days },
            0 => DueStatus::DueToday,
            1 => DueStatus::DueTomorrow,
            days => DueStatus::Upcoming { days },
        }
    }
}

/// Open position of one user, sent every morning.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DailyDigest {
    pub open_income_count: usize,
    pub open_income_total: Decimal,
    pub open_expense_count: usize,
    pub open_expense_total: Decimal,
    pub due_today_count: usize,
    /// Category and amount of the first expenses due today.
    pub due_today: Vec<(String, Decimal)>,
    pub due_today_overflow: usize,
}

impl DailyDigest {
    pub fn from_open(open: &[Transaction], today: NaiveDate) -> Result<Self, FinanceError> {
        let mut digest = DailyDigest::default();
        for t in open.iter().filter(|t| t.is_open()) {
            match t.kind {
                TransactionKind::Income => {
                    digest.open_income_count += 1;
                    digest.open_income_total = add_amount(digest.open_income_total, t.amount)?;
                }
                TransactionKind::Expense => {
                    digest.open_expense_count += 1;
                    digest.open_expense_total = add_amount(digest.open_expense_total, t.amount)?;
                    if t.due_date == today {
                        digest.due_today_count += 1;
                        if digest.due_today.len() < DAILY_SUMMARY_DUE_TODAY_LIMIT {
                            digest.due_today.push((t.category.clone(), t.amount));
                        }
                    }
                }
            }
        }
        digest.due_today_overflow = digest.due_today_count - digest.due_today.len();
        Ok(digest)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeeklyStats {
    pub income_count: usize,
    pub expense_count: usize,
    pub income_total: Decimal,
    pub expense_total: Decimal,
    pub net: Decimal,
    /// Most used category and its number of uses. Ties go to the
    /// lexicographically smallest name.
    pub top_category: Option<(String, usize)>,
}

impl WeeklyStats {
    pub fn from_transactions(transactions: &[Transaction]) -> Result<Self, FinanceError> {
        let mut stats = WeeklyStats::default();
        let mut uses: BTreeMap<&str, usize> = BTreeMap::new();
        for t in transactions {
            match t.kind {
                TransactionKind::Income => {
                    stats.income_count += 1;
                    stats.income_total = add_amount(stats.income_total, t.amount)?;
                }
                TransactionKind::Expense => {
                    stats.expense_count += 1;
                    stats.expense_total = add_amount(stats.expense_total, t.amount)?;
                }
            }
            *uses.entry(t.category.as_str()).or_insert(0) += 1;
        }
        stats.net = net_amount(stats.income_total, stats.expense_total)?;
        for (category, count) in uses {
            if stats.top_category.as_ref().is_none_or(|(_, best)| count > *best) {
                stats.top_category = Some((category.to_string(), count));
            }
        }
        Ok(stats)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Job {
    DueCheck,
    DailySummary,
    WeeklyReport,
}

impl Job {
    pub fn as_str(&self) -> &'static str {
        match self {
            Job::DueCheck => "due-check",
            Job::DailySummary => "daily-summary",
            Job::WeeklyReport => "weekly-report",
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Job {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "due-check" => Ok(Job::DueCheck),
            "daily-summary" => Ok(Job::DailySummary),
            "weekly-report" => Ok(Job::WeeklyReport),
            other => Err(FinanceError::invalid_input(
                "job",
                "Unknown job",
                format!("`{}` is not one of due-check, daily-summary, weekly-report", other),
            )),
        }
    }
}

/// Outcome counters of one job run.
#[derive(Clone, Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct JobReport {
    pub job: Job,
    pub sent: usize,
    /// Recipients without a user record or endpoint.
    pub skipped: usize,
    pub failed: usize,
}

impl JobReport {
    fn new(job: Job) -> Self {
        JobReport {
            job,
            sent: 0,
            skipped: 0,
            failed: 0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NotificationSettings {
    pub days_ahead: i64,
    pub due_delay: Duration,
    pub summary_delay: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            days_ahead: DEFAULT_DUE_DAYS_AHEAD,
            due_delay: Duration::from_millis(DEFAULT_DUE_NOTIFICATION_DELAY_MS),
            summary_delay: Duration::from_millis(DEFAULT_SUMMARY_DELAY_MS),
        }
    }
}

pub struct NotificationService<L: LoggingService, S: Storage> {
    finance: Arc<FinanceService<L, S>>,
    delivery: Arc<dyn Delivery>,
    settings: NotificationSettings,
}

impl<L: LoggingService, S: Storage> NotificationService<L, S> {
    pub fn new(finance: Arc<FinanceService<L, S>>, delivery: Arc<dyn Delivery>, settings: NotificationSettings) -> Self {
        NotificationService {
            finance,
            delivery,
            settings,
        }
    }

    pub async fn run(&self, job: Job) -> Result<JobReport, FinanceError> {
        let report = match job {
            Job::DueCheck => self.check_due_transactions().await?,
            Job::DailySummary => self.send_daily_summary().await?,
            Job::WeeklyReport => self.send_weekly_report().await?,
        };
        info!(
            job = %job,
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            "Notification job finished"
        );
        if let Err(e) = self
            .finance
            .record_audit(NOTIFICATION_JOB_COMPLETED, json!(report), None)
            .await
        {
            warn!(job = %job, error = %e, "Failed to write audit log");
        }
        Ok(report)
    }

    /// One reminder per open expense due within the configured window, in
    /// query order.
    pub async fn check_due_transactions(&self) -> Result<JobReport, FinanceError> {
        let today = self.finance.today();
        let due = self.finance.due_transactions(self.settings.days_ahead).await?;
        debug!(count = due.len(), "Due-check found transactions");

        let mut report = JobReport::new(Job::DueCheck);
        let mut endpoints = EndpointCache::default();
        for transaction in &due {
            let Some(endpoint) = endpoints.resolve(&self.finance, &transaction.user_id).await? else {
                report.skipped += 1;
                continue;
            };
            let status = DueStatus::classify(transaction.due_date, today);
            let message = OutgoingMessage::text(messages::due_notification(transaction, status));
            self.deliver(&mut report, &endpoint, &message, self.settings.due_delay).await;
        }
        Ok(report)
    }

    pub async fn send_daily_summary(&self) -> Result<JobReport, FinanceError> {
        let today = self.finance.today();
        let mut report = JobReport::new(Job::DailySummary);
        for user_id in self.finance.user_ids_with_transactions().await? {
            let open = self.finance.open_transactions(&user_id).await?;
            if open.is_empty() {
                continue;
            }
            let Some(endpoint) = self.finance.get_user(&user_id).await?.and_then(|u| u.endpoint) else {
                report.skipped += 1;
                continue;
            };
            let digest = match DailyDigest::from_open(&open, today) {
                Ok(digest) => digest,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Failed to build daily summary");
                    report.failed += 1;
                    continue;
                }
            };
            let message = OutgoingMessage::text(messages::daily_summary(&digest, today));
            self.deliver(&mut report, &endpoint, &message, self.settings.summary_delay)
                .await;
        }
        Ok(report)
    }

    /// Users are visited in the order their first transaction of the week
    /// appears.
    pub async fn send_weekly_report(&self) -> Result<JobReport, FinanceError> {
        let today = self.finance.today();
        let week_start = today - ChronoDuration::days(WEEKLY_REPORT_WINDOW_DAYS);
        let since = self.finance.now() - ChronoDuration::days(WEEKLY_REPORT_WINDOW_DAYS);
        let recent = self.finance.transactions_created_since(since).await?;

        let mut order: Vec<&str> = Vec::new();
        let mut by_user: HashMap<&str, Vec<Transaction>> = HashMap::new();
        for t in &recent {
            let entry = by_user.entry(t.user_id.as_str()).or_insert_with(|| {
                order.push(t.user_id.as_str());
                Vec::new()
            });
            entry.push(t.clone());
        }

        let mut report = JobReport::new(Job::WeeklyReport);
        for user_id in order {
            let Some(endpoint) = self.finance.get_user(user_id).await?.and_then(|u| u.endpoint) else {
                report.skipped += 1;
                continue;
            };
            let stats = match WeeklyStats::from_transactions(by_user.get(user_id).map(Vec::as_slice).unwrap_or_default()) {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Failed to build weekly report");
                    report.failed += 1;
                    continue;
                }
            };
            let message = OutgoingMessage::text(messages::weekly_report(&stats, week_start, today));
            self.deliver(&mut report, &endpoint, &message, self.settings.summary_delay)
                .await;
        }
        Ok(report)
    }

    /// Sends one message and waits `delay` before the next one. A failed send
    /// is counted and logged; the batch continues.
    async fn deliver(&self, report: &mut JobReport, endpoint: &str, message: &OutgoingMessage, delay: Duration) {
        match self.delivery.send(endpoint, message).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!(job = %report.job, endpoint = %endpoint, error = %e, "Failed to deliver notification");
                report.failed += 1;
            }
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Endpoint lookups memoised for the duration of one job run.
#[derive(Default)]
struct EndpointCache {
    resolved: HashMap<String, Option<String>>,
}

impl EndpointCache {
    async fn resolve<L: LoggingService, S: Storage>(
        &mut self,
        finance: &FinanceService<L, S>,
        user_id: &str,
    ) -> Result<Option<String>, FinanceError> {
        if let Some(endpoint) = self.resolved.get(user_id) {
            return Ok(endpoint.clone());
        }
        let endpoint = finance.get_user(user_id).await?.and_then(|u| u.endpoint);
        if endpoint.is_none() {
            debug!(user_id = %user_id, "No delivery endpoint, skipping");
        }
        self.resolved.insert(user_id.to_string(), endpoint.clone());
        Ok(endpoint)
    }
}
