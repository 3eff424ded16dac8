use crate::core::constants::{DEFAULT_DUE_DAYS_AHEAD, DEFAULT_DUE_NOTIFICATION_DELAY_MS, DEFAULT_SUMMARY_DELAY_MS};
use crate::core::notifications::NotificationSettings;
use crate::core::parsing::{parse_time_of_day, parse_weekday};
use crate::core::scheduler::Schedule;
use chrono::{NaiveTime, Weekday};
use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub telegram_bot_token: Option<String>,
    pub telegram_api_url: String,
    pub due_days_ahead: i64,
    pub due_check_times: Vec<NaiveTime>,
    pub daily_summary_time: NaiveTime,
    pub weekly_report_day: Weekday,
    pub weekly_report_time: NaiveTime,
    pub due_notification_delay_ms: u64,
    pub summary_delay_ms: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("telegram_bot_token", &self.telegram_bot_token.as_ref().map(|_| "<redacted>"))
            .field("telegram_api_url", &self.telegram_api_url)
            .field("due_days_ahead", &self.due_days_ahead)
            .field("due_check_times", &self.due_check_times)
            .field("daily_summary_time", &self.daily_summary_time)
            .field("weekly_report_day", &self.weekly_report_day)
            .field("weekly_report_time", &self.weekly_report_time)
            .field("due_notification_delay_ms", &self.due_notification_delay_ms)
            .field("summary_delay_ms", &self.summary_delay_ms)
            .finish()
    }
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn time_var(key: &str, default: NaiveTime) -> NaiveTime {
    env::var(key).ok().and_then(|v| parse_time_of_day(&v)).unwrap_or(default)
}

/// Comma separated `HH:MM` list. An empty or fully invalid list keeps the default.
fn parse_time_list(raw: &str) -> Option<Vec<NaiveTime>> {
    let times: Vec<NaiveTime> = raw.split(',').filter_map(parse_time_of_day).collect();
    if times.is_empty() { None } else { Some(times) }
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();
        let defaults = Schedule::default();

        Self {
            port: parsed_var("PORT", 3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            telegram_bot_token: env::var("TELEGRAM_BOT_TOKEN").ok().filter(|t| !t.trim().is_empty()),
            telegram_api_url: env::var("TELEGRAM_API_URL").unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            due_days_ahead: parsed_var("DUE_DAYS_AHEAD", DEFAULT_DUE_DAYS_AHEAD),
            due_check_times: env::var("DUE_CHECK_TIMES")
                .ok()
                .and_then(|v| parse_time_list(&v))
                .unwrap_or(defaults.due_check_times),
            daily_summary_time: time_var("DAILY_SUMMARY_TIME", defaults.daily_summary_at),
            weekly_report_day: env::var("WEEKLY_REPORT_DAY")
                .ok()
                .and_then(|v| parse_weekday(&v))
                .unwrap_or(defaults.weekly_report_on),
            weekly_report_time: time_var("WEEKLY_REPORT_TIME", defaults.weekly_report_at),
            due_notification_delay_ms: parsed_var("DUE_NOTIFICATION_DELAY_MS", DEFAULT_DUE_NOTIFICATION_DELAY_MS),
            summary_delay_ms: parsed_var("SUMMARY_DELAY_MS", DEFAULT_SUMMARY_DELAY_MS),
        }
    }

    pub fn schedule(&self) -> Schedule {
        Schedule {
            due_check_times: self.due_check_times.clone(),
            daily_summary_at: self.daily_summary_time,
            weekly_report_on: self.weekly_report_day,
            weekly_report_at: self.weekly_report_time,
        }
    }

    pub fn notification_settings(&self) -> NotificationSettings {
        NotificationSettings {
            days_ahead: self.due_days_ahead,
            due_delay: Duration::from_millis(self.due_notification_delay_ms),
            summary_delay: Duration::from_millis(self.summary_delay_ms),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_list_skips_invalid_entries() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let six = NaiveTime::from_hms_opt(18, 0, 0).unwrap();
        assert_eq!(parse_time_list("09:00, 18:00"), Some(vec![nine, six]));
        assert_eq!(parse_time_list("09:00,nope"), Some(vec![nine]));
        assert_eq!(parse_time_list(""), None);
    }

    #[test]
    fn debug_redacts_token() {
        let config = Config {
            port: 3000,
            log_level: "info".to_string(),
            telegram_bot_token: Some("123:secret".to_string()),
            telegram_api_url: "https://api.telegram.org".to_string(),
            due_days_ahead: 3,
            due_check_times: Schedule::default().due_check_times,
            daily_summary_time: Schedule::default().daily_summary_at,
            weekly_report_day: Weekday::Mon,
            weekly_report_time: Schedule::default().weekly_report_at,
            due_notification_delay_ms: 500,
            summary_delay_ms: 1000,
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("secret"));
        assert!(printed.contains("<redacted>"));
    }
}
