use super::{create_test_context, test_today};
use crate::core::clock::Clock;
use crate::core::errors::FinanceError;
use crate::core::models::message::OutgoingMessage;
use crate::core::models::transaction::TransactionKind;
use crate::core::notifications::{Job, NotificationService, NotificationSettings};
use crate::core::scheduler::{ScheduledJob, Scheduler, Trigger};
use crate::infrastructure::delivery::Delivery;
use crate::infrastructure::delivery::in_memory::InMemoryDelivery;
use async_trait::async_trait;
use chrono::{NaiveTime, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Panics on its first send, then behaves like the wrapped delivery.
struct CrashOnceDelivery {
    inner: InMemoryDelivery,
    crashed: AtomicBool,
}

#[async_trait]
impl Delivery for CrashOnceDelivery {
    async fn send(&self, endpoint: &str, message: &OutgoingMessage) -> Result<(), FinanceError> {
        if !self.crashed.swap(true, Ordering::SeqCst) {
            panic!("transport crashed");
        }
        self.inner.send(endpoint, message).await
    }
}

fn quiet_settings() -> NotificationSettings {
    NotificationSettings {
        days_ahead: 3,
        due_delay: Duration::ZERO,
        summary_delay: Duration::ZERO,
    }
}

fn due_check_at_nine() -> Vec<ScheduledJob> {
    vec![ScheduledJob {
        id: "due-check-09:00".to_string(),
        job: Job::DueCheck,
        trigger: Trigger::Daily {
            at: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        },
    }]
}

#[tokio::test(start_paused = true)]
async fn test_job_fires_once_at_trigger_time() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.record("u1", TransactionKind::Expense, "Luz", dec!(10), test_today()).await;
    ctx.clock.set(Utc.with_ymd_and_hms(2024, 3, 15, 8, 59, 0).unwrap());

    let notifications = Arc::new(NotificationService::new(
        ctx.finance.clone(),
        Arc::new(ctx.delivery.clone()),
        quiet_settings(),
    ));
    let clock: Arc<dyn Clock> = ctx.clock.clone();
    let mut scheduler = Scheduler::new(notifications, clock, due_check_at_nine());
    scheduler.start();

    tokio::time::sleep(Duration::from_secs(59)).await;
    assert!(ctx.delivery.sent().await.is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(ctx.delivery.sent_to("chat-1").await.len(), 1);

    // the clock has not moved; the next run is tomorrow
    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert_eq!(ctx.delivery.sent_to("chat-1").await.len(), 1);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_before_trigger_sends_nothing() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.record("u1", TransactionKind::Expense, "Luz", dec!(10), test_today()).await;
    ctx.clock.set(Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap());

    let notifications = Arc::new(NotificationService::new(
        ctx.finance.clone(),
        Arc::new(ctx.delivery.clone()),
        NotificationSettings::default(),
    ));
    let clock: Arc<dyn Clock> = ctx.clock.clone();
    let mut scheduler = Scheduler::new(notifications, clock, due_check_at_nine());
    scheduler.start();
    scheduler.start();

    tokio::time::sleep(Duration::from_secs(60)).await;
    scheduler.stop().await;

    tokio::time::sleep(Duration::from_secs(7200)).await;
    assert!(ctx.delivery.sent().await.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_panicking_run_does_not_stop_the_job() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.record("u1", TransactionKind::Expense, "Luz", dec!(10), test_today()).await;
    ctx.clock.set(Utc.with_ymd_and_hms(2024, 3, 15, 8, 59, 0).unwrap());

    let delivery = Arc::new(CrashOnceDelivery {
        inner: ctx.delivery.clone(),
        crashed: AtomicBool::new(false),
    });
    let notifications = Arc::new(NotificationService::new(ctx.finance.clone(), delivery, quiet_settings()));
    let clock: Arc<dyn Clock> = ctx.clock.clone();
    let mut scheduler = Scheduler::new(notifications, clock, due_check_at_nine());
    scheduler.start();

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert!(ctx.delivery.sent().await.is_empty());

    // next day's run still happens
    tokio::time::sleep(Duration::from_secs(24 * 3600 + 60)).await;
    assert_eq!(ctx.delivery.sent_to("chat-1").await.len(), 1);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_summary_reaches_others_when_one_total_overflows() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.register("u2", Some("chat-2")).await;
    ctx.record("u1", TransactionKind::Income, "Bolada", Decimal::MAX, test_today()).await;
    ctx.record("u1", TransactionKind::Income, "Bolada", Decimal::MAX, test_today()).await;
    ctx.record("u2", TransactionKind::Income, "Salário", dec!(3000), test_today()).await;
    ctx.clock.set(Utc.with_ymd_and_hms(2024, 3, 15, 7, 59, 0).unwrap());

    let notifications = Arc::new(NotificationService::new(
        ctx.finance.clone(),
        Arc::new(ctx.delivery.clone()),
        quiet_settings(),
    ));
    let clock: Arc<dyn Clock> = ctx.clock.clone();
    let jobs = vec![ScheduledJob {
        id: "daily-summary".to_string(),
        job: Job::DailySummary,
        trigger: Trigger::Daily {
            at: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        },
    }];
    let mut scheduler = Scheduler::new(notifications, clock, jobs);
    scheduler.start();

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(ctx.delivery.sent_to("chat-1").await.is_empty());
    assert_eq!(ctx.delivery.sent_to("chat-2").await.len(), 1);

    scheduler.stop().await;
}
