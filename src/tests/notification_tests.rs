use super::{FlakyStorage, create_test_context, create_test_context_with, test_today};
use crate::core::constants::NOTIFICATION_JOB_COMPLETED;
use crate::core::flows::TransactionDraft;
use crate::core::models::transaction::{InstallmentInfo, TransactionKind};
use crate::core::notifications::{Job, JobReport};
use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_due_check_classifies_and_excludes() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    let today = test_today();
    for offset in [-1, 0, 1, 3, 4] {
        ctx.record("u1", TransactionKind::Expense, "Conta", dec!(10), today + Duration::days(offset))
            .await;
    }
    ctx.record("u1", TransactionKind::Income, "Salário", dec!(10), today).await;
    let paid = ctx.record("u1", TransactionKind::Expense, "Luz", dec!(10), today).await;
    ctx.finance.mark_paid("u1", &paid.id, today).await.unwrap();

    let report = ctx.notifications.run(Job::DueCheck).await.unwrap();
    assert_eq!(
        report,
        JobReport {
            job: Job::DueCheck,
            sent: 4,
            skipped: 0,
            failed: 0,
        }
    );

    let sent = ctx.delivery.sent_to("chat-1").await;
    let labels = ["VENCIDA há 1 dia(s)", "VENCE HOJE", "vence AMANHÃ", "vence em 3 dias"];
    assert_eq!(sent.len(), labels.len());
    for (message, label) in sent.iter().zip(labels) {
        assert!(message.text.contains(label), "{} not in {}", label, message.text);
    }
    assert!(sent[0].text.contains("Ação necessária"));
    assert!(ctx.audit_actions().await.contains(&NOTIFICATION_JOB_COMPLETED.to_string()));
}

#[tokio::test]
async fn test_due_check_includes_installment_line() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.finance
        .record_transaction(
            "u1",
            TransactionDraft {
                kind: TransactionKind::Expense,
                category: "Eletrônicos".to_string(),
                description: "Notebook".to_string(),
                amount: dec!(1200),
                due_date: test_today(),
                installment: Some(InstallmentInfo::first_of(12, dec!(100))),
            },
        )
        .await
        .unwrap();

    ctx.notifications.check_due_transactions().await.unwrap();
    let sent = ctx.delivery.sent_to("chat-1").await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("Parcela 1/12 (R$ 100.00)"));
}

#[tokio::test]
async fn test_users_without_endpoint_are_skipped() {
    let ctx = create_test_context();
    ctx.register("u2", None).await;
    ctx.record("ghost", TransactionKind::Expense, "Luz", dec!(10), test_today()).await;
    ctx.record("u2", TransactionKind::Expense, "Água", dec!(10), test_today()).await;

    let report = ctx.notifications.check_due_transactions().await.unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(report.skipped, 2);
    assert!(ctx.delivery.sent().await.is_empty());
}

#[tokio::test]
async fn test_delivery_failure_does_not_abort_batch() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.register("u2", Some("chat-2")).await;
    ctx.record("u1", TransactionKind::Expense, "Luz", dec!(10), test_today()).await;
    ctx.record("u2", TransactionKind::Expense, "Água", dec!(10), test_today()).await;
    ctx.record("u1", TransactionKind::Expense, "Gás", dec!(10), test_today()).await;
    ctx.delivery.fail_endpoint("chat-1").await;

    let report = ctx.notifications.check_due_transactions().await.unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 2);
    assert_eq!(ctx.delivery.sent_to("chat-2").await.len(), 1);
}

#[tokio::test]
async fn test_query_failure_aborts_job_only() {
    let storage = FlakyStorage::new();
    let ctx = create_test_context_with(storage.clone());
    ctx.register("u1", Some("chat-1")).await;
    ctx.record("u1", TransactionKind::Expense, "Luz", dec!(10), test_today()).await;

    storage.fail_queries(true);
    assert!(ctx.notifications.run(Job::DueCheck).await.is_err());
    assert!(ctx.notifications.run(Job::DailySummary).await.is_err());
    assert!(ctx.delivery.sent().await.is_empty());

    // later runs are unaffected
    storage.fail_queries(false);
    let report = ctx.notifications.run(Job::DueCheck).await.unwrap();
    assert_eq!(report.sent, 1);
}

#[tokio::test]
async fn test_daily_summary_per_user_with_open_transactions() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.register("u2", Some("chat-2")).await;
    let today = test_today();

    ctx.record("u1", TransactionKind::Income, "Salário", dec!(3000), today + Duration::days(5))
        .await;
    for category in ["Luz", "Água", "Gás", "Internet"] {
        ctx.record("u1", TransactionKind::Expense, category, dec!(100), today).await;
    }
    ctx.record("u1", TransactionKind::Expense, "Escola", dec!(600), today + Duration::days(10))
        .await;
    let paid = ctx.record("u2", TransactionKind::Expense, "Luz", dec!(10), today).await;
    ctx.finance.mark_paid("u2", &paid.id, today).await.unwrap();

    let report = ctx.notifications.send_daily_summary().await.unwrap();
    assert_eq!(report.sent, 1);
    assert!(ctx.delivery.sent_to("chat-2").await.is_empty());

    let digest = &ctx.delivery.sent_to("chat-1").await[0];
    assert!(digest.text.contains("Resumo Diário - 15/03/2024"));
    assert!(digest.text.contains("Receitas: 1 (R$ 3000.00)"));
    assert!(digest.text.contains("Despesas: 5 (R$ 1000.00)"));
    assert!(digest.text.contains("4 despesa(s) vencem hoje"));
    assert!(digest.text.contains("e mais 1"));
}

#[tokio::test]
async fn test_weekly_report_covers_trailing_week() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.register("u2", Some("chat-2")).await;
    let today = test_today();

    // created ten days ago, outside the window
    ctx.clock.advance(Duration::days(-10));
    ctx.record("u2", TransactionKind::Expense, "Antigo", dec!(999), today).await;
    ctx.record("u1", TransactionKind::Expense, "Antigo", dec!(999), today).await;
    ctx.clock.advance(Duration::days(8));
    ctx.record("u1", TransactionKind::Expense, "Mercado", dec!(100), today).await;
    ctx.record("u1", TransactionKind::Expense, "Farmácia", dec!(40), today).await;
    ctx.record("u1", TransactionKind::Income, "Freela", dec!(500), today).await;
    ctx.clock.advance(Duration::days(1));
    ctx.record("u1", TransactionKind::Expense, "Mercado", dec!(60), today).await;
    ctx.record("u1", TransactionKind::Expense, "Farmácia", dec!(20), today).await;
    ctx.clock.advance(Duration::days(1));

    let report = ctx.notifications.send_weekly_report().await.unwrap();
    assert_eq!(report.sent, 1);
    assert!(ctx.delivery.sent_to("chat-2").await.is_empty());

    let text = &ctx.delivery.sent_to("chat-1").await[0].text;
    assert!(text.contains("08/03 - 15/03/2024"));
    assert!(text.contains("Receitas: R$ 500.00 (1)"));
    assert!(text.contains("Despesas: R$ 220.00 (4)"));
    assert!(text.contains("Saldo: R$ 280.00"));
    assert!(text.contains("Categoria mais usada: *Farmácia* (2x)"));
    assert!(text.contains("Saldo positivo na semana"));
}

#[tokio::test]
async fn test_overflowing_totals_fail_only_that_user() {
    let ctx = create_test_context();
    ctx.register("u1", Some("chat-1")).await;
    ctx.register("u2", Some("chat-2")).await;
    ctx.record("u1", TransactionKind::Income, "Bolada", Decimal::MAX, test_today()).await;
    ctx.record("u1", TransactionKind::Income, "Bolada", Decimal::MAX, test_today()).await;
    ctx.record("u2", TransactionKind::Income, "Salário", dec!(3000), test_today()).await;

    for job in [Job::DailySummary, Job::WeeklyReport] {
        let report = ctx.notifications.run(job).await.unwrap();
        assert_eq!(
            report,
            JobReport {
                job,
                sent: 1,
                skipped: 0,
                failed: 1,
            }
        );
    }
    assert!(ctx.delivery.sent_to("chat-1").await.is_empty());
    assert_eq!(ctx.delivery.sent_to("chat-2").await.len(), 2);
}
