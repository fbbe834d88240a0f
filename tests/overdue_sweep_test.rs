use chrono::{Days, NaiveDate, NaiveTime, Utc};
use library_rental::adapters::mock::NotificationService;
use library_rental::application::{ApplicationError, ServiceDependencies, book, loan};
use library_rental::domain::Book;
use library_rental::domain::commands::*;
use library_rental::scheduler::{OverdueSweepScheduler, SweepState};
use std::time::Duration;
use tokio::sync::watch;

mod common;

// ============================================================================
// テスト用のヘルパー関数
// ============================================================================

const THRESHOLD_DAYS: u32 = 4;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn days_ago(days: u64) -> NaiveDate {
    today().checked_sub_days(Days::new(days)).unwrap()
}

fn notice() -> loan::OverdueNotice {
    loan::OverdueNotice {
        subject: "Book delayed.".to_string(),
        body: "Please return the book.".to_string(),
    }
}

async fn lend(
    deps: &ServiceDependencies,
    isbn: &str,
    customer_email: &str,
    loan_date: NaiveDate,
) -> Book {
    let book = book::register_book(
        deps,
        RegisterBook {
            title: format!("Book {}", isbn),
            author: "Author".to_string(),
            isbn: isbn.to_string(),
        },
    )
    .await
    .unwrap();

    loan::create_loan(
        deps,
        CreateLoan {
            book_id: book.id,
            customer_name: "Customer".to_string(),
            customer_email: customer_email.to_string(),
            loan_date,
        },
    )
    .await
    .unwrap();

    book
}

// ============================================================================
// 延滞通知
// ============================================================================

#[tokio::test]
async fn test_sweep_sends_once_to_all_recipients() {
    // Arrange
    let ctx = common::in_memory_context();
    lend(&ctx.deps, "1", "alice@example.com", days_ago(10)).await;
    lend(&ctx.deps, "2", "bob@example.com", days_ago(6)).await;
    lend(&ctx.deps, "3", "alice@example.com", days_ago(7)).await;
    lend(&ctx.deps, "4", "carol@example.com", today()).await;

    // Act
    let report = loan::notify_overdue_loans(&ctx.deps, THRESHOLD_DAYS, today(), &notice())
        .await
        .unwrap();

    // Assert
    assert_eq!(report.overdue, 3);
    assert_eq!(report.notified, 2);

    let sent = ctx.notifications.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Book delayed.");
    assert_eq!(sent[0].body, "Please return the book.");

    let mut recipients = sent[0].recipients.clone();
    recipients.sort();
    assert_eq!(recipients, vec!["alice@example.com", "bob@example.com"]);
}

#[tokio::test]
async fn test_sweep_skips_send_when_nothing_overdue() {
    let ctx = common::in_memory_context();
    lend(&ctx.deps, "1", "alice@example.com", today()).await;

    let report = loan::notify_overdue_loans(&ctx.deps, THRESHOLD_DAYS, today(), &notice())
        .await
        .unwrap();

    assert_eq!(report, loan::SweepReport::default());
    assert!(ctx.notifications.sent().is_empty());
}

#[tokio::test]
async fn test_sweep_ignores_returned_loans() {
    let ctx = common::in_memory_context();
    let book = lend(&ctx.deps, "1", "alice@example.com", days_ago(10)).await;

    let history =
        loan::get_loans_by_book(&ctx.deps, &book, library_rental::domain::PageRequest::default())
            .await
            .unwrap();
    let open = history.content[0].loan.clone();
    loan::mark_returned(&ctx.deps, open, true).await.unwrap();

    let report = loan::notify_overdue_loans(&ctx.deps, THRESHOLD_DAYS, today(), &notice())
        .await
        .unwrap();

    assert_eq!(report.overdue, 0);
    assert!(ctx.notifications.sent().is_empty());
}

#[tokio::test]
async fn test_sweep_surfaces_send_failure() {
    let ctx = common::with_notification_service(NotificationService::failing());
    lend(&ctx.deps, "1", "alice@example.com", days_ago(10)).await;

    let result = loan::notify_overdue_loans(&ctx.deps, THRESHOLD_DAYS, today(), &notice()).await;

    assert!(matches!(result, Err(ApplicationError::NotificationError(_))));
}

// ============================================================================
// スケジューラー
// ============================================================================

#[tokio::test]
async fn test_run_once_reports_and_returns_to_idle() {
    let ctx = common::in_memory_context();
    lend(&ctx.deps, "1", "alice@example.com", days_ago(10)).await;

    let scheduler =
        OverdueSweepScheduler::new(ctx.deps.clone(), NaiveTime::MIN, THRESHOLD_DAYS, notice());

    let report = scheduler.run_once(today()).await;

    assert_eq!(
        report,
        Some(loan::SweepReport {
            overdue: 1,
            notified: 1
        })
    );
    assert_eq!(scheduler.state(), SweepState::Idle);
    assert_eq!(ctx.notifications.sent().len(), 1);
}

#[tokio::test]
async fn test_run_once_failure_is_logged_not_propagated() {
    let ctx = common::with_notification_service(NotificationService::failing());
    lend(&ctx.deps, "1", "alice@example.com", days_ago(10)).await;

    let scheduler =
        OverdueSweepScheduler::new(ctx.deps.clone(), NaiveTime::MIN, THRESHOLD_DAYS, notice());

    assert_eq!(scheduler.run_once(today()).await, None);
    assert_eq!(scheduler.state(), SweepState::Idle);
}

#[tokio::test]
async fn test_run_once_out_of_range_threshold_does_not_panic() {
    let ctx = common::in_memory_context();
    lend(&ctx.deps, "1", "alice@example.com", days_ago(10)).await;

    let scheduler =
        OverdueSweepScheduler::new(ctx.deps.clone(), NaiveTime::MIN, u32::MAX, notice());

    assert_eq!(scheduler.run_once(today()).await, None);
    assert_eq!(scheduler.state(), SweepState::Idle);
    assert!(ctx.notifications.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_scheduler_fires_daily_and_stops_on_shutdown() {
    // Arrange
    let ctx = common::in_memory_context();
    lend(&ctx.deps, "1", "alice@example.com", days_ago(10)).await;

    let scheduler =
        OverdueSweepScheduler::new(ctx.deps.clone(), NaiveTime::MIN, THRESHOLD_DAYS, notice());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Act: 一時停止した時計を進めて次の実行時刻まで待つ
    let handle = scheduler.start(shutdown_rx);
    for _ in 0..48 {
        if !ctx.notifications.sent().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(3600)).await;
    }

    // Assert
    assert_eq!(ctx.notifications.sent().len(), 1);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test]
async fn test_scheduler_stops_when_shutdown_sender_dropped() {
    let ctx = common::in_memory_context();
    let scheduler =
        OverdueSweepScheduler::new(ctx.deps.clone(), NaiveTime::MIN, THRESHOLD_DAYS, notice());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = scheduler.start(shutdown_rx);
    drop(shutdown_tx);

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
    assert!(ctx.notifications.sent().is_empty());
}
