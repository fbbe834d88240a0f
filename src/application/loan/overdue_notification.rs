use chrono::NaiveDate;

use super::loan_service::get_overdue_loans;
use crate::application::{
    ServiceDependencies,
    errors::{ApplicationError, Result},
};

/// 延滞通知の文面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueNotice {
    pub subject: String,
    pub body: String,
}

/// 延滞通知バッチの実行結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 延滞していた貸出の件数
    pub overdue: usize,
    /// 通知した宛先の件数
    pub notified: usize,
}

/// 延滞通知バッチ（純粋な関数）
///
/// 定期的に実行され、延滞した貸出の借り手にまとめて通知する。
///
/// ビジネスルール：
/// - `today - threshold_days`より前に貸し出された未返却の貸出を延滞とする
/// - 通知は1通のメッセージを全宛先に一括送信する（借り手ごとには送らない）
/// - 同じメールアドレスは1回だけ宛先に含める
/// - 延滞がなければ送信しない
///
/// 処理フロー：
/// 1. 延滞している貸出を取得
/// 2. 貸出に保存された借り手のメールアドレスを集める
/// 3. 通知サービスを1回だけ呼び出す
///
/// # エラー
/// - RepositoryError: 延滞の取得に失敗
/// - NotificationError: 送信に失敗（再送しない。次回の実行が唯一の回復手段）
pub async fn notify_overdue_loans(
    deps: &ServiceDependencies,
    threshold_days: u32,
    today: NaiveDate,
    notice: &OverdueNotice,
) -> Result<SweepReport> {
    // 1. 延滞している貸出を取得
    let overdue_loans = get_overdue_loans(deps, threshold_days, today).await?;

    if overdue_loans.is_empty() {
        tracing::debug!("No overdue loans, skipping notification");
        return Ok(SweepReport::default());
    }

    // 2. 宛先を集める（重複は除く、順序は維持）
    let mut recipients: Vec<String> = Vec::with_capacity(overdue_loans.len());
    for loan in &overdue_loans {
        if !recipients.contains(&loan.customer_email) {
            recipients.push(loan.customer_email.clone());
        }
    }

    // 3. 一括送信
    deps.notification_service
        .send(&notice.subject, &notice.body, &recipients)
        .await
        .map_err(ApplicationError::NotificationError)?;

    let report = SweepReport {
        overdue: overdue_loans.len(),
        notified: recipients.len(),
    };

    tracing::info!(
        overdue = report.overdue,
        notified = report.notified,
        "Overdue loan notification sent"
    );

    Ok(report)
}
