use async_trait::async_trait;

#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 通知サービスポート
///
/// 利用者への通知配信メカニズムを抽象化する。
/// 実装はメール、SMS、プッシュ通知などが考えられる。
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// 同じメッセージを宛先リスト全体に1回で送信する
    ///
    /// 再送やキューイングは行わない。
    async fn send(&self, subject: &str, body: &str, recipients: &[String]) -> Result<()>;
}
