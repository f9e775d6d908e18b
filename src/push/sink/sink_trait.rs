use async_trait::async_trait;

use crate::error::Result;
use crate::push::types::NotificationRequest;

/// Notification Sink Trait（通知出口接口）
///
/// 每次调度最多调用一次 send；不重试、不持久化
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// 发送一次通知请求
    async fn send(&self, request: &NotificationRequest) -> Result<()>;
}
