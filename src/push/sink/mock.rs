use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::Result;
use crate::push::sink::sink_trait::NotificationSink;
use crate::push::types::NotificationRequest;

/// Mock Sink（用于测试）
///
/// 不做网络调用，记录每个请求体供断言
#[derive(Default)]
pub struct MockSink {
    requests: Arc<RwLock<Vec<NotificationRequest>>>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录的请求
    pub async fn requests(&self) -> Vec<NotificationRequest> {
        self.requests.read().await.clone()
    }

    /// 已记录请求数
    pub async fn request_count(&self) -> usize {
        self.requests.read().await.len()
    }
}

#[async_trait]
impl NotificationSink for MockSink {
    async fn send(&self, request: &NotificationRequest) -> Result<()> {
        info!(
            "[MOCK SINK] Recorded notification: sender={}, users={}",
            request.sender,
            request.users.len()
        );
        self.requests.write().await.push(request.clone());
        Ok(())
    }
}
