use async_trait::async_trait;
use reqwest::Client;
use tracing::error;

use crate::config::PushConfig;
use crate::error::{Result, ServerError};
use crate::push::sink::sink_trait::NotificationSink;
use crate::push::types::NotificationRequest;

/// 通知服务的固定子路径
pub const NOTIFY_USERS_PATH: &str = "/api/notify-users";

/// HTTP Sink：经 Bearer 认证 POST 到配置的通知服务
pub struct HttpSink {
    client: Client,
    endpoint: String,
    auth_token: String,
}

impl HttpSink {
    /// 创建新的 HTTP Sink
    ///
    /// 配置错误在这里立刻失败，不会拖到首次请求
    pub fn new(config: &PushConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ServerError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = format!("{}{}", config.base_url.trim_end_matches('/'), NOTIFY_USERS_PATH);

        Ok(Self {
            client,
            endpoint,
            auth_token: config.auth_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl NotificationSink for HttpSink {
    async fn send(&self, request: &NotificationRequest) -> Result<()> {
        // 1. 先序列化：序列化失败在任何网络 IO 之前返回
        let body = serde_json::to_vec(request)?;

        // 2. 发送请求
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .body(body)
            .send()
            .await?;

        // 3. 任意 2xx 即成功，不要求结构化响应体
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        error!(
            "[HTTP SINK] Notify request failed: status={}, body={}",
            status, error_text
        );
        Err(ServerError::Delivery {
            status: status.as_u16(),
            body: error_text,
        })
    }
}
