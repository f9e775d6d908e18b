use std::fmt;
use std::error::Error as StdError;
use serde::{Serialize, Deserialize};

/// 服务错误类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ServerError {
    /// 内部错误
    Internal(String),
    /// 配置错误
    Configuration(String),
    /// 验证错误
    Validation(String),
    /// 网络错误
    Network(String),
    /// 序列化错误
    Serialization(String),
    /// 超时错误
    Timeout(String),
    /// 流未找到
    StreamNotFound(String),
    /// 投递失败（通知服务返回非 2xx）
    Delivery { status: u16, body: String },
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Internal(msg) => write!(f, "Internal error: {}", msg),
            ServerError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ServerError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ServerError::Network(msg) => write!(f, "Network error: {}", msg),
            ServerError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ServerError::Timeout(msg) => write!(f, "Timeout error: {}", msg),
            ServerError::StreamNotFound(id) => write!(f, "Stream not found: {}", id),
            ServerError::Delivery { status, body } => {
                write!(f, "Delivery failed: status={}, body={}", status, body)
            }
        }
    }
}

impl StdError for ServerError {}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ServerError {
    fn from(err: serde_json::Error) -> Self {
        ServerError::Serialization(err.to_string())
    }
}

impl From<tokio::time::error::Elapsed> for ServerError {
    fn from(err: tokio::time::error::Elapsed) -> Self {
        ServerError::Timeout(err.to_string())
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServerError::Timeout(err.to_string())
        } else {
            ServerError::Network(err.to_string())
        }
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
