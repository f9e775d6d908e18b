use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};

use crate::error::ServerError;

/// 推送调度服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// 通知服务基础 URL（固定子路径 /api/notify-users 追加在其后）
    pub base_url: String,
    /// Bearer 认证令牌
    pub auth_token: String,
    /// 单次通知请求超时时间（秒）
    pub request_timeout_secs: u64,
    /// 日志级别
    pub log_level: String,
    /// 日志格式（json / pretty / compact）
    pub log_format: Option<String>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8090".to_string(),
            auth_token: String::new(),
            request_timeout_secs: 10,
            log_level: "info".to_string(),
            log_format: None,
        }
    }
}

impl PushConfig {
    /// 创建新的配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 TOML 文件加载配置
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("无法读取配置文件: {:?}", path.as_ref()))?;

        let toml_config: TomlConfig = toml::from_str(&content)
            .with_context(|| "配置文件格式错误")?;

        Ok(toml_config.into())
    }

    /// 从环境变量合并配置（STREAMPUSH_ 前缀）
    pub fn merge_from_env(&mut self) {
        if let Ok(base_url) = env::var("STREAMPUSH_NOTIFY_URL") {
            self.base_url = base_url;
        }
        if let Ok(token) = env::var("STREAMPUSH_AUTH_TOKEN") {
            self.auth_token = token;
        }
        if let Ok(timeout) = env::var("STREAMPUSH_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = timeout.parse().unwrap_or(self.request_timeout_secs);
        }
        if let Ok(log_level) = env::var("STREAMPUSH_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(log_format) = env::var("STREAMPUSH_LOG_FORMAT") {
            self.log_format = Some(log_format);
        }
    }

    /// 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = if Path::new("config.toml").exists() {
            info!("📄 从默认配置文件加载: config.toml");
            Self::from_toml_file("config.toml")?
        } else {
            Self::default()
        };

        config.merge_from_env();
        Ok(config)
    }

    /// 校验配置
    ///
    /// 在构造 HTTP Sink 时调用，保证配置错误在启动期暴露而不是首次请求时
    pub fn validate(&self) -> crate::error::Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ServerError::Configuration(format!("invalid notify url {}: {}", self.base_url, e)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ServerError::Configuration(format!(
                "unsupported notify url scheme: {}",
                url.scheme()
            )));
        }
        if self.auth_token.trim().is_empty() {
            return Err(ServerError::Configuration("auth token is empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ServerError::Configuration("request timeout must be non-zero".to_string()));
        }
        Ok(())
    }

    /// 请求超时时间
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// TOML 配置文件结构（用于反序列化）
#[derive(Debug, Deserialize)]
struct TomlConfig {
    push: Option<TomlPushConfig>,
    log: Option<TomlLogConfig>,
}

#[derive(Debug, Deserialize)]
struct TomlPushConfig {
    url: Option<String>,
    auth_token: Option<String>,
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct TomlLogConfig {
    level: Option<String>,
    format: Option<String>,
}

impl From<TomlConfig> for PushConfig {
    fn from(toml_config: TomlConfig) -> Self {
        let mut config = PushConfig::default();

        if let Some(push) = toml_config.push {
            if let Some(url) = push.url {
                config.base_url = url;
            }
            if let Some(token) = push.auth_token {
                config.auth_token = token;
            }
            if let Some(timeout) = push.request_timeout_secs {
                config.request_timeout_secs = timeout;
            }
        }

        if let Some(log) = toml_config.log {
            if let Some(level) = log.level {
                config.log_level = level;
            }
            config.log_format = log.format;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> PushConfig {
        PushConfig {
            base_url: "https://notify.example.com".to_string(),
            auth_token: "secret-token".to_string(),
            ..PushConfig::default()
        }
    }

    #[test]
    fn test_validate_accepts_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_token() {
        let mut config = valid_config();
        config.auth_token = "   ".to_string();
        assert!(matches!(config.validate(), Err(ServerError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = valid_config();
        config.base_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(ServerError::Configuration(_))));

        config.base_url = "ftp://notify.example.com".to_string();
        assert!(matches!(config.validate(), Err(ServerError::Configuration(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = valid_config();
        config.request_timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ServerError::Configuration(_))));
    }

    #[test]
    fn test_from_toml_str() {
        let content = r#"
            [push]
            url = "https://notify.example.com"
            auth_token = "from-file"
            request_timeout_secs = 5

            [log]
            level = "debug"
            format = "json"
        "#;
        let toml_config: TomlConfig = toml::from_str(content).unwrap();
        let config: PushConfig = toml_config.into();
        assert_eq!(config.base_url, "https://notify.example.com");
        assert_eq!(config.auth_token, "from-file");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format.as_deref(), Some("json"));
    }
}
