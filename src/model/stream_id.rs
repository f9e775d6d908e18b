use std::fmt;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ServerError};

/// 用户 ID（十六进制地址字符串）
pub type UserId = String;

/// 流 ID 类型前缀（两位十六进制）
pub const STREAM_SPACE_PREFIX: &str = "10";
pub const STREAM_CHANNEL_PREFIX: &str = "20";
pub const STREAM_GDM_CHANNEL_PREFIX: &str = "77";
pub const STREAM_DM_CHANNEL_PREFIX: &str = "88";

/// 流 ID 总长度（前缀 2 位 + 随机体 62 位）
pub const STREAM_ID_LEN: usize = 64;

/// 流 ID
///
/// 前缀决定流的类型：
/// - `10` 空间
/// - `20` 空间频道
/// - `88` 私聊（DM）
/// - `77` 群聊（GDM）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StreamId(String);

impl StreamId {
    /// 生成指定前缀的新流 ID（随机体）
    pub fn generate(prefix: &str) -> Self {
        let mut body = [0u8; (STREAM_ID_LEN - 2) / 2];
        rand::thread_rng().fill_bytes(&mut body);
        StreamId(format!("{}{}", prefix, hex::encode(body)))
    }

    /// 新空间流 ID
    pub fn space() -> Self {
        Self::generate(STREAM_SPACE_PREFIX)
    }

    /// 新空间频道流 ID
    pub fn channel() -> Self {
        Self::generate(STREAM_CHANNEL_PREFIX)
    }

    /// 新私聊流 ID
    pub fn dm_channel() -> Self {
        Self::generate(STREAM_DM_CHANNEL_PREFIX)
    }

    /// 新群聊流 ID
    pub fn gdm_channel() -> Self {
        Self::generate(STREAM_GDM_CHANNEL_PREFIX)
    }

    /// 解析并校验流 ID
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != STREAM_ID_LEN {
            return Err(ServerError::Validation(format!(
                "invalid stream id length: {}",
                s.len()
            )));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ServerError::Validation(format!("stream id is not hex: {}", s)));
        }
        match &s[..2] {
            STREAM_SPACE_PREFIX
            | STREAM_CHANNEL_PREFIX
            | STREAM_GDM_CHANNEL_PREFIX
            | STREAM_DM_CHANNEL_PREFIX => Ok(StreamId(s.to_string())),
            prefix => Err(ServerError::Validation(format!(
                "unknown stream id prefix: {}",
                prefix
            ))),
        }
    }

    /// 类型前缀
    pub fn prefix(&self) -> &str {
        &self.0[..2]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_space(&self) -> bool {
        self.prefix() == STREAM_SPACE_PREFIX
    }

    pub fn is_space_channel(&self) -> bool {
        self.prefix() == STREAM_CHANNEL_PREFIX
    }

    pub fn is_dm_channel(&self) -> bool {
        self.prefix() == STREAM_DM_CHANNEL_PREFIX
    }

    pub fn is_gdm_channel(&self) -> bool {
        self.prefix() == STREAM_GDM_CHANNEL_PREFIX
    }

    /// 是否为直发消息流（私聊或群聊）
    pub fn is_direct(&self) -> bool {
        self.is_dm_channel() || self.is_gdm_channel()
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
