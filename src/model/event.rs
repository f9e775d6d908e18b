use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use super::stream_id::{StreamId, UserId};

/// 事件盐值长度（字节）
pub const EVENT_SALT_LEN: usize = 32;
/// 迷你块哈希长度（字节）
pub const MINIBLOCK_HASH_LEN: usize = 32;

/// 十六进制字节序列化辅助
pub mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// 成员关系操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipOp {
    /// 加入流
    Join,
    /// 离开流
    Leave,
    /// 受邀（在 Join 之前不计入成员）
    Invite,
}

/// 事件负载
///
/// 只有消息负载会产生推送通知；创建与成员事件是状态负载
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    /// 流创建事件（每个流的第一个事件）
    Inception {
        stream_id: StreamId,
        /// 频道所属空间（仅空间频道存在）
        #[serde(default, skip_serializing_if = "Option::is_none")]
        space_id: Option<StreamId>,
    },
    /// 成员关系变更
    Membership { op: MembershipOp, user_id: UserId },
    /// 空间频道消息
    ChannelMessage { message: String },
    /// 私聊/群聊消息
    DmMessage { message: String },
}

impl EventPayload {
    /// 是否为用户可见的消息负载
    pub fn is_message(&self) -> bool {
        matches!(
            self,
            EventPayload::ChannelMessage { .. } | EventPayload::DmMessage { .. }
        )
    }
}

/// 流事件
///
/// 一旦创建不可变；prev_miniblock_hash 与前一个迷你块形成哈希链
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamEvent {
    /// 创建者地址
    pub creator_address: UserId,
    /// 随机盐值
    #[serde(with = "serde_hex")]
    pub salt: Vec<u8>,
    /// 前一个迷你块哈希
    #[serde(with = "serde_hex")]
    pub prev_miniblock_hash: Vec<u8>,
    /// 创建时间（Unix 毫秒）
    pub created_at_epoch_ms: i64,
    /// 类型化负载
    #[serde(rename = "Payload")]
    pub payload: EventPayload,
}

impl StreamEvent {
    /// 创建新事件（随机盐值，链尾哈希由调用方提供）
    pub fn new(creator: impl Into<UserId>, prev_miniblock_hash: Vec<u8>, payload: EventPayload) -> Self {
        let mut salt = vec![0u8; EVENT_SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        Self {
            creator_address: creator.into(),
            salt,
            prev_miniblock_hash,
            created_at_epoch_ms: Utc::now().timestamp_millis(),
            payload,
        }
    }
}
