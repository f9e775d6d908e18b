use serde::{Deserialize, Serialize};

use crate::model::{StreamEvent, StreamId, UserId};

/// 通知类型
///
/// 由频道流 ID 前缀决定：直发前缀（88/77）为 DirectMessage，其余为 NewMessage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// 空间频道新消息
    NewMessage,
    /// 私聊/群聊消息
    DirectMessage,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewMessage => "new_message",
            NotificationKind::DirectMessage => "direct_message",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new_message" => Some(NotificationKind::NewMessage),
            "direct_message" => Some(NotificationKind::DirectMessage),
            _ => None,
        }
    }
}

/// 通知请求体（POST /api/notify-users）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// 发送者
    pub sender: UserId,
    /// 顶层分发列表（= 接收者集合）
    pub users: Vec<UserId>,
    pub payload: NotificationPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub content: NotificationContent,
}

/// 通知内容
///
/// spaceId 仅 new_message 携带；recipients 仅 direct_message 携带。
/// 缺席即缺键，绝不序列化为 null 或空串（下游按键的存在性判断）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContent {
    pub kind: NotificationKind,
    #[serde(rename = "spaceId", default, skip_serializing_if = "Option::is_none")]
    pub space_id: Option<StreamId>,
    #[serde(rename = "channelId")]
    pub channel_id: StreamId,
    #[serde(rename = "senderId")]
    pub sender_id: UserId,
    /// 序列化后的事件记录
    pub event: StreamEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<UserId>>,
}

/// 单次调度结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 已发送一次通知
    Sent {
        notification_id: String,
        recipient_count: usize,
    },
    /// 合法跳过（非错误）
    Skipped(SkipReason),
}

/// 跳过原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// 除发送者外没有成员
    NoRecipients,
    /// 事件不携带用户可见消息
    NotAMessage,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NoRecipients => "no_recipients",
            SkipReason::NotAMessage => "not_a_message",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_strings() {
        assert_eq!(NotificationKind::NewMessage.as_str(), "new_message");
        assert_eq!(NotificationKind::DirectMessage.as_str(), "direct_message");
        assert_eq!(
            NotificationKind::from_str("direct_message"),
            Some(NotificationKind::DirectMessage)
        );
        assert_eq!(NotificationKind::from_str("unknown"), None);

        // serde 形式与 as_str 一致
        let json = serde_json::to_string(&NotificationKind::NewMessage).unwrap();
        assert_eq!(json, "\"new_message\"");
    }
}
