use std::collections::HashSet;
use dashmap::DashMap;
use tracing::debug;

use crate::error::{Result, ServerError};
use crate::model::{EventPayload, MembershipOp, StreamEvent, StreamId, UserId};
use super::view::{Stream, StreamView};

/// 流注册表：进程内的活动流集合
///
/// 充当节点存储层的占位；调度器只消费它产出的 StreamView 快照
pub struct StreamRegistry {
    streams: DashMap<StreamId, Stream>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self {
            streams: DashMap::new(),
        }
    }

    /// 创建空间频道流（归属 space_id）
    pub fn create_space_channel(&self, space_id: &StreamId) -> StreamId {
        let stream_id = StreamId::channel();
        self.insert_stream(stream_id.clone(), Some(space_id.clone()));
        stream_id
    }

    /// 创建私聊流
    pub fn create_dm_channel(&self) -> StreamId {
        let stream_id = StreamId::dm_channel();
        self.insert_stream(stream_id.clone(), None);
        stream_id
    }

    /// 创建群聊流
    pub fn create_gdm_channel(&self) -> StreamId {
        let stream_id = StreamId::gdm_channel();
        self.insert_stream(stream_id.clone(), None);
        stream_id
    }

    fn insert_stream(&self, stream_id: StreamId, space_id: Option<StreamId>) {
        let mut stream = Stream::new(stream_id.clone(), space_id.clone());

        // 每个流的第一个事件是创建事件
        let inception = stream.make_event(
            "",
            EventPayload::Inception {
                stream_id: stream_id.clone(),
                space_id,
            },
        );
        stream.apply(&inception);

        debug!("[STREAM REGISTRY] Created stream: stream_id={}", stream_id);
        self.streams.insert(stream_id, stream);
    }

    /// 追加事件（消息落流 / 成员变更）
    pub fn add_event(&self, stream_id: &StreamId, event: &StreamEvent) -> Result<()> {
        let mut stream = self
            .streams
            .get_mut(stream_id)
            .ok_or_else(|| ServerError::StreamNotFound(stream_id.to_string()))?;
        stream.apply(event);
        Ok(())
    }

    /// 构造携带链尾哈希的新事件（不落流，调用方再 add_event）
    pub fn make_event(
        &self,
        stream_id: &StreamId,
        creator: &str,
        payload: EventPayload,
    ) -> Result<StreamEvent> {
        let stream = self
            .streams
            .get(stream_id)
            .ok_or_else(|| ServerError::StreamNotFound(stream_id.to_string()))?;
        Ok(stream.make_event(creator, payload))
    }

    /// 用户加入流
    pub fn join(&self, stream_id: &StreamId, user_id: &str) -> Result<()> {
        self.apply_membership(stream_id, user_id, MembershipOp::Join)
    }

    /// 用户离开流
    pub fn leave(&self, stream_id: &StreamId, user_id: &str) -> Result<()> {
        self.apply_membership(stream_id, user_id, MembershipOp::Leave)
    }

    fn apply_membership(&self, stream_id: &StreamId, user_id: &str, op: MembershipOp) -> Result<()> {
        let event = self.make_event(
            stream_id,
            user_id,
            EventPayload::Membership {
                op,
                user_id: user_id.to_string(),
            },
        )?;
        self.add_event(stream_id, &event)
    }

    /// 当前时点的只读快照视图
    pub fn view(&self, stream_id: &StreamId) -> Result<StreamView> {
        self.streams
            .get(stream_id)
            .map(|stream| stream.view())
            .ok_or_else(|| ServerError::StreamNotFound(stream_id.to_string()))
    }

    /// 成员查询
    pub fn members(&self, stream_id: &StreamId) -> Result<HashSet<UserId>> {
        Ok(self.view(stream_id)?.members().clone())
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}
