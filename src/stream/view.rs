use std::collections::{HashMap, HashSet};
use rand::RngCore;

use crate::model::{EventPayload, MembershipOp, StreamEvent, StreamId, UserId, MINIBLOCK_HASH_LEN};

/// 流的只读快照视图
///
/// 成员集合反映快照时刻的状态；快照生成后不再变化。
/// 调度器只读取视图，从不修改
#[derive(Debug, Clone)]
pub struct StreamView {
    stream_id: StreamId,
    space_id: Option<StreamId>,
    members: HashSet<UserId>,
}

impl StreamView {
    pub fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    /// 归属空间 ID（仅空间频道存在）
    pub fn space_id(&self) -> Option<&StreamId> {
        self.space_id.as_ref()
    }

    /// 当前成员集合（快照）
    pub fn members(&self) -> &HashSet<UserId> {
        &self.members
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.members.contains(user_id)
    }
}

/// 活动流：按序应用事件，维护成员关系与迷你块哈希链
#[derive(Debug)]
pub struct Stream {
    stream_id: StreamId,
    space_id: Option<StreamId>,
    /// user_id -> 最近一次成员操作；成员 = 最近操作为 Join 的用户
    memberships: HashMap<UserId, MembershipOp>,
    /// 链尾迷你块哈希（新事件的 prev_miniblock_hash 取自这里）
    last_miniblock_hash: Vec<u8>,
    /// 已应用的事件数
    event_count: u64,
}

impl Stream {
    /// 创建新流（创世块哈希随机）
    pub fn new(stream_id: StreamId, space_id: Option<StreamId>) -> Self {
        let mut genesis = vec![0u8; MINIBLOCK_HASH_LEN];
        rand::thread_rng().fill_bytes(&mut genesis);
        Self {
            stream_id,
            space_id,
            memberships: HashMap::new(),
            last_miniblock_hash: genesis,
            event_count: 0,
        }
    }

    pub fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    pub fn last_miniblock_hash(&self) -> &[u8] {
        &self.last_miniblock_hash
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// 应用一个事件
    ///
    /// 成员事件更新成员关系；消息与创建事件不改变它
    pub fn apply(&mut self, event: &StreamEvent) {
        if let EventPayload::Membership { op, user_id } = &event.payload {
            self.memberships.insert(user_id.clone(), *op);
        }
        self.event_count += 1;
    }

    /// 构造携带链尾哈希的新事件
    pub fn make_event(&self, creator: impl Into<UserId>, payload: EventPayload) -> StreamEvent {
        StreamEvent::new(creator, self.last_miniblock_hash.clone(), payload)
    }

    /// 生成当前时点的只读视图
    pub fn view(&self) -> StreamView {
        StreamView {
            stream_id: self.stream_id.clone(),
            space_id: self.space_id.clone(),
            members: self
                .memberships
                .iter()
                .filter(|(_, op)| **op == MembershipOp::Join)
                .map(|(user_id, _)| user_id.clone())
                .collect(),
        }
    }
}
