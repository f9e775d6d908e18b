use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::infra::metrics;
use crate::model::{StreamEvent, UserId};
use crate::push::sink::NotificationSink;
use crate::push::types::{
    DispatchOutcome, NotificationContent, NotificationKind, NotificationPayload,
    NotificationRequest, SkipReason,
};
use crate::stream::StreamView;

/// Notification Dispatcher（通知调度器）
///
/// 职责：
/// - 依据流 ID 前缀解析通知类型（频道消息 / 直发消息）
/// - 从成员快照解析接收者集合（成员 − 发送者）
/// - 构造结构化请求体并经 Sink 发送一次
///
/// 无内部可变状态，可在不同事件间并发调用；
/// 取消语义由底层 HTTP 客户端超时承担
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// 为一个已落流的事件发送至多一条推送通知
    ///
    /// 接收者 = 快照成员 − 发送者，以调度时刻的成员关系为准。
    /// 空接收者与非消息事件是合法的 no-op，不是错误
    pub async fn send_push_notification(
        &self,
        view: &StreamView,
        sender_id: &UserId,
        event: &StreamEvent,
    ) -> Result<DispatchOutcome> {
        if !event.payload.is_message() {
            debug!(
                "[DISPATCHER] Skip non-message event: stream_id={}",
                view.stream_id()
            );
            metrics::record_notification_skipped(SkipReason::NotAMessage);
            return Ok(DispatchOutcome::Skipped(SkipReason::NotAMessage));
        }

        // 通知类型由流 ID 前缀决定
        let kind = if view.stream_id().is_direct() {
            NotificationKind::DirectMessage
        } else {
            NotificationKind::NewMessage
        };

        // 发送者无条件排除，即使并非成员
        let recipients: Vec<UserId> = view
            .members()
            .iter()
            .filter(|member| *member != sender_id)
            .cloned()
            .collect();

        if recipients.is_empty() {
            debug!(
                "[DISPATCHER] No recipients, skip notification: stream_id={}, sender_id={}",
                view.stream_id(),
                sender_id
            );
            metrics::record_notification_skipped(SkipReason::NoRecipients);
            return Ok(DispatchOutcome::Skipped(SkipReason::NoRecipients));
        }

        let notification_id = Uuid::new_v4().to_string();
        let request = self.build_request(kind, view, sender_id, event, recipients)?;

        let started = Instant::now();
        match self.sink.send(&request).await {
            Ok(()) => {
                metrics::record_notification_sent(started.elapsed().as_secs_f64());
                info!(
                    "[DISPATCHER] Notification sent: notification_id={}, kind={}, stream_id={}, recipients={}",
                    notification_id,
                    kind.as_str(),
                    view.stream_id(),
                    request.users.len()
                );
                Ok(DispatchOutcome::Sent {
                    notification_id,
                    recipient_count: request.users.len(),
                })
            }
            Err(e) => {
                metrics::record_notification_failure();
                error!(
                    "[DISPATCHER] Notification delivery failed: notification_id={}, stream_id={}, error={}",
                    notification_id,
                    view.stream_id(),
                    e
                );
                Err(e)
            }
        }
    }

    /// 构造请求体
    ///
    /// new_message 必须携带归属空间；direct_message 必须不带
    /// spaceId 键、且额外携带 recipients
    fn build_request(
        &self,
        kind: NotificationKind,
        view: &StreamView,
        sender_id: &UserId,
        event: &StreamEvent,
        recipients: Vec<UserId>,
    ) -> Result<NotificationRequest> {
        let space_id = match kind {
            NotificationKind::NewMessage => Some(view.space_id().cloned().ok_or_else(|| {
                ServerError::Validation(format!(
                    "space channel {} has no owning space",
                    view.stream_id()
                ))
            })?),
            NotificationKind::DirectMessage => None,
        };

        let recipients_field = match kind {
            NotificationKind::DirectMessage => Some(recipients.clone()),
            NotificationKind::NewMessage => None,
        };

        Ok(NotificationRequest {
            sender: sender_id.clone(),
            users: recipients,
            payload: NotificationPayload {
                content: NotificationContent {
                    kind,
                    space_id,
                    channel_id: view.stream_id().clone(),
                    sender_id: sender_id.clone(),
                    event: event.clone(),
                    recipients: recipients_field,
                },
            },
        })
    }

    /// 即发即弃模式：在独立任务上调度，失败只记日志，不阻塞调用方
    ///
    /// 事件落流路径上的调用方不应被通知服务拖慢；
    /// 需要拿到结果时使用 send_push_notification
    pub fn dispatch_detached(&self, view: StreamView, sender_id: UserId, event: StreamEvent) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher
                .send_push_notification(&view, &sender_id, &event)
                .await
            {
                error!(
                    "[DISPATCHER] Detached dispatch failed: stream_id={}, error={}",
                    view.stream_id(),
                    e
                );
            }
        });
    }
}
