use std::sync::Arc;
use tracing::info;

use streampush::logging::init_logging;
use streampush::model::{EventPayload, StreamId};
use streampush::push::{MockSink, NotificationDispatcher};
use streampush::stream::StreamRegistry;
use streampush::infra::metrics;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // 初始化日志与指标
    init_logging("debug", None)?;
    metrics::init()?;

    info!("🚀 推送调度演示开始");

    // 演示用 Mock Sink；接真实通知服务时换成 HttpSink::new(&PushConfig::load()?)
    let sink = Arc::new(MockSink::new());
    let dispatcher = NotificationDispatcher::new(sink.clone());

    // 搭建一个空间频道：alice、bob、carol 三个成员
    let registry = StreamRegistry::new();
    let space_id = StreamId::space();
    let channel_id = registry.create_space_channel(&space_id);
    for member in ["alice", "bob", "carol"] {
        registry.join(&channel_id, member)?;
    }
    info!("✅ 频道就绪: channel_id={}, space_id={}", channel_id, space_id);

    // 演示1: alice 发消息，bob 和 carol 收到通知
    let event = registry.make_event(
        &channel_id,
        "alice",
        EventPayload::ChannelMessage { message: "hello everyone".to_string() },
    )?;
    registry.add_event(&channel_id, &event)?;
    let view = registry.view(&channel_id)?;
    let outcome = dispatcher
        .send_push_notification(&view, &"alice".to_string(), &event)
        .await?;
    info!("📨 演示1 调度结果: {:?}", outcome);

    // 演示2: bob 离开后再发，只有 carol 收到
    registry.leave(&channel_id, "bob")?;
    let event = registry.make_event(
        &channel_id,
        "alice",
        EventPayload::ChannelMessage { message: "anyone still here?".to_string() },
    )?;
    registry.add_event(&channel_id, &event)?;
    let view = registry.view(&channel_id)?;
    let outcome = dispatcher
        .send_push_notification(&view, &"alice".to_string(), &event)
        .await?;
    info!("📨 演示2 调度结果: {:?}", outcome);

    // 演示3: 群聊消息（direct_message，spaceId 缺席）
    let gdm_id = registry.create_gdm_channel();
    for member in ["alice", "bob", "carol"] {
        registry.join(&gdm_id, member)?;
    }
    let event = registry.make_event(
        &gdm_id,
        "carol",
        EventPayload::DmMessage { message: "group chat!".to_string() },
    )?;
    registry.add_event(&gdm_id, &event)?;
    let view = registry.view(&gdm_id)?;
    let outcome = dispatcher
        .send_push_notification(&view, &"carol".to_string(), &event)
        .await?;
    info!("📨 演示3 调度结果: {:?}", outcome);

    // 打印捕获到的请求体与指标
    for (i, request) in sink.requests().await.iter().enumerate() {
        info!(
            "📦 请求 {}: {}",
            i + 1,
            serde_json::to_string_pretty(request)?
        );
    }
    if let Some(rendered) = metrics::render_metrics() {
        info!("📊 指标:\n{}", rendered);
    }

    info!("🎉 演示结束");
    Ok(())
}
