//! Prometheus 指标：通知发送量、投递失败量、跳过量与发送耗时
//!
//! 通过 `init()` 安装全局 Recorder，`render_metrics()` 输出文本格式供抓取端点使用。

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::OnceLock;

use crate::push::types::SkipReason;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// 指标名称
const COUNTER_NOTIFICATIONS_SENT: &str = "streampush_notifications_sent_total";
const COUNTER_NOTIFICATION_FAILURES: &str = "streampush_notification_failures_total";
const COUNTER_NOTIFICATIONS_SKIPPED: &str = "streampush_notifications_skipped_total";
const HISTOGRAM_SEND_DURATION: &str = "streampush_notification_send_duration_seconds";

/// 初始化 Prometheus 指标（安装全局 Recorder，返回 Handle 用于文本渲染）。
/// 仅需在进程内调用一次；重复调用会返回 Err。
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    HANDLE
        .set(handle)
        .map_err(|_| "metrics already initialized")?;
    Ok(())
}

/// 是否已初始化
pub fn is_initialized() -> bool {
    HANDLE.get().is_some()
}

/// 渲染当前指标为 Prometheus 文本格式
pub fn render_metrics() -> Option<String> {
    HANDLE.get().map(|h| h.render())
}

/// 记录一次成功发送：总次数 + 耗时直方图
pub fn record_notification_sent(duration_secs: f64) {
    metrics::counter!(COUNTER_NOTIFICATIONS_SENT).increment(1);
    metrics::histogram!(HISTOGRAM_SEND_DURATION).record(duration_secs);
}

/// 记录一次投递失败
pub fn record_notification_failure() {
    metrics::counter!(COUNTER_NOTIFICATION_FAILURES).increment(1);
}

/// 记录一次合法跳过（按原因打标签）
pub fn record_notification_skipped(reason: SkipReason) {
    metrics::counter!(COUNTER_NOTIFICATIONS_SKIPPED, "reason" => reason.as_str()).increment(1);
}
