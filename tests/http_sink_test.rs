use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use streampush::config::PushConfig;
use streampush::error::ServerError;
use streampush::model::EventPayload;
use streampush::push::{HttpSink, NotificationDispatcher, NotificationSink};
use streampush::stream::StreamRegistry;

/// 捕获到的一次通知请求
#[derive(Clone, Debug)]
struct CapturedRequest {
    authorization: Option<String>,
    content_type: Option<String>,
    body: serde_json::Value,
}

type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

async fn capture_handler(
    State((captured, status)): State<(Captured, StatusCode)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> StatusCode {
    captured.lock().await.push(CapturedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string()),
        body,
    });
    status
}

/// 启动捕获服务器（固定路径 /api/notify-users），返回 base_url 与捕获缓冲
async fn spawn_capture_server(status: StatusCode) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/notify-users", post(capture_handler))
        .with_state((captured.clone(), status));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), captured)
}

fn test_config(base_url: String) -> PushConfig {
    PushConfig {
        base_url,
        auth_token: "test-token".to_string(),
        request_timeout_secs: 5,
        ..PushConfig::default()
    }
}

#[tokio::test]
async fn test_end_to_end_post_with_bearer_auth() {
    let (base_url, captured) = spawn_capture_server(StatusCode::OK).await;

    let sink = Arc::new(HttpSink::new(&test_config(base_url)).unwrap());
    let dispatcher = NotificationDispatcher::new(sink);

    let registry = StreamRegistry::new();
    let space_id = streampush::model::StreamId::space();
    let channel_id = registry.create_space_channel(&space_id);
    registry.join(&channel_id, "alice").unwrap();
    registry.join(&channel_id, "bob").unwrap();

    let event = registry
        .make_event(
            &channel_id,
            "alice",
            EventPayload::ChannelMessage { message: "hello".to_string() },
        )
        .unwrap();
    registry.add_event(&channel_id, &event).unwrap();
    let view = registry.view(&channel_id).unwrap();

    dispatcher
        .send_push_notification(&view, &"alice".to_string(), &event)
        .await
        .unwrap();

    let captured = captured.lock().await;
    assert_eq!(captured.len(), 1);
    let request = &captured[0];

    assert_eq!(request.authorization.as_deref(), Some("Bearer test-token"));
    assert!(request
        .content_type
        .as_deref()
        .unwrap()
        .starts_with("application/json"));

    assert_eq!(request.body["sender"], "alice");
    assert_eq!(request.body["users"], serde_json::json!(["bob"]));
    assert_eq!(request.body["payload"]["content"]["kind"], "new_message");
    assert_eq!(
        request.body["payload"]["content"]["spaceId"],
        space_id.as_str()
    );
}

#[tokio::test]
async fn test_non_2xx_is_a_delivery_error() {
    let (base_url, _captured) = spawn_capture_server(StatusCode::INTERNAL_SERVER_ERROR).await;
    let sink = HttpSink::new(&test_config(base_url)).unwrap();

    let registry = StreamRegistry::new();
    let channel_id = registry.create_gdm_channel();
    registry.join(&channel_id, "alice").unwrap();
    registry.join(&channel_id, "bob").unwrap();

    let event = registry
        .make_event(
            &channel_id,
            "alice",
            EventPayload::DmMessage { message: "hi".to_string() },
        )
        .unwrap();
    registry.add_event(&channel_id, &event).unwrap();
    let view = registry.view(&channel_id).unwrap();

    let dispatcher = NotificationDispatcher::new(Arc::new(sink));
    let err = dispatcher
        .send_push_notification(&view, &"alice".to_string(), &event)
        .await
        .unwrap_err();

    assert!(matches!(err, ServerError::Delivery { status: 500, .. }));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_a_network_error() {
    // 该端口上没有监听者
    let sink = HttpSink::new(&test_config("http://127.0.0.1:9".to_string())).unwrap();

    let request = {
        let registry = StreamRegistry::new();
        let channel_id = registry.create_dm_channel();
        registry.join(&channel_id, "alice").unwrap();
        registry.join(&channel_id, "bob").unwrap();
        let event = registry
            .make_event(
                &channel_id,
                "alice",
                EventPayload::DmMessage { message: "hi".to_string() },
            )
            .unwrap();
        streampush::push::NotificationRequest {
            sender: "alice".to_string(),
            users: vec!["bob".to_string()],
            payload: streampush::push::NotificationPayload {
                content: streampush::push::NotificationContent {
                    kind: streampush::push::NotificationKind::DirectMessage,
                    space_id: None,
                    channel_id,
                    sender_id: "alice".to_string(),
                    event,
                    recipients: Some(vec!["bob".to_string()]),
                },
            },
        }
    };

    let err = sink.send(&request).await.unwrap_err();
    assert!(matches!(
        err,
        ServerError::Network(_) | ServerError::Timeout(_)
    ));
}

#[test]
fn test_sink_construction_fails_fast_on_bad_config() {
    let mut config = test_config("http://localhost:8090".to_string());
    config.auth_token = String::new();
    assert!(matches!(
        HttpSink::new(&config),
        Err(ServerError::Configuration(_))
    ));

    let mut config = test_config("not-a-url".to_string());
    config.auth_token = "token".to_string();
    assert!(matches!(
        HttpSink::new(&config),
        Err(ServerError::Configuration(_))
    ));
}

#[test]
fn test_sink_endpoint_joins_fixed_sub_path() {
    let sink = HttpSink::new(&test_config("http://notify.local:8090/".to_string())).unwrap();
    assert_eq!(sink.endpoint(), "http://notify.local:8090/api/notify-users");
}
