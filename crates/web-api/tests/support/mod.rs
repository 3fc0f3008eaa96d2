#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use application::{ChatHub, ChatHubDependencies, LocalChannelPublisher, SystemClock};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use web_api::{router, AppState};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    pub hub: Arc<ChatHub>,
}

impl TestServer {
    pub fn ws_url(&self, public_id: &str, private_id: &str, display_name: &str) -> String {
        format!(
            "ws://{}/api/v1/ws?publicId={public_id}&privateId={private_id}&displayName={display_name}",
            self.addr
        )
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub async fn connect(&self, public_id: &str, private_id: &str, display_name: &str) -> Client {
        let (client, _) = connect_async(self.ws_url(public_id, private_id, display_name))
            .await
            .expect("websocket handshake");
        client
    }

    /// 等到注册表中的连接数达到期望值
    pub async fn wait_for_online(&self, expected: usize) {
        timeout(Duration::from_secs(5), async {
            while self.hub.online_count().await != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("online count never reached the expected value");
    }
}

pub async fn spawn_server() -> TestServer {
    let publisher = LocalChannelPublisher::new(256);
    let hub = Arc::new(ChatHub::new(ChatHubDependencies {
        publisher: Arc::new(publisher.clone()),
        clock: Arc::new(SystemClock),
    }));
    let app = router(AppState::new(hub.clone(), publisher, 32));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server error");
    });

    TestServer { addr, hub }
}

pub async fn send_json(client: &mut Client, value: Value) {
    client
        .send(Message::Text(value.to_string().into()))
        .await
        .expect("send frame");
}

/// 读取下一个满足条件的文本帧，其余帧跳过
pub async fn next_matching<F>(client: &mut Client, mut predicate: F) -> Value
where
    F: FnMut(&Value) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            let message = client
                .next()
                .await
                .expect("stream ended")
                .expect("websocket error");
            if let Message::Text(text) = message {
                let value: Value = serde_json::from_str(text.as_str()).expect("json frame");
                if predicate(&value) {
                    return value;
                }
            }
        }
    })
    .await
    .expect("timed out waiting for frame")
}

/// 在给定时间内断言没有满足条件的帧到达
pub async fn assert_no_matching<F>(client: &mut Client, mut predicate: F, wait: Duration)
where
    F: FnMut(&Value) -> bool,
{
    let result = timeout(wait, async {
        while let Some(Ok(message)) = client.next().await {
            if let Message::Text(text) = message {
                let value: Value = serde_json::from_str(text.as_str()).expect("json frame");
                if predicate(&value) {
                    return Some(value);
                }
            }
        }
        None
    })
    .await;
    if let Ok(Some(value)) = result {
        panic!("unexpected frame: {value}");
    }
}

pub fn is_type(value: &Value, kind: &str) -> bool {
    value["type"] == kind
}

pub fn is_chat_with_text(value: &Value, text: &str) -> bool {
    is_type(value, "chat") && value["text"] == text
}

pub fn presence_names(value: &Value) -> Vec<String> {
    value["users"]
        .as_array()
        .map(|users| {
            users
                .iter()
                .filter_map(|user| user["displayName"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
