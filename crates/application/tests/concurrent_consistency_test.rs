//! 并发数据一致性测试
//!
//! 验证在大量并发连接、断开、状态更新和消息路由下注册表保持一致

use std::sync::Arc;
use std::time::Duration;

use application::{ChatHub, ChatHubDependencies, LocalChannelPublisher, SystemClock};
use domain::{ConnectionId, ConnectionMetadata, InboundMessage, StatusUpdate};
use futures::future::join_all;
use tokio::time::sleep;

fn build_hub() -> ChatHub {
    ChatHub::new(ChatHubDependencies {
        publisher: Arc::new(LocalChannelPublisher::new(16)),
        clock: Arc::new(SystemClock),
    })
}

fn metadata(i: usize) -> ConnectionMetadata {
    ConnectionMetadata::new(format!("u{}", i % 7), format!("p{i}"), format!("user{i}"))
}

/// 测试并发连接/断开后注册表大小正确
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_connection_consistency() {
    let hub = build_hub();

    let connects = (0..100).map(|i| {
        let hub = hub.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis((i % 5) as u64)).await;
            hub.on_connect(ConnectionId::new(format!("s{i}")), metadata(i)).await;
        })
    });
    for result in join_all(connects).await {
        result.expect("connect task panicked");
    }
    assert_eq!(hub.online_count().await, 100);

    // 偶数连接断开两次，外加一批从未注册过的ID
    let disconnects = (0..100)
        .filter(|i| i % 2 == 0)
        .flat_map(|i| [format!("s{i}"), format!("s{i}")])
        .chain((0..20).map(|i| format!("ghost{i}")))
        .map(|id| {
            let hub = hub.clone();
            tokio::spawn(async move { hub.on_disconnect(&ConnectionId::new(id)).await })
        });
    for result in join_all(disconnects).await {
        result.expect("disconnect task panicked");
    }

    assert_eq!(hub.online_count().await, 50);
    let remaining = hub.registry().all_records().await;
    assert!(remaining
        .iter()
        .all(|record| record.connection_id.as_str()[1..].parse::<usize>().unwrap() % 2 == 1));
}

/// 测试状态更新、消息路由与断开交错执行时不会出错
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_interleaved_operations_do_not_corrupt_registry() {
    let hub = build_hub();
    for i in 0..30 {
        hub.on_connect(ConnectionId::new(format!("s{i}")), metadata(i)).await;
    }

    let tasks = (0..30).map(|i| {
        let hub = hub.clone();
        tokio::spawn(async move {
            let id = ConnectionId::new(format!("s{i}"));
            hub.update_status(&id, StatusUpdate::new(i % 3 == 0, i % 2 == 0)).await;
            hub.route_message(&id, InboundMessage::targeted(format!("user{i}"), "hi", ["u1", "u2"]))
                .await;
            hub.route_message(&id, InboundMessage::broadcast(format!("user{i}"), "hello"))
                .await;
            if i % 3 == 0 {
                hub.on_disconnect(&id).await;
                // 断开后的状态更新是静默空操作
                hub.update_status(&id, StatusUpdate::new(false, false)).await;
            }
        })
    });
    for result in join_all(tasks).await {
        result.expect("task panicked");
    }

    assert_eq!(hub.online_count().await, 20);
    let visible = hub.presence_snapshot().await;
    assert_eq!(visible.len(), 20, "hidden users were exactly the ones that left");
}
