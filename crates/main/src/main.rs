//! 主应用程序入口
//!
//! 加载配置，组装聊天中心并启动 Axum Web API 服务。

use std::sync::Arc;

use application::{ChannelPublisher, ChatHub, ChatHubDependencies, Clock, LocalChannelPublisher, SystemClock};
use config::AppConfig;
use tracing_subscriber::EnvFilter;
use web_api::{cors_layer, router, spawn_clock_sync, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        bind = %config.bind_address(),
        channel_capacity = config.hub.channel_capacity,
        "配置已加载"
    );

    // 进程内发布器，所有连接共享
    let publisher = LocalChannelPublisher::new(config.hub.channel_capacity);
    let shared_publisher: Arc<dyn ChannelPublisher> = Arc::new(publisher.clone());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let hub = Arc::new(ChatHub::new(ChatHubDependencies {
        publisher: shared_publisher.clone(),
        clock: clock.clone(),
    }));

    let clock_sync = config
        .clock_sync_interval()
        .map(|period| spawn_clock_sync(shared_publisher, clock, period));

    let state = AppState::new(hub, publisher, config.hub.outbound_buffer);
    let app = router(state).layer(cors_layer(&config.server.cors_origins));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("聊天中心启动在 http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = clock_sync {
        handle.abort();
    }
    tracing::info!("服务器已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "无法监听 Ctrl-C 信号");
        std::future::pending::<()>().await;
    }
    tracing::info!("收到停止信号，开始优雅关闭");
}
