//! 聊天中心门面
//!
//! 传输层只与 [`ChatHub`] 交互：连接/断开信号、入站消息、状态更新以及主动刷新在线列表。
//! 注册表由门面持有，构造时创建、随门面一起销毁，没有全局状态。

use std::sync::Arc;

use domain::{ConnectionId, ConnectionMetadata, InboundMessage, PresenceView, StatusUpdate};

use crate::clock::Clock;
use crate::lifecycle::ConnectionLifecycle;
use crate::presence::PresencePublisher;
use crate::publisher::ChannelPublisher;
use crate::registry::SessionRegistry;
use crate::router::MessageRouter;
use crate::status::StatusUpdateHandler;

pub struct ChatHubDependencies {
    pub publisher: Arc<dyn ChannelPublisher>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct ChatHub {
    registry: Arc<SessionRegistry>,
    presence: PresencePublisher,
    lifecycle: ConnectionLifecycle,
    router: MessageRouter,
    status: StatusUpdateHandler,
}

impl ChatHub {
    pub fn new(deps: ChatHubDependencies) -> Self {
        let ChatHubDependencies { publisher, clock } = deps;
        let registry = Arc::new(SessionRegistry::new());
        let presence = PresencePublisher::new(registry.clone(), publisher.clone());
        let lifecycle = ConnectionLifecycle::new(
            registry.clone(),
            presence.clone(),
            publisher.clone(),
            clock.clone(),
        );
        let router = MessageRouter::new(registry.clone(), publisher, clock);
        let status = StatusUpdateHandler::new(registry.clone(), presence.clone());

        Self {
            registry,
            presence,
            lifecycle,
            router,
            status,
        }
    }

    pub async fn on_connect(&self, connection_id: ConnectionId, metadata: ConnectionMetadata) {
        self.lifecycle.on_connect(connection_id, metadata).await;
    }

    pub async fn on_disconnect(&self, connection_id: &ConnectionId) {
        self.lifecycle.on_disconnect(connection_id).await;
    }

    pub async fn route_message(&self, connection_id: &ConnectionId, message: InboundMessage) {
        self.router.route_message(connection_id, message).await;
    }

    pub async fn update_status(&self, connection_id: &ConnectionId, update: StatusUpdate) {
        self.status.update_status(connection_id, update).await;
    }

    /// 立即发布一次在线列表
    pub async fn request_presence_refresh(&self) {
        self.presence.publish().await;
    }

    /// 当前在线列表（不发布）
    pub async fn presence_snapshot(&self) -> Vec<PresenceView> {
        self.presence.snapshot().await
    }

    pub async fn online_count(&self) -> usize {
        self.registry.len().await
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }
}
