use std::sync::Arc;

use domain::{ChannelAddress, ConnectionId, ConnectionMetadata, HubEvent, PresenceRecord};

use crate::clock::Clock;
use crate::presence::PresencePublisher;
use crate::publisher::{deliver, ChannelPublisher};
use crate::registry::SessionRegistry;

/// 连接生命周期管理器
///
/// 每个连接的状态机：未注册 → 已注册 → 未注册（断开即终态，重连会拿到新的连接ID）。
#[derive(Clone)]
pub struct ConnectionLifecycle {
    registry: Arc<SessionRegistry>,
    presence: PresencePublisher,
    publisher: Arc<dyn ChannelPublisher>,
    clock: Arc<dyn Clock>,
}

impl ConnectionLifecycle {
    pub fn new(
        registry: Arc<SessionRegistry>,
        presence: PresencePublisher,
        publisher: Arc<dyn ChannelPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            presence,
            publisher,
            clock,
        }
    }

    /// 注册新连接，广播上线通知并刷新在线列表。总是成功。
    pub async fn on_connect(&self, connection_id: ConnectionId, metadata: ConnectionMetadata) {
        let now = self.clock.now();
        let record = PresenceRecord::new(connection_id.clone(), metadata, now);
        let display_name = record.display_name.clone();

        if let Some(previous) = self.registry.add(record).await {
            tracing::warn!(
                connection_id = %connection_id,
                previous = %previous.display_name,
                "连接ID重复注册，旧记录已被覆盖"
            );
        }
        tracing::info!(connection_id = %connection_id, display_name = %display_name, "用户已连接");

        deliver(
            self.publisher.as_ref(),
            &ChannelAddress::Broadcast,
            HubEvent::connected(&display_name, now),
        )
        .await;
        self.presence.publish().await;
    }

    /// 注销连接。重复或未知的连接ID直接忽略。
    pub async fn on_disconnect(&self, connection_id: &ConnectionId) {
        let Some(record) = self.registry.remove(connection_id).await else {
            tracing::debug!(connection_id = %connection_id, "连接未注册或已注销，忽略断开信号");
            return;
        };
        tracing::info!(
            connection_id = %connection_id,
            display_name = %record.display_name,
            "用户已断开"
        );

        deliver(
            self.publisher.as_ref(),
            &ChannelAddress::Broadcast,
            HubEvent::disconnected(&record.display_name, self.clock.now()),
        )
        .await;
        self.presence.publish().await;
    }
}
