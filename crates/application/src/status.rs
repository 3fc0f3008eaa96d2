use std::sync::Arc;

use domain::{ConnectionId, StatusUpdate};

use crate::presence::PresencePublisher;
use crate::registry::SessionRegistry;

/// 状态更新处理器：修改连接的隐身/忙碌标记。
///
/// 只要连接仍在，就会刷新在线列表，不判断标记是否真的变化。
#[derive(Clone)]
pub struct StatusUpdateHandler {
    registry: Arc<SessionRegistry>,
    presence: PresencePublisher,
}

impl StatusUpdateHandler {
    pub fn new(registry: Arc<SessionRegistry>, presence: PresencePublisher) -> Self {
        Self { registry, presence }
    }

    pub async fn update_status(&self, connection_id: &ConnectionId, update: StatusUpdate) {
        let updated = self
            .registry
            .update_flags(connection_id, update.hidden, update.busy)
            .await;
        if !updated {
            tracing::debug!(connection_id = %connection_id, "连接已断开，忽略状态更新");
            return;
        }

        tracing::info!(
            connection_id = %connection_id,
            hidden = update.hidden,
            busy = update.busy,
            "用户状态已更新"
        );
        self.presence.publish().await;
    }
}
