use std::sync::Arc;

use domain::{ChannelAddress, HubEvent, PresenceView};

use crate::publisher::{deliver, ChannelPublisher};
use crate::registry::SessionRegistry;

/// 在线列表发布器
///
/// 从注册表快照计算对外可见的在线列表：过滤隐身用户，剥离私有ID，
/// 然后发布到在线列表频道。
#[derive(Clone)]
pub struct PresencePublisher {
    registry: Arc<SessionRegistry>,
    publisher: Arc<dyn ChannelPublisher>,
}

impl PresencePublisher {
    pub fn new(registry: Arc<SessionRegistry>, publisher: Arc<dyn ChannelPublisher>) -> Self {
        Self {
            registry,
            publisher,
        }
    }

    /// 计算当前在线列表，但不发布
    pub async fn snapshot(&self) -> Vec<PresenceView> {
        self.registry
            .all_records()
            .await
            .iter()
            .filter(|record| !record.hidden)
            .map(|record| record.public_view())
            .collect()
    }

    pub async fn publish(&self) {
        let users = self.snapshot().await;
        tracing::debug!(visible = users.len(), "发布在线列表");
        deliver(
            self.publisher.as_ref(),
            &ChannelAddress::Presence,
            HubEvent::Presence { users },
        )
        .await;
    }
}
