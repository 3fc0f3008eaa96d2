use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use domain::{ChannelAddress, ConnectionId, HubEvent, InboundMessage};

use crate::clock::Clock;
use crate::publisher::{deliver, ChannelPublisher};
use crate::registry::SessionRegistry;

/// 消息路由器
///
/// 接收者为空时广播到公共频道；否则定向投递到发送者自己以及每个匹配接收者的私有频道。
/// 找不到的接收者直接跳过，不向发送者反馈，也不排队。
#[derive(Clone)]
pub struct MessageRouter {
    registry: Arc<SessionRegistry>,
    publisher: Arc<dyn ChannelPublisher>,
    clock: Arc<dyn Clock>,
}

impl MessageRouter {
    pub fn new(
        registry: Arc<SessionRegistry>,
        publisher: Arc<dyn ChannelPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            publisher,
            clock,
        }
    }

    pub async fn route_message(&self, connection_id: &ConnectionId, message: InboundMessage) {
        // 已注销的连接发来的消息一律丢弃，广播和定向一视同仁
        let Some(sender) = self.registry.get(connection_id).await else {
            tracing::debug!(connection_id = %connection_id, "发送者已不在线，丢弃消息");
            return;
        };

        // 服务器时间为准，客户端时间一概不用
        let is_broadcast = message.is_broadcast();
        let message = message.stamp(self.clock.now());

        if is_broadcast {
            tracing::debug!(connection_id = %connection_id, "广播消息");
            deliver(
                self.publisher.as_ref(),
                &ChannelAddress::Broadcast,
                HubEvent::Chat(message),
            )
            .await;
            return;
        }

        // 先拿到地址快照，读锁释放后才开始投递
        let targets = self
            .resolve_targets(sender.private_id, &message.recipient_public_ids)
            .await;

        tracing::debug!(
            connection_id = %connection_id,
            requested = message.recipient_public_ids.len(),
            channels = targets.len(),
            "定向投递消息"
        );

        let event = HubEvent::Chat(message);
        for address in &targets {
            deliver(self.publisher.as_ref(), address, event.clone()).await;
        }
    }

    /// 解析定向投递的私有频道：发送者自己在前，然后是匹配的接收者。
    /// 同一私有频道只投递一次。
    async fn resolve_targets(
        &self,
        sender_private_id: String,
        recipient_public_ids: &BTreeSet<String>,
    ) -> Vec<ChannelAddress> {
        let recipients = self.registry.find_by_public_ids(recipient_public_ids).await;

        let mut seen = HashSet::new();
        std::iter::once(sender_private_id)
            .chain(recipients.into_iter().map(|record| record.private_id))
            .filter(|private_id| seen.insert(private_id.clone()))
            .map(ChannelAddress::Private)
            .collect()
    }
}
