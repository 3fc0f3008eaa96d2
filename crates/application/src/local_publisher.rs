// 进程内的频道发布器实现
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{ChannelAddress, HubEvent};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::publisher::{ChannelPublisher, Envelope, PublishError};

#[derive(Clone)]
pub struct LocalChannelPublisher {
    sender: broadcast::Sender<Arc<Envelope>>,
}

impl LocalChannelPublisher {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// 订阅一组频道，只会收到发往这些频道的事件
    pub fn subscribe<I>(&self, addresses: I) -> ChannelSubscription
    where
        I: IntoIterator<Item = ChannelAddress>,
    {
        ChannelSubscription::new(self.sender.subscribe(), addresses.into_iter().collect())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LocalChannelPublisher {
    fn default() -> Self {
        Self::new(1000)
    }
}

#[async_trait]
impl ChannelPublisher for LocalChannelPublisher {
    async fn publish(&self, address: &ChannelAddress, event: HubEvent) -> Result<(), PublishError> {
        let envelope = Arc::new(Envelope::new(address.clone(), event));
        // 没有订阅者时 send 会失败，这不是错误：频道上此刻没人收听
        if let Err(err) = self.sender.send(envelope) {
            tracing::debug!(channel = %address, kind = err.0.event.kind(), "频道没有订阅者");
        }
        Ok(())
    }
}

// 按频道过滤的消息流
pub struct ChannelSubscription {
    receiver: broadcast::Receiver<Arc<Envelope>>,
    addresses: HashSet<ChannelAddress>,
}

impl ChannelSubscription {
    pub fn new(receiver: broadcast::Receiver<Arc<Envelope>>, addresses: HashSet<ChannelAddress>) -> Self {
        Self {
            receiver,
            addresses,
        }
    }

    /// 等待下一条属于已订阅频道的事件；发布器关闭时返回 `None`
    pub async fn recv(&mut self) -> Option<Arc<Envelope>> {
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => {
                    if self.addresses.contains(&envelope.address) {
                        return Some(envelope);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "订阅者处理过慢，部分事件被跳过");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
