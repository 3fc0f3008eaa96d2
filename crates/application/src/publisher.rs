use async_trait::async_trait;
use domain::{ChannelAddress, HubEvent};
use thiserror::Error;

/// 发布到某个频道的一条事件
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub address: ChannelAddress,
    pub event: HubEvent,
}

impl Envelope {
    pub fn new(address: ChannelAddress, event: HubEvent) -> Self {
        Self { address, event }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish to {address} failed: {reason}")]
    Failed { address: String, reason: String },
}

impl PublishError {
    pub fn failed(address: &ChannelAddress, reason: impl Into<String>) -> Self {
        Self::Failed {
            address: address.topic(),
            reason: reason.into(),
        }
    }
}

/// 发布原语：向某个频道的当前所有订阅者发送，发后即忘。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelPublisher: Send + Sync {
    async fn publish(&self, address: &ChannelAddress, event: HubEvent) -> Result<(), PublishError>;
}

/// 发布并吞掉失败：投递是尽力而为的，失败只记录日志
pub(crate) async fn deliver(publisher: &dyn ChannelPublisher, address: &ChannelAddress, event: HubEvent) {
    let kind = event.kind();
    if let Err(err) = publisher.publish(address, event).await {
        tracing::warn!(error = %err, channel = %address, kind, "事件投递失败，已丢弃");
    }
}
