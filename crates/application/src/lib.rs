//! 应用层实现。
//!
//! 这里是聊天中心的核心：会话注册表、连接生命周期、消息路由、
//! 在线列表发布与状态更新，以及对外部发布原语的抽象。

pub mod clock;
pub mod hub;
pub mod lifecycle;
pub mod local_publisher;
pub mod presence;
pub mod publisher;
pub mod registry;
pub mod router;
pub mod status;

#[cfg(test)]
mod test_support;

pub use clock::{Clock, SystemClock};
pub use hub::{ChatHub, ChatHubDependencies};
pub use lifecycle::ConnectionLifecycle;
pub use local_publisher::{ChannelSubscription, LocalChannelPublisher};
pub use presence::PresencePublisher;
pub use publisher::{ChannelPublisher, Envelope, PublishError};
pub use registry::SessionRegistry;
pub use router::MessageRouter;
pub use status::StatusUpdateHandler;
