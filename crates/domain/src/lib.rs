//! 聊天在线中心的核心领域模型
//!
//! 包含连接标识、在线记录、聊天消息、频道地址以及对外发布的事件。

pub mod channel;
pub mod events;
pub mod message;
pub mod presence;
pub mod value_objects;

// 重新导出常用类型
pub use channel::*;
pub use events::*;
pub use message::*;
pub use presence::*;
pub use value_objects::*;
