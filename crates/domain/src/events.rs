//! 核心向外发布的事件
//!
//! 每个事件都经由发布原语投递到某个频道，序列化后即为客户端收到的载荷。

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::presence::PresenceView;
use crate::value_objects::Timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HubEvent {
    /// 聊天消息（广播或定向）
    Chat(ChatMessage),
    /// 系统通知，例如用户上线/下线
    #[serde(rename_all = "camelCase")]
    System {
        text: String,
        server_timestamp: Timestamp,
    },
    /// 过滤后的在线列表
    Presence { users: Vec<PresenceView> },
    /// 时钟同步
    #[serde(rename_all = "camelCase")]
    Clock { server_time: Timestamp },
}

impl HubEvent {
    pub fn system(text: impl Into<String>, server_timestamp: Timestamp) -> Self {
        Self::System {
            text: text.into(),
            server_timestamp,
        }
    }

    pub fn connected(display_name: &str, at: Timestamp) -> Self {
        Self::system(format!("{display_name} connected"), at)
    }

    pub fn disconnected(display_name: &str, at: Timestamp) -> Self {
        Self::system(format!("{display_name} disconnected"), at)
    }

    /// 事件类型名，用于日志
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::System { .. } => "system",
            Self::Presence { .. } => "presence",
            Self::Clock { .. } => "clock",
        }
    }
}
