//! 投递频道地址
//!
//! 核心只认识三类保留地址：公共广播频道、在线列表频道，以及按 `private_id`
//! 区分的私有频道。

use std::fmt;

/// 公共广播频道
pub const BROADCAST_TOPIC: &str = "/topic/public";
/// 在线列表频道
pub const PRESENCE_TOPIC: &str = "/topic/users";
/// 私有频道前缀
pub const PRIVATE_TOPIC_PREFIX: &str = "/queue/private/";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelAddress {
    Broadcast,
    Presence,
    Private(String),
}

impl ChannelAddress {
    pub fn private(private_id: impl Into<String>) -> Self {
        Self::Private(private_id.into())
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Self::Private(_))
    }

    /// 频道对应的主题字符串
    pub fn topic(&self) -> String {
        match self {
            Self::Broadcast => BROADCAST_TOPIC.to_owned(),
            Self::Presence => PRESENCE_TOPIC.to_owned(),
            Self::Private(id) => format!("{PRIVATE_TOPIC_PREFIX}{id}"),
        }
    }
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Broadcast => f.write_str(BROADCAST_TOPIC),
            Self::Presence => f.write_str(PRESENCE_TOPIC),
            Self::Private(id) => write!(f, "{PRIVATE_TOPIC_PREFIX}{id}"),
        }
    }
}
