use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value_objects::Timestamp;

/// 传输层解码后的入站聊天消息，尚未打上服务器时间戳。
///
/// 客户端没有给出接收者时为广播。给出了接收者列表就是定向消息，
/// 即使列表里的项全部无效，也只会回显给发送者自己。
/// 发送者名称直接取自客户端，不与注册表交叉校验。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_name: String,
    pub text: String,
    pub recipient_public_ids: BTreeSet<String>,
    direct: bool,
}

impl InboundMessage {
    pub fn broadcast(sender_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
            text: text.into(),
            recipient_public_ids: BTreeSet::new(),
            direct: false,
        }
    }

    pub fn targeted<I, S>(sender_name: impl Into<String>, text: impl Into<String>, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sender_name: sender_name.into(),
            text: text.into(),
            recipient_public_ids: recipients.into_iter().map(Into::into).collect(),
            direct: true,
        }
    }

    pub fn is_broadcast(&self) -> bool {
        !self.direct
    }

    /// 打上服务器时间戳，得到可投递的消息
    pub fn stamp(self, server_timestamp: Timestamp) -> ChatMessage {
        ChatMessage {
            sender_name: self.sender_name,
            text: self.text,
            recipient_public_ids: self.recipient_public_ids,
            server_timestamp,
        }
    }
}

/// 由路由器盖上服务器时间戳后的聊天消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub sender_name: String,
    pub text: String,
    pub recipient_public_ids: BTreeSet<String>,
    pub server_timestamp: Timestamp,
}
