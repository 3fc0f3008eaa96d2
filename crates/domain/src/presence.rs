//! 在线状态模型
//!
//! 定义连接元数据、在线记录以及对外公开的在线视图。

use serde::{Deserialize, Serialize};

use crate::value_objects::{ConnectionId, Timestamp};

/// 握手阶段由传输层组装的连接元数据。
///
/// 缺失的字段一律降级为空字符串，从不拒绝连接。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionMetadata {
    pub public_id: String,
    pub private_id: String,
    pub display_name: String,
}

impl ConnectionMetadata {
    pub fn new(
        public_id: impl Into<String>,
        private_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            public_id: public_id.into(),
            private_id: private_id.into(),
            display_name: display_name.into(),
        }
    }

    /// 从可选字段构建，缺失值使用空字符串
    pub fn from_parts(
        public_id: Option<String>,
        private_id: Option<String>,
        display_name: Option<String>,
    ) -> Self {
        Self {
            public_id: public_id.unwrap_or_default(),
            private_id: private_id.unwrap_or_default(),
            display_name: display_name.unwrap_or_default(),
        }
    }
}

/// 一个已连接参与者的在线记录。
///
/// `private_id` 是该用户私有频道的投递地址，绝不能出现在任何对外视图中，
/// 因此这里刻意不实现 `Serialize`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    pub connection_id: ConnectionId,
    pub public_id: String,
    pub private_id: String,
    pub display_name: String,
    pub hidden: bool,
    pub busy: bool,
    pub connected_at: Timestamp,
}

impl PresenceRecord {
    pub fn new(
        connection_id: ConnectionId,
        metadata: ConnectionMetadata,
        connected_at: Timestamp,
    ) -> Self {
        Self {
            connection_id,
            public_id: metadata.public_id,
            private_id: metadata.private_id,
            display_name: metadata.display_name,
            hidden: false,
            busy: false,
            connected_at,
        }
    }

    /// 生成对外公开的视图（剥离私有ID）
    pub fn public_view(&self) -> PresenceView {
        PresenceView {
            public_id: self.public_id.clone(),
            display_name: self.display_name.clone(),
            busy: self.busy,
        }
    }
}

/// 在线列表中对其他参与者可见的部分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceView {
    pub public_id: String,
    pub display_name: String,
    pub busy: bool,
}

/// 客户端发来的状态更新，隐式作用于发送它的连接
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusUpdate {
    pub hidden: bool,
    pub busy: bool,
}

impl StatusUpdate {
    pub fn new(hidden: bool, busy: bool) -> Self {
        Self { hidden, busy }
    }
}
