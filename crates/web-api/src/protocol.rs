//! WebSocket 线协议
//!
//! 客户端帧和服务端帧都是带 `type` 标签的 JSON 对象。
//! 经由频道投递的服务端帧额外带一个 `channel` 字段，取值为频道主题。

use domain::{ChannelAddress, HubEvent, InboundMessage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// 客户端发送的消息类型
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientFrame {
    /// 聊天消息，`recipients` 为空即广播
    #[serde(rename_all = "camelCase")]
    Message {
        #[serde(default)]
        sender_name: String,
        #[serde(default)]
        text: String,
        #[serde(default)]
        recipients: Vec<Value>,
    },
    /// 状态更新
    Status {
        #[serde(default)]
        hidden: bool,
        #[serde(default)]
        busy: bool,
    },
    /// 客户端就绪，请求立即刷新在线列表
    Ready,
    /// 心跳
    Ping,
}

impl ClientFrame {
    pub fn decode(text: &str) -> Result<Self, FrameError> {
        serde_json::from_str(text).map_err(FrameError::Decode)
    }
}

/// 把消息帧转换为入站消息。
///
/// 空列表即广播。非字符串的接收者与离线用户同等对待，直接丢弃；
/// 列表非空时消息始终是定向的，哪怕丢弃后一个接收者也不剩。
pub fn inbound_message(sender_name: String, text: String, recipients: Vec<Value>) -> InboundMessage {
    if recipients.is_empty() {
        return InboundMessage::broadcast(sender_name, text);
    }
    let recipients = recipients.into_iter().filter_map(|value| match value {
        Value::String(id) => Some(id),
        _ => None,
    });
    InboundMessage::targeted(sender_name, text, recipients)
}

/// 不经过频道、直接回给当前连接的帧
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DirectFrame {
    Pong,
    Error { code: &'static str, message: String },
}

impl DirectFrame {
    pub fn error(code: &'static str, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    pub fn encode(&self) -> Result<String, FrameError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 编码一条频道事件：事件本身的字段加上 `channel`
pub fn encode_event(address: &ChannelAddress, event: &HubEvent) -> Result<String, FrameError> {
    let mut value = serde_json::to_value(event)?;
    if let Value::Object(map) = &mut value {
        map.insert("channel".into(), Value::String(address.topic()));
    }
    Ok(serde_json::to_string(&value)?)
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed client frame: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode server frame: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("binary frames are not supported")]
    UnsupportedBinary,
}

impl FrameError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "MALFORMED_FRAME",
            Self::Encode(_) => "INTERNAL_ERROR",
            Self::UnsupportedBinary => "UNSUPPORTED_FRAME",
        }
    }
}
