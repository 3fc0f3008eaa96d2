//! Web API 层。
//!
//! 提供 Axum 路由与 WebSocket 连接循环，把客户端帧交给应用层的聊天中心，
//! 再把本地发布器上的事件按订阅转发回每个连接。

mod clock_sync;
mod handshake;
pub mod protocol;
mod routes;
mod state;
mod ws_connection;

pub use clock_sync::spawn_clock_sync;
pub use handshake::{connection_metadata, ConnectQuery};
pub use routes::{cors_layer, router};
pub use state::AppState;
