use std::sync::Arc;

use application::{ChatHub, LocalChannelPublisher};

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<ChatHub>,
    pub publisher: LocalChannelPublisher,
    /// 每个连接出站队列的长度
    pub outbound_buffer: usize,
}

impl AppState {
    pub fn new(hub: Arc<ChatHub>, publisher: LocalChannelPublisher, outbound_buffer: usize) -> Self {
        Self {
            hub,
            publisher,
            outbound_buffer: outbound_buffer.max(1),
        }
    }
}
