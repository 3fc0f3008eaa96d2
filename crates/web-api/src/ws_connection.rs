use application::ChannelSubscription;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use domain::{ChannelAddress, ConnectionId, ConnectionMetadata, StatusUpdate};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::protocol::{encode_event, inbound_message, ClientFrame, DirectFrame, FrameError};
use crate::state::AppState;

/// WebSocket 连接管理器
///
/// 封装单个 WebSocket 连接的所有状态和逻辑，包括：
/// - 订阅广播、在线列表和自己的私有频道
/// - 把客户端帧交给聊天中心
/// - 心跳回应
/// - 断开时注销
pub struct WebSocketConnection {
    socket: WebSocket,
    state: AppState,
    connection_id: ConnectionId,
    metadata: ConnectionMetadata,
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket, state: AppState, metadata: ConnectionMetadata) -> Self {
        let connection_id = ConnectionId::generate();
        tracing::info!(
            connection_id = %connection_id,
            public_id = %metadata.public_id,
            "WebSocket 连接已建立"
        );
        Self {
            socket,
            state,
            connection_id,
            metadata,
        }
    }

    /// 运行 WebSocket 连接的主循环，直到任一方向结束
    pub async fn run(self) {
        let Self {
            socket,
            state,
            connection_id,
            metadata,
        } = self;

        // 先订阅再注册，这样自己的上线通知和在线列表也能收到
        let subscription = state.publisher.subscribe([
            ChannelAddress::Broadcast,
            ChannelAddress::Presence,
            ChannelAddress::private(metadata.private_id.clone()),
        ]);
        state.hub.on_connect(connection_id.clone(), metadata).await;

        let (sender, mut incoming) = socket.split();

        // 创建 mpsc channel 来解耦对 sender 的访问
        let (cmd_tx, cmd_rx) = mpsc::channel::<WsCommand>(state.outbound_buffer);

        let mut send_task = tokio::spawn(Self::send_loop(sender, cmd_rx, subscription));

        let mut recv_task = {
            let state = state.clone();
            let connection_id = connection_id.clone();
            tokio::spawn(async move {
                while let Some(Ok(message)) = incoming.next().await {
                    if Self::handle_incoming(&state, &connection_id, message, &cmd_tx)
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                tracing::debug!(connection_id = %connection_id, "WebSocket接收任务结束");
            })
        };

        // 等待任意一个任务完成（连接断开），并停止另一个
        tokio::select! {
            _ = &mut send_task => {
                recv_task.abort();
            }
            _ = &mut recv_task => {
                send_task.abort();
            }
        }

        state.hub.on_disconnect(&connection_id).await;
        tracing::info!(connection_id = %connection_id, "WebSocket连接已断开，在线状态已清理");
    }

    /// 发送任务：统一处理所有对 WebSocket sender 的写操作
    async fn send_loop(
        mut sender: futures_util::stream::SplitSink<WebSocket, WsMessage>,
        mut cmd_rx: mpsc::Receiver<WsCommand>,
        mut subscription: ChannelSubscription,
    ) {
        loop {
            let outgoing = tokio::select! {
                Some(cmd) = cmd_rx.recv() => match cmd {
                    WsCommand::SendText(text) => WsMessage::Text(text.into()),
                    WsCommand::SendPong(data) => WsMessage::Pong(data.into()),
                },
                envelope = subscription.recv() => {
                    let Some(envelope) = envelope else {
                        tracing::warn!("发布器已关闭");
                        break;
                    };
                    match encode_event(&envelope.address, &envelope.event) {
                        Ok(json) => WsMessage::Text(json.into()),
                        Err(err) => {
                            tracing::warn!(error = %err, "failed to serialize websocket payload");
                            continue;
                        }
                    }
                }
            };
            if sender.send(outgoing).await.is_err() {
                tracing::debug!("WebSocket 写入失败，对端可能已断开");
                break;
            }
        }
    }

    /// 处理来自客户端的消息；返回 Err 表示应结束连接
    async fn handle_incoming(
        state: &AppState,
        connection_id: &ConnectionId,
        message: WsMessage,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) -> Result<(), ()> {
        match message {
            WsMessage::Text(text) => match ClientFrame::decode(text.as_str()) {
                Ok(frame) => Self::dispatch(state, connection_id, frame, cmd_tx).await,
                Err(err) => Self::reject(connection_id, err, cmd_tx).await,
            },
            WsMessage::Binary(_) => Self::reject(connection_id, FrameError::UnsupportedBinary, cmd_tx).await,
            WsMessage::Ping(data) => {
                tracing::debug!("收到ping消息，发送pong回应");
                cmd_tx
                    .send(WsCommand::SendPong(data.to_vec()))
                    .await
                    .map_err(|_| ())
            }
            WsMessage::Pong(_) => Ok(()),
            WsMessage::Close(_) => {
                tracing::debug!(connection_id = %connection_id, "WebSocket收到关闭消息");
                Err(())
            }
        }
    }

    async fn dispatch(
        state: &AppState,
        connection_id: &ConnectionId,
        frame: ClientFrame,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) -> Result<(), ()> {
        match frame {
            ClientFrame::Message {
                sender_name,
                text,
                recipients,
            } => {
                let message = inbound_message(sender_name, text, recipients);
                state.hub.route_message(connection_id, message).await;
            }
            ClientFrame::Status { hidden, busy } => {
                state
                    .hub
                    .update_status(connection_id, StatusUpdate::new(hidden, busy))
                    .await;
            }
            ClientFrame::Ready => state.hub.request_presence_refresh().await,
            ClientFrame::Ping => {
                let pong = DirectFrame::Pong.encode().map_err(|_| ())?;
                cmd_tx.send(WsCommand::SendText(pong)).await.map_err(|_| ())?;
            }
        }
        Ok(())
    }

    /// 无法处理的帧：回一个错误帧，但保持连接
    async fn reject(
        connection_id: &ConnectionId,
        err: FrameError,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) -> Result<(), ()> {
        tracing::warn!(connection_id = %connection_id, error = %err, "丢弃无法处理的客户端帧");
        let frame = DirectFrame::error(err.code(), err.to_string());
        match frame.encode() {
            Ok(json) => cmd_tx.send(WsCommand::SendText(json)).await.map_err(|_| ()),
            Err(_) => Ok(()),
        }
    }
}

/// WebSocket 写操作命令
///
/// 使用命令模式统一管理所有对 WebSocket sender 的写操作
#[derive(Debug)]
enum WsCommand {
    SendText(String),
    SendPong(Vec<u8>),
}
