//! 推送连接：建立、读取文本帧、正常关闭。

use crate::RealtimeError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// 已建立的推送连接。
#[async_trait]
pub trait PushConnection: Send {
    /// 下一条文本消息；对端关闭返回 None。
    async fn next_message(&mut self) -> Option<Result<String, RealtimeError>>;

    /// 发送正常关闭帧。
    async fn close(&mut self) -> Result<(), RealtimeError>;
}

/// 推送连接工厂。
#[async_trait]
pub trait PushConnector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushConnection>, RealtimeError>;
}

/// tokio-tungstenite 连接器。
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl PushConnector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn PushConnection>, RealtimeError> {
        let connect_error = |message: String| RealtimeError::Connect {
            url: url.to_string(),
            message,
        };
        let (stream, response) = timeout(CONNECT_TIMEOUT, connect_async(url))
            .await
            .map_err(|_| connect_error(format!("timed out after {:?}", CONNECT_TIMEOUT)))?
            .map_err(|err| connect_error(err.to_string()))?;
        debug!(
            target: "signify.realtime",
            status = ?response.status(),
            "websocket_handshake_complete"
        );
        Ok(Box::new(WebSocketConnection { stream }))
    }
}

struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl PushConnection for WebSocketConnection {
    async fn next_message(&mut self) -> Option<Result<String, RealtimeError>> {
        loop {
            let frame = match self.stream.next().await? {
                Ok(frame) => frame,
                Err(err) => return Some(Err(RealtimeError::Transport(err.to_string()))),
            };
            match frame {
                WsMessage::Text(text) => return Some(Ok(text.as_str().to_owned())),
                WsMessage::Binary(data) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(err) => return Some(Err(RealtimeError::Decode(err.to_string()))),
                },
                WsMessage::Ping(data) => {
                    if let Err(err) = self.stream.send(WsMessage::Pong(data)).await {
                        return Some(Err(RealtimeError::Transport(err.to_string())));
                    }
                }
                WsMessage::Close(frame) => {
                    debug!(target: "signify.realtime", ?frame, "close_frame_received");
                    return None;
                }
                WsMessage::Pong(_) | WsMessage::Frame(_) => {}
            }
        }
    }

    async fn close(&mut self) -> Result<(), RealtimeError> {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "".into(),
        };
        self.stream
            .close(Some(frame))
            .await
            .map_err(|err| RealtimeError::Transport(err.to_string()))
    }
}
