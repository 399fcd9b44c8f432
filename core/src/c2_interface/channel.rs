use std::sync::Mutex as StdMutex;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::c2_interface::messages::{DetectionEvent, InboundMessage};

/// Connection lifecycle for the C2 link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Closing,
}

#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    #[error("connect to {0} failed: {1}")]
    Connect(String, #[source] std::io::Error),
    #[error("send failed: {0}")]
    Send(#[source] std::io::Error),
    #[error("event encoding failed: {0}")]
    Encode(#[source] serde_json::Error),
}

pub type ChannelResult<T> = Result<T, ChannelError>;

/// Persistent bidirectional link to the C2 hub carrying newline-delimited
/// JSON. One channel owns one connection; there is no automatic retry or
/// reconnect at this layer.
pub struct StreamingChannel {
    endpoint: String,
    state: StdMutex<ConnectionState>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    reader: StdMutex<Option<OwnedReadHalf>>,
}

impl StreamingChannel {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: StdMutex::new(ConnectionState::Disconnected),
            writer: Mutex::new(None),
            reader: StdMutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock().expect("connection state lock")
    }

    /// Establish the connection. A handshake failure leaves the channel
    /// disconnected and is terminal for this attempt.
    pub async fn connect(&self) -> ChannelResult<()> {
        self.set_state(ConnectionState::Connecting);
        let stream = match TcpStream::connect(&self.endpoint).await {
            Ok(stream) => stream,
            Err(err) => {
                self.set_state(ConnectionState::Disconnected);
                return Err(ChannelError::Connect(self.endpoint.clone(), err));
            }
        };
        if let Err(err) = stream.set_nodelay(true) {
            debug!("could not disable Nagle on C2 link: {}", err);
        }
        let (read_half, write_half) = stream.into_split();
        *self.reader.lock().expect("reader lock") = Some(read_half);
        *self.writer.lock().await = Some(write_half);
        self.set_state(ConnectionState::Connected);
        info!("connected to C2 hub at {}", self.endpoint);
        Ok(())
    }

    /// Take the inbound half of the link. Yields `None` after the first
    /// call, or before a successful connect.
    pub fn receiver(&self) -> Option<MessageReceiver> {
        self.reader
            .lock()
            .expect("reader lock")
            .take()
            .map(|half| MessageReceiver {
                lines: BufReader::new(half).lines(),
            })
    }

    /// Send one detection event. On a channel that is not connected the
    /// event is dropped with a warning; a transport failure tears the write
    /// half down and surfaces the error to the caller.
    pub async fn send(&self, event: &DetectionEvent) -> ChannelResult<()> {
        let mut frame = serde_json::to_string(event).map_err(ChannelError::Encode)?;
        frame.push('\n');

        let mut writer = self.writer.lock().await;
        let Some(half) = writer.as_mut() else {
            warn!(
                "dropping detection event for {}: channel not connected",
                event.drone_id
            );
            return Ok(());
        };
        if let Err(err) = half.write_all(frame.as_bytes()).await {
            *writer = None;
            self.set_state(ConnectionState::Disconnected);
            return Err(ChannelError::Send(err));
        }
        Ok(())
    }

    /// Close the connection; teardown runs at most once.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().expect("connection state lock");
            match *state {
                ConnectionState::Connected => *state = ConnectionState::Closing,
                _ => return,
            }
        }
        if let Some(mut half) = self.writer.lock().await.take() {
            if let Err(err) = half.shutdown().await {
                debug!("C2 link teardown: {}", err);
            }
        }
        self.set_state(ConnectionState::Disconnected);
        info!("closed C2 link to {}", self.endpoint);
    }

    fn set_state(&self, next: ConnectionState) {
        *self.state.lock().expect("connection state lock") = next;
    }
}

/// Lazy sequence of inbound hub messages.
///
/// Malformed payloads are logged and skipped; the sequence ends when the
/// hub closes the connection or the transport errors out.
pub struct MessageReceiver {
    lines: Lines<BufReader<OwnedReadHalf>>,
}

impl MessageReceiver {
    pub async fn next(&mut self) -> Option<InboundMessage> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => match serde_json::from_str::<InboundMessage>(&line) {
                    Ok(message) => return Some(message),
                    Err(err) => {
                        warn!("dropping malformed hub message: {}", err);
                    }
                },
                Ok(None) => return None,
                Err(err) => {
                    warn!("C2 link read error, ending inbound stream: {}", err);
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ActivityState;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn sample_event() -> DetectionEvent {
        DetectionEvent {
            timestamp: 1000.0,
            drone_id: "AUDIO-SIM-001".into(),
            state: ActivityState::Hover,
            confidence: 0.75,
            estimated_distance: Some(120.5),
            estimated_bearing: Some(45.0),
        }
    }

    async fn connected_pair() -> (StreamingChannel, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let channel = StreamingChannel::new(addr.to_string());
        let accept = tokio::spawn(async move { listener.accept().await.unwrap().0 });
        channel.connect().await.unwrap();
        (channel, accept.await.unwrap())
    }

    #[tokio::test]
    async fn connect_failure_is_terminal_for_the_attempt() {
        // Port 1 on loopback refuses connections.
        let channel = StreamingChannel::new("127.0.0.1:1");
        assert!(channel.connect().await.is_err());
        assert_eq!(channel.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn send_frames_one_json_event_per_line() {
        let (channel, hub) = connected_pair().await;
        assert_eq!(channel.state(), ConnectionState::Connected);

        channel.send(&sample_event()).await.unwrap();
        channel.close().await;

        let mut raw = String::new();
        let mut hub = hub;
        hub.read_to_string(&mut raw).await.unwrap();
        let line = raw.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["type"], "audio_detection");
        assert_eq!(value["state"], "HOVER");
        assert_eq!(value["confidence"], 0.75);
    }

    #[tokio::test]
    async fn send_before_connect_drops_the_event() {
        let channel = StreamingChannel::new("127.0.0.1:1");
        assert!(channel.send(&sample_event()).await.is_ok());
    }

    #[tokio::test]
    async fn receiver_skips_malformed_and_ends_on_remote_close() {
        let (channel, mut hub) = connected_pair().await;
        let mut receiver = channel.receiver().expect("read half available once");
        assert!(channel.receiver().is_none());

        hub.write_all(b"this is not json\n").await.unwrap();
        hub.write_all(
            b"{\"type\":\"drone_state_update\",\"drone_id\":\"D-1\",\
              \"position\":{\"x\":1.0,\"y\":2.0,\"altitude\":3.0}}\n",
        )
        .await
        .unwrap();
        hub.write_all(b"{\"type\":\"ping\"}\n").await.unwrap();
        drop(hub);

        match receiver.next().await.unwrap() {
            InboundMessage::DroneStateUpdate { drone_id, .. } => {
                assert_eq!(drone_id, "D-1");
            }
            other => panic!("unexpected message {:?}", other),
        }
        assert!(matches!(
            receiver.next().await,
            Some(InboundMessage::Unknown)
        ));
        assert!(receiver.next().await.is_none());
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let (channel, _hub) = connected_pair().await;
        channel.close().await;
        channel.close().await;
        assert_eq!(channel.state(), ConnectionState::Disconnected);
    }
}
