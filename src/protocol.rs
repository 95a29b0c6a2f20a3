//! TCP protocol between a landmark-detection client and the posture server.
//!
//! Each message is bincode-encoded and length-prefixed.

use anyhow::{anyhow, Context};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::{Framed, LengthDelimitedCodec};

use crate::analysis::{FrameOutcome, PostureType};
use crate::pose::Detection;
use crate::session::SessionSummary;

/// Client → server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Evaluate a single snapshot.
    AnalyzeFrame { posture_type: String, detection: Detection },
    /// Start a session; subsequent `SessionFrame`s are aggregated.
    StartSession { posture_type: String },
    /// `timestamp` is seconds since the session started.
    SessionFrame { timestamp: f64, detection: Detection },
    EndSession,
}

/// Server → client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum ServerMessage {
    FrameResult { outcome: FrameOutcome },
    SessionStarted { posture_type: PostureType },
    SessionFrameResult { frame_number: u64, outcome: FrameOutcome },
    SessionSummary { summary: SessionSummary },
    Error { message: String },
}

pub type MessageStream<T> = Framed<T, LengthDelimitedCodec>;

/// Wrap a byte stream with length-delimited framing.
pub fn message_stream<T>(io: T, max_frame_length: usize) -> MessageStream<T>
where
    T: AsyncRead + AsyncWrite,
{
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(max_frame_length)
        .new_codec();
    Framed::new(io, codec)
}

pub async fn send_message<T, M>(stream: &mut MessageStream<T>, msg: &M) -> anyhow::Result<()>
where
    T: AsyncRead + AsyncWrite + Unpin,
    M: Serialize,
{
    let data = bincode::serialize(msg).context("failed to encode message")?;
    stream.send(Bytes::from(data)).await?;
    Ok(())
}

/// Returns `Ok(None)` when the peer closed the connection cleanly.
pub async fn recv_message<T, M>(stream: &mut MessageStream<T>) -> anyhow::Result<Option<M>>
where
    T: AsyncRead + AsyncWrite + Unpin,
    M: DeserializeOwned,
{
    match stream.next().await {
        Some(Ok(bytes)) => {
            let msg = bincode::deserialize(&bytes).context("failed to decode message")?;
            Ok(Some(msg))
        }
        Some(Err(e)) => Err(anyhow!(e).context("failed to read frame")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::evaluate_frame;
    use crate::pose::{Landmark, LandmarkIndex};

    #[tokio::test]
    async fn test_message_exchange_over_duplex() {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let mut client = message_stream(client_io, 1024 * 1024);
        let mut server = message_stream(server_io, 1024 * 1024);

        let detection = Detection::found(vec![Landmark::at(0.5, 0.5); LandmarkIndex::COUNT]);
        let request = ClientMessage::AnalyzeFrame {
            posture_type: "desk".to_string(),
            detection: detection.clone(),
        };
        send_message(&mut client, &request).await.unwrap();

        let received: ClientMessage = recv_message(&mut server).await.unwrap().unwrap();
        assert_eq!(received, request);

        let reply = ServerMessage::FrameResult { outcome: evaluate_frame(&detection, "desk") };
        send_message(&mut server, &reply).await.unwrap();
        let received: ServerMessage = recv_message(&mut client).await.unwrap().unwrap();
        assert_eq!(received, reply);
    }

    #[tokio::test]
    async fn test_closed_connection_yields_none() {
        let (client_io, server_io) = tokio::io::duplex(1024);
        let mut server = message_stream(server_io, 1024);
        drop(client_io);

        let received: Option<ClientMessage> = recv_message(&mut server).await.unwrap();
        assert!(received.is_none());
    }

    #[tokio::test]
    async fn test_oversized_frame_is_error() {
        let (client_io, server_io) = tokio::io::duplex(64 * 1024);
        let mut client = message_stream(client_io, 1024 * 1024);
        let mut server = message_stream(server_io, 16);

        let request = ClientMessage::StartSession { posture_type: "squat".repeat(10) };
        send_message(&mut client, &request).await.unwrap();

        let result: anyhow::Result<Option<ClientMessage>> = recv_message(&mut server).await;
        assert!(result.is_err());
    }
}
