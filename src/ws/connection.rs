//! WebSocket transport adapter for a single connection.
//!
//! Splits the socket, spawns a writer task that drains the connection's
//! outbound queue into the sink, and feeds the read half to the session as
//! a stream of [`ReadOutcome`]s.

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::domain::{ClientId, Connection, ConnectionRegistry, Frame};
use crate::service::{ReadOutcome, Session, SessionSummary};

/// Runs the full lifecycle of one upgraded WebSocket.
///
/// Returns once the client has disconnected and its leave notice has
/// been broadcast. The writer task outlives this call only as long as it
/// needs to flush frames already queued.
pub async fn run_connection(
    socket: WebSocket,
    client_id: ClientId,
    registry: Arc<ConnectionRegistry>,
    queue_capacity: usize,
) -> SessionSummary {
    let (ws_tx, ws_rx) = socket.split();
    let (connection, frame_rx) = Connection::channel(client_id.clone(), queue_capacity);
    tokio::spawn(write_frames(
        ws_tx,
        frame_rx,
        connection.eviction_token(),
        client_id,
    ));

    let joined = Session::new(registry, connection).join().await;
    let summary = joined.relay(read_outcomes(ws_rx)).await;

    tracing::debug!(client_id = %summary.client_id, "ws connection closed");
    summary
}

/// Drains queued frames into the socket until every sender is gone, the
/// connection is evicted, or a write fails. Exiting drops the receiver,
/// which makes the next send to this connection fail and evicts it.
async fn write_frames<S>(
    mut sink: S,
    mut frames: mpsc::Receiver<Frame>,
    evicted: CancellationToken,
    client_id: ClientId,
) where
    S: Sink<Message> + Unpin,
    S::Error: fmt::Display,
{
    loop {
        let frame = tokio::select! {
            biased;
            () = evicted.cancelled() => {
                tracing::debug!(%client_id, "closing evicted ws connection");
                break;
            }
            frame = frames.recv() => frame,
        };
        let Some(frame) = frame else {
            break;
        };
        if let Err(e) = sink.send(Message::text(&*frame)).await {
            tracing::debug!(%client_id, error = %e, "ws write failed");
            return;
        }
    }
    let _ = sink.close().await;
}

/// Adapts raw WebSocket frames to [`ReadOutcome`]s, skipping frames that
/// carry no text.
fn read_outcomes<S>(stream: S) -> impl Stream<Item = ReadOutcome> + Unpin
where
    S: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    stream.filter_map(|msg| std::future::ready(classify(msg)))
}

/// Maps one WebSocket read to a [`ReadOutcome`], or `None` for control
/// and binary frames.
fn classify(msg: Result<Message, axum::Error>) -> Option<ReadOutcome> {
    match msg {
        Ok(Message::Text(text)) => Some(ReadOutcome::Data(text.to_string())),
        Ok(Message::Close(_)) => Some(ReadOutcome::Closed),
        Ok(Message::Binary(_) | Message::Ping(_) | Message::Pong(_)) => {
            tracing::debug!("ignoring non-text ws frame");
            None
        }
        Err(e) => Some(ReadOutcome::Error(e.to_string())),
    }
}
