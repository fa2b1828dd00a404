/*
[INPUT]:  Feed URL, subscribe requests and raw inbound frames
[OUTPUT]: Decoded feed messages and typed events, with bad frames skipped
[POS]:    Feed layer - WebSocket transport and frame reader
[UPDATE]: When changing connection handling or skip/log policy
*/

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::event::FeedEvent;
use super::message::{decode_message, FeedMessage};
use super::subscribe::SubscribeRequest;
use crate::http::{GdaxError, Result};

const FEED_URL: &str = "wss://ws-feed.gdax.com";
const MESSAGE_SAMPLE_LIMIT: usize = 3;
const PARSE_FAIL_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

/// Feed connection configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    /// Frames buffered between the socket task and the reader
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: FEED_URL.to_string(),
            channel_capacity: 100,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(GdaxError::Config("channel_capacity must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Yields raw feed payloads one at a time; `None` once the source is finished.
#[async_trait]
pub trait FrameSource: Send {
    async fn next_frame(&mut self) -> Option<Result<Vec<u8>>>;
}

#[async_trait]
impl FrameSource for mpsc::Receiver<Result<Vec<u8>>> {
    async fn next_frame(&mut self) -> Option<Result<Vec<u8>>> {
        self.recv().await
    }
}

/// Live WebSocket connection to the feed.
///
/// A background task owns the socket; frames arrive through a bounded channel
/// and outbound control messages go through another.
#[derive(Debug)]
pub struct FeedConnection {
    inbound: mpsc::Receiver<Result<Vec<u8>>>,
    outbound: Option<mpsc::Sender<WsMessage>>,
}

impl FeedConnection {
    pub async fn connect(config: &FeedConfig) -> Result<Self> {
        config.validate()?;
        let (ws_stream, _response) = connect_async(config.url.as_str())
            .await
            .map_err(|e| GdaxError::WebSocket(e.to_string()))?;
        info!(url = %config.url, "feed connected");

        let (mut write, mut read) = ws_stream.split();
        let (inbound_tx, inbound) = mpsc::channel(config.channel_capacity);
        let (outbound, mut outbound_rx) = mpsc::channel::<WsMessage>(config.channel_capacity);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    outgoing = outbound_rx.recv() => {
                        match outgoing {
                            Some(message) => {
                                if let Err(e) = write.send(message).await {
                                    let _ = inbound_tx.send(Err(GdaxError::WebSocket(e.to_string()))).await;
                                    break;
                                }
                            }
                            None => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                        }
                    }
                    incoming = read.next() => {
                        let frame = match incoming {
                            Some(Ok(WsMessage::Text(text))) => text.as_str().as_bytes().to_vec(),
                            Some(Ok(WsMessage::Binary(bytes))) => bytes.to_vec(),
                            Some(Ok(WsMessage::Close(_))) => {
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                            Some(Ok(_)) => continue,
                            Some(Err(e)) => {
                                let _ = inbound_tx.send(Err(GdaxError::WebSocket(e.to_string()))).await;
                                break;
                            }
                            None => break,
                        };
                        if inbound_tx.send(Ok(frame)).await.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("feed socket task finished");
        });

        Ok(Self {
            inbound,
            outbound: Some(outbound),
        })
    }

    /// Send a subscribe or unsubscribe frame
    pub async fn send(&self, request: &SubscribeRequest) -> Result<()> {
        let closed = || GdaxError::WebSocket("feed connection closed".to_string());
        let outbound = self.outbound.as_ref().ok_or_else(closed)?;
        let text = serde_json::to_string(request)?;
        outbound
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|_| closed())?;

        info!(
            action = ?request.action,
            products = request.product_ids.len(),
            channels = request.channels.len(),
            "feed subscription sent"
        );
        Ok(())
    }

    /// Close the socket; frames already buffered can still be read
    pub fn close(&mut self) {
        self.outbound = None;
    }
}

#[async_trait]
impl FrameSource for FeedConnection {
    async fn next_frame(&mut self) -> Option<Result<Vec<u8>>> {
        self.inbound.recv().await
    }
}

/// Pulls frames from a [`FrameSource`] and decodes them.
///
/// A frame that fails to decode is logged and skipped; the reader moves on to
/// the next one. Transport errors are returned to the caller.
#[derive(Debug)]
pub struct FeedReader<S> {
    source: S,
    skipped: u64,
    samples_logged: usize,
    failures_logged: usize,
}

impl<S: FrameSource> FeedReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            skipped: 0,
            samples_logged: 0,
            failures_logged: 0,
        }
    }

    /// Frames dropped because they failed to decode
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Next decodable message, or `None` once the source is finished
    pub async fn next_message(&mut self) -> Option<Result<FeedMessage>> {
        loop {
            let frame = match self.source.next_frame().await? {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e)),
            };
            match decode_message(&frame) {
                Ok(message) => {
                    self.log_sample(&message);
                    return Some(Ok(message));
                }
                Err(err) => self.skip_frame(&err, &String::from_utf8_lossy(&frame)),
            }
        }
    }

    /// Next message converted into a [`FeedEvent`].
    ///
    /// Messages missing a field their type requires are skipped like frames
    /// that fail to decode.
    pub async fn next_event(&mut self) -> Option<Result<FeedEvent>> {
        loop {
            let message = match self.next_message().await? {
                Ok(message) => message,
                Err(e) => return Some(Err(e)),
            };
            let kind = message.kind.clone();
            let sequence = message.sequence;
            match message.into_event() {
                Ok(event) => return Some(Ok(event)),
                Err(err) => self.skip_event(&err, &kind, sequence),
            }
        }
    }

    /// Count a skipped message; true while the failure log sample has room
    fn record_skip(&mut self) -> bool {
        self.skipped += 1;
        if self.failures_logged >= PARSE_FAIL_LOG_LIMIT {
            return false;
        }
        self.failures_logged += 1;
        true
    }

    fn skip_frame(&mut self, err: &GdaxError, raw: &str) {
        if !self.record_skip() {
            return;
        }

        warn!(
            sample_index = self.failures_logged,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            bytes = raw.len(),
            "feed message skipped"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = self.failures_logged,
            message = %preview,
            "feed message skipped"
        );
    }

    fn skip_event(&mut self, err: &GdaxError, kind: &str, sequence: Option<i64>) {
        if !self.record_skip() {
            return;
        }

        warn!(
            sample_index = self.failures_logged,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            kind,
            sequence,
            "feed event skipped"
        );
    }

    fn log_sample(&mut self, message: &FeedMessage) {
        if self.samples_logged >= MESSAGE_SAMPLE_LIMIT {
            return;
        }
        self.samples_logged += 1;

        info!(
            sample_index = self.samples_logged,
            sample_limit = MESSAGE_SAMPLE_LIMIT,
            kind = %message.kind,
            product_id = message.product_id.as_deref().unwrap_or(""),
            "feed message sample"
        );
    }
}

/// Cut `value` to at most `max_len` bytes without splitting a character
fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::{Arc, Mutex as StdMutex};

    async fn reader_with(frames: Vec<Result<Vec<u8>>>) -> FeedReader<mpsc::Receiver<Result<Vec<u8>>>> {
        let (tx, rx) = mpsc::channel(frames.len().max(1));
        for frame in frames {
            tx.send(frame).await.unwrap();
        }
        FeedReader::new(rx)
    }

    fn frame(raw: &str) -> Result<Vec<u8>> {
        Ok(raw.as_bytes().to_vec())
    }

    #[test]
    fn default_config_points_at_production() {
        let config = FeedConfig::default();
        assert_eq!(config.url, "wss://ws-feed.gdax.com");
        assert_eq!(config.channel_capacity, 100);
    }

    #[tokio::test]
    async fn zero_channel_capacity_is_rejected_before_connecting() {
        let config = FeedConfig {
            url: "ws://127.0.0.1:1".to_string(),
            channel_capacity: 0,
        };

        let err = FeedConnection::connect(&config).await.unwrap_err();
        match err {
            GdaxError::Config(message) => assert_eq!(message, "channel_capacity must be > 0"),
            other => panic!("Expected Config error, got {other:?}"),
        }
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<StdMutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn skipped_event_is_logged_by_type_not_as_raw_frame() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut reader = reader_with(vec![frame(r#"{"type":"open","product_id":"BTC-USD","sequence":42}"#)]).await;
        assert!(reader.next_event().await.is_none());
        assert_eq!(reader.skipped(), 1);

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let line = output
            .lines()
            .find(|line| line.contains("feed event skipped"))
            .expect("skip should be logged");
        assert!(line.contains("kind=open"));
        assert!(line.contains("sequence=42"));
        assert!(!line.contains("bytes="));
    }

    #[tokio::test]
    async fn malformed_frame_is_skipped() {
        let mut reader = reader_with(vec![
            frame(r#"{"type":"heartbeat","sequence":1}"#),
            frame("not json"),
            frame(r#"{"type":"snapshot","bids":[["1"]]}"#),
            frame(r#"{"type":"heartbeat","sequence":"2"}"#),
        ])
        .await;

        let first = reader.next_message().await.unwrap().unwrap();
        let second = reader.next_message().await.unwrap().unwrap();

        assert_eq!(first.sequence, Some(1));
        assert_eq!(second.sequence, Some(2));
        assert_eq!(reader.skipped(), 2);
        assert!(reader.next_message().await.is_none());
    }

    #[tokio::test]
    async fn transport_error_is_returned() {
        let mut reader = reader_with(vec![
            Err(GdaxError::WebSocket("reset".to_string())),
            frame(r#"{"type":"error","message":"late"}"#),
        ])
        .await;

        let err = reader.next_message().await.unwrap().unwrap_err();
        assert!(err.is_transport());
        assert_eq!(reader.skipped(), 0);

        let message = reader.next_message().await.unwrap().unwrap();
        assert_eq!(message.kind, "error");
    }

    #[tokio::test]
    async fn events_skip_incomplete_messages() {
        let mut reader = reader_with(vec![
            frame(r#"{"type":"open","product_id":"BTC-USD"}"#),
            frame(r#"{"type":"error","message":"Failed to subscribe"}"#),
        ])
        .await;

        let event = reader.next_event().await.unwrap().unwrap();
        assert_eq!(
            event,
            FeedEvent::Error {
                message: "Failed to subscribe".to_string()
            }
        );
        assert_eq!(reader.skipped(), 1);
    }

    #[tokio::test]
    async fn api_errors_pass_through_events() {
        let mut reader = reader_with(vec![Err(GdaxError::api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "down".to_string(),
        ))])
        .await;

        assert!(reader.next_event().await.unwrap().is_err());
        assert!(reader.next_event().await.is_none());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdef", 3), "abc...");
        // "é" is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_for_log("aéb", 2), "a...");
    }
}
