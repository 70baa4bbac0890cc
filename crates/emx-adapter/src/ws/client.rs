/*
[INPUT]:  WebSocket URL, optional API credentials, contract codes and channels
[OUTPUT]: Parsed channel messages via an mpsc receiver
[POS]:    WebSocket layer - real-time data stream handling
[UPDATE]: When adding new channels or changing connection logic
*/

use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::message::WebSocketMessage;
use crate::auth::ApiCredentials;
use crate::http::{EmxError, Result};
use crate::types::{Channel, Environment, SubscriptionRequest};

const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(3);
const CHANNEL_CAPACITY: usize = 100;
const MESSAGE_SAMPLE_LIMIT: usize = 3;
const SUBSCRIPTION_LOG_LIMIT: usize = 10;
const PARSE_FAIL_LOG_LIMIT: usize = 3;
const RAW_LOG_MAX_BYTES: usize = 1024;

static MESSAGE_SAMPLE_COUNT: AtomicUsize = AtomicUsize::new(0);
static SUBSCRIBE_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);
static PARSE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

/// WebSocket client for the EMX feed.
///
/// A background task owns the socket; parsed messages are delivered through
/// an mpsc channel and outbound frames are queued through another.
#[derive(Debug)]
pub struct EmxWebSocket {
    credentials: Option<ApiCredentials>,
    receive_timeout: Duration,
    message_tx: mpsc::Sender<WebSocketMessage>,
    message_rx: Option<mpsc::Receiver<WebSocketMessage>>,
    outbound_tx: Arc<Mutex<Option<mpsc::Sender<WsMessage>>>>,
    /// Set once `Disconnected` has been received; cleared by `connect`
    disconnected: AtomicBool,
}

impl EmxWebSocket {
    /// Create an unauthenticated client (public channels only)
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            credentials: None,
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            message_tx: tx,
            message_rx: Some(rx),
            outbound_tx: Arc::new(Mutex::new(None)),
            disconnected: AtomicBool::new(false),
        }
    }

    /// Create a client that signs its subscriptions
    pub fn with_credentials(credentials: ApiCredentials) -> Self {
        Self {
            credentials: Some(credentials),
            ..Self::new()
        }
    }

    /// Timeout used by [`EmxWebSocket::recv`]
    pub fn with_receive_timeout(mut self, timeout: Duration) -> Self {
        self.receive_timeout = timeout;
        self
    }

    /// Get the message receiver; afterwards `recv` is unavailable
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<WebSocketMessage>> {
        self.message_rx.take()
    }

    pub async fn is_connected(&self) -> bool {
        self.outbound_tx.lock().await.is_some()
    }

    /// Connect to the feed of an EMX deployment
    pub async fn connect_environment(&self, environment: Environment) -> Result<()> {
        self.connect(environment.ws_url()).await
    }

    /// Connect to an explicit URL
    pub async fn connect(&self, url: &str) -> Result<()> {
        let mut guard = self.outbound_tx.lock().await;
        if guard.is_some() {
            return Err(EmxError::WebSocket("WebSocket already connected".to_string()));
        }

        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| EmxError::WebSocket(format!("connect to {url} failed: {e}")))?;
        info!(url, "ws connected");

        let (mut write, mut read) = ws_stream.split();
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<WsMessage>(CHANNEL_CAPACITY);
        let own_sender = outbound_tx.downgrade();
        *guard = Some(outbound_tx);
        self.disconnected.store(false, Ordering::Release);
        drop(guard);

        let message_tx = self.message_tx.clone();
        let outbound_state = self.outbound_tx.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    outbound = outbound_rx.recv() => {
                        match outbound {
                            Some(message) => {
                                if let Err(err) = write.send(message).await {
                                    warn!(error = %err, "ws send failed");
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
                        match incoming {
                            Some(Ok(WsMessage::Close(frame))) => {
                                debug!(?frame, "ws closed by server");
                                let _ = write.send(WsMessage::Close(None)).await;
                                break;
                            }
                            Some(Ok(WsMessage::Ping(payload))) => {
                                if write.send(WsMessage::Pong(payload)).await.is_err() {
                                    break;
                                }
                            }
                            Some(Ok(WsMessage::Pong(_))) | Some(Ok(WsMessage::Frame(_))) => {}
                            Some(Ok(message)) => {
                                if let Some(parsed) = parse_frame(message)
                                    && message_tx.send(parsed).await.is_err()
                                {
                                    break;
                                }
                            }
                            Some(Err(err)) => {
                                warn!(error = %err, "ws read failed");
                                break;
                            }
                            None => break,
                        }
                    }
                }
            }

            // Only clear the slot if a later connect has not replaced it.
            let mut guard = outbound_state.lock().await;
            let is_own = match (guard.as_ref(), own_sender.upgrade()) {
                (Some(current), Some(own)) => current.same_channel(&own),
                _ => false,
            };
            if is_own {
                *guard = None;
            }
            drop(guard);
            let _ = message_tx.send(WebSocketMessage::Disconnected).await;
            info!("ws connection task stopped");
        });

        Ok(())
    }

    /// Subscribe to channels for the given contracts.
    ///
    /// With credentials the frame is signed over `GET /v1/user/verify`;
    /// without them it is sent bare and only public channels will be served.
    pub async fn subscribe(&self, contract_codes: &[&str], channels: &[Channel]) -> Result<()> {
        let request = self.subscribe_request(contract_codes, channels);
        if request.key.is_none() && channels.iter().any(|channel| channel.is_private()) {
            warn!("subscribing to private channels without credentials");
        }
        self.send_request(&request).await
    }

    /// Unsubscribe from channels for the given contracts (empty = all contracts)
    pub async fn unsubscribe(&self, contract_codes: &[&str], channels: &[Channel]) -> Result<()> {
        let request = SubscriptionRequest {
            action: "unsubscribe".to_string(),
            contract_codes: contract_codes.iter().map(|code| code.to_string()).collect(),
            channels: channels.iter().map(|channel| channel.to_string()).collect(),
            key: None,
            sig: None,
            timestamp: None,
        };
        self.send_request(&request).await
    }

    /// Build the subscribe frame, signing it when credentials are present
    pub fn subscribe_request(
        &self,
        contract_codes: &[&str],
        channels: &[Channel],
    ) -> SubscriptionRequest {
        let signed = self.credentials.as_ref().map(ApiCredentials::sign_ws_verify);
        SubscriptionRequest {
            action: "subscribe".to_string(),
            contract_codes: contract_codes.iter().map(|code| code.to_string()).collect(),
            channels: channels.iter().map(|channel| channel.to_string()).collect(),
            key: signed.as_ref().map(|signed| signed.key.clone()),
            sig: signed.as_ref().map(|signed| signed.signature.clone()),
            timestamp: signed.map(|signed| signed.timestamp),
        }
    }

    /// Next message, waiting at most the configured receive timeout
    pub async fn recv(&mut self) -> Result<WebSocketMessage> {
        let timeout = self.receive_timeout;
        self.recv_timeout(timeout).await
    }

    /// Next message, waiting at most `timeout`.
    ///
    /// Once the connection has ended every call returns `NotConnected`
    /// until `connect` succeeds again.
    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<WebSocketMessage> {
        if self.disconnected.load(Ordering::Acquire) {
            return Err(EmxError::NotConnected);
        }

        let receiver = self
            .message_rx
            .as_mut()
            .ok_or_else(|| EmxError::Config("message receiver already taken".to_string()))?;

        match tokio::time::timeout(timeout, receiver.recv()).await {
            Ok(Some(WebSocketMessage::Disconnected)) | Ok(None) => {
                self.disconnected.store(true, Ordering::Release);
                Err(EmxError::NotConnected)
            }
            Ok(Some(message)) => Ok(message),
            Err(_) => Err(EmxError::Timeout { duration: timeout }),
        }
    }

    /// Close the connection; the task sends a close frame and exits
    pub async fn close(&self) {
        let mut guard = self.outbound_tx.lock().await;
        if guard.take().is_some() {
            debug!("ws close requested");
        }
    }

    async fn send_request(&self, request: &SubscriptionRequest) -> Result<()> {
        let sender = {
            let guard = self.outbound_tx.lock().await;
            guard.clone().ok_or(EmxError::NotConnected)?
        };

        let text = serde_json::to_string(request)?;
        sender
            .send(WsMessage::Text(text.into()))
            .await
            .map_err(|_| EmxError::WebSocket("WebSocket send channel closed".to_string()))?;

        log_subscription_sent(request);
        Ok(())
    }
}

impl Default for EmxWebSocket {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_frame(message: WsMessage) -> Option<WebSocketMessage> {
    let text: String = match message {
        WsMessage::Text(text) => text.to_string(),
        WsMessage::Binary(bytes) => String::from_utf8(bytes.to_vec()).ok()?,
        _ => return None,
    };

    match WebSocketMessage::parse(&text) {
        Ok(parsed) => {
            log_message_sample_once(&parsed);
            Some(parsed)
        }
        Err(err) => {
            log_parse_fail_once(&err, &text);
            Some(WebSocketMessage::Other { raw: text })
        }
    }
}

fn log_subscription_sent(request: &SubscriptionRequest) {
    let count = SUBSCRIBE_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count >= SUBSCRIPTION_LOG_LIMIT {
        return;
    }

    info!(
        sample_index = count + 1,
        sample_limit = SUBSCRIPTION_LOG_LIMIT,
        action = %request.action,
        channels = ?request.channels,
        contract_codes = ?request.contract_codes,
        signed = request.sig.is_some(),
        "ws subscription sent"
    );
}

fn log_message_sample_once(message: &WebSocketMessage) {
    let count = MESSAGE_SAMPLE_COUNT.fetch_add(1, Ordering::Relaxed);
    if count >= MESSAGE_SAMPLE_LIMIT {
        return;
    }

    match message {
        WebSocketMessage::Channel(channel) => {
            info!(
                sample_index = count + 1,
                sample_limit = MESSAGE_SAMPLE_LIMIT,
                channel = %channel.channel,
                message_type = channel.message_type.as_deref().unwrap_or(""),
                contract_code = channel.contract_code().unwrap_or(""),
                "ws message sample"
            );
        }
        WebSocketMessage::Error { message } => {
            warn!(error = %message, "ws error message");
        }
        other => {
            info!(
                sample_index = count + 1,
                sample_limit = MESSAGE_SAMPLE_LIMIT,
                channel = other.channel_name(),
                "ws message sample"
            );
        }
    }
}

fn log_parse_fail_once(err: &serde_json::Error, raw: &str) {
    let count = PARSE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < PARSE_FAIL_LOG_LIMIT {
        info!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            bytes = raw.len(),
            "ws message parse failed"
        );
        let preview = truncate_for_log(raw, RAW_LOG_MAX_BYTES);
        debug!(
            sample_index = count + 1,
            sample_limit = PARSE_FAIL_LOG_LIMIT,
            error = %err,
            message = %preview,
            "ws message parse failed"
        );
    }
}

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
