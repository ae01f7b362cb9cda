//! Test doubles for the signaling and media-engine contracts
//!
//! `MockSignaling` answers every endpoint with a well-formed default reply
//! unless a test scripts otherwise. `FakeEngine` hands out in-memory
//! devices, transports, producers and consumers that write every call to a
//! shared [`CallLog`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use crate::error::{MediaError, SignalingError};
use crate::media::{
    CameraFacing, ConsumeParams, Consumer, LocalMedia, LocalTrack, MediaDevice, MediaEngine,
    MediaKind, Producer, RecvTransport, SendTransport, TrackHandle, TransportListener,
};
use crate::roster::RosterSnapshot;
use crate::session::PeerId;
use crate::signaling::{Endpoint, NotificationHandler, SignalingPort, TransportOptions};

/// Install a fmt subscriber honouring `RUST_LOG`; repeated calls are harmless
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Yield until `condition` holds
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

// ---- signaling ----

#[derive(Default)]
struct MockState {
    requests: Vec<(Endpoint, Value)>,
    replies: HashMap<Endpoint, VecDeque<Result<Value, String>>>,
    failing: HashSet<Endpoint>,
    gates: HashMap<Endpoint, Arc<Notify>>,
    handler: Option<NotificationHandler>,
    subscriptions: usize,
}

/// Scripted signaling server
#[derive(Default)]
pub struct MockSignaling {
    state: Mutex<MockState>,
}

impl MockSignaling {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a one-shot reply for `endpoint`
    pub fn respond(&self, endpoint: Endpoint, reply: Value) {
        self.lock()
            .replies
            .entry(endpoint)
            .or_default()
            .push_back(Ok(reply));
    }

    /// Queue a one-shot transport failure for `endpoint`
    pub fn fail(&self, endpoint: Endpoint) {
        self.lock()
            .replies
            .entry(endpoint)
            .or_default()
            .push_back(Err(format!("{} failed", endpoint)));
    }

    /// Fail every request to `endpoint` until `recover`
    pub fn fail_always(&self, endpoint: Endpoint) {
        self.lock().failing.insert(endpoint);
    }

    pub fn recover(&self, endpoint: Endpoint) {
        self.lock().failing.remove(&endpoint);
    }

    /// Park requests to `endpoint` until `release`
    pub fn hold(&self, endpoint: Endpoint) {
        self.lock()
            .gates
            .insert(endpoint, Arc::new(Notify::new()));
    }

    pub fn release(&self, endpoint: Endpoint) {
        if let Some(gate) = self.lock().gates.remove(&endpoint) {
            gate.notify_one();
        }
    }

    /// Every request and notification so far, in order
    pub fn requests(&self) -> Vec<(Endpoint, Value)> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, endpoint: Endpoint) -> Vec<Value> {
        self.lock()
            .requests
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .count()
    }

    pub fn is_subscribed(&self) -> bool {
        self.lock().handler.is_some()
    }

    pub fn subscriptions(&self) -> usize {
        self.lock().subscriptions
    }

    /// Deliver a roster to the subscribed handler; false if none
    pub fn push_roster(&self, snapshot: RosterSnapshot) -> bool {
        let handler = self.lock().handler.clone();
        match handler {
            Some(handler) => {
                handler(snapshot);
                true
            }
            None => false,
        }
    }

    fn default_reply(endpoint: Endpoint, payload: &Value) -> Value {
        match endpoint {
            Endpoint::JoinAsNewPeer => json!({
                "routerRtpCapabilities": { "codecs": [{ "mimeType": "audio/opus" }, { "mimeType": "video/VP8" }] }
            }),
            Endpoint::CreateTransport => {
                let direction = payload["direction"].as_str().unwrap_or("send");
                json!({
                    "transportOptions": {
                        "id": format!("transport-{}", direction),
                        "iceParameters": { "usernameFragment": "frag", "password": "secret" },
                        "iceCandidates": [],
                        "dtlsParameters": { "role": "auto", "fingerprints": [] }
                    }
                })
            }
            Endpoint::SendTrack => {
                let kind = payload["kind"].as_str().unwrap_or("audio");
                json!({ "id": format!("producer-{}", kind) })
            }
            Endpoint::RecvTrack => {
                let peer = payload["mediaPeerId"].as_str().unwrap_or("");
                let tag = payload["mediaTag"].as_str().unwrap_or("");
                let kind = if tag == "cam-video" { "video" } else { "audio" };
                json!({
                    "id": format!("consumer-{}-{}", peer, tag),
                    "producerId": format!("producer-{}-{}", peer, tag),
                    "kind": kind,
                    "rtpParameters": { "codecs": [] }
                })
            }
            Endpoint::Sync => json!({ "peers": {} }),
            _ => json!({}),
        }
    }
}

#[async_trait]
impl SignalingPort for MockSignaling {
    async fn request(&self, endpoint: Endpoint, payload: Value) -> Result<Value, SignalingError> {
        let gate = {
            let mut state = self.lock();
            state.requests.push((endpoint, payload.clone()));
            state.gates.get(&endpoint).cloned()
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.lock();
        if state.failing.contains(&endpoint) {
            return Err(SignalingError::Transport(format!("{} unavailable", endpoint)));
        }

        match state.replies.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(reason)) => Err(SignalingError::Transport(reason)),
            None => Ok(Self::default_reply(endpoint, &payload)),
        }
    }

    fn request_async(&self, endpoint: Endpoint, payload: Value) {
        self.lock().requests.push((endpoint, payload));
    }

    fn subscribe(&self, _peer_id: &PeerId, handler: NotificationHandler) -> Result<(), SignalingError> {
        let mut state = self.lock();
        state.handler = Some(handler);
        state.subscriptions += 1;
        Ok(())
    }

    fn unsubscribe(&self) {
        self.lock().handler = None;
    }
}

// ---- media engine ----

/// Shared, ordered record of engine calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, call: impl Into<String>) {
        self.lock().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Number of calls equal to `call`
    pub fn count(&self, call: &str) -> usize {
        self.lock().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn producer(&self, id: &str, kind: MediaKind) -> Box<dyn Producer> {
        Box::new(FakeProducer {
            id: id.to_owned(),
            kind,
            log: self.clone(),
        })
    }

    pub fn consumer(&self, id: &str, producer_id: &str, kind: MediaKind) -> Box<dyn Consumer> {
        Box::new(FakeConsumer {
            id: id.to_owned(),
            producer_id: producer_id.to_owned(),
            kind,
            log: self.clone(),
        })
    }
}

struct FakeProducer {
    id: String,
    kind: MediaKind,
    log: CallLog,
}

impl Producer for FakeProducer {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn pause(&mut self) {
        self.log.record(format!("producer.pause:{}", self.id));
    }

    fn resume(&mut self) {
        self.log.record(format!("producer.resume:{}", self.id));
    }

    fn close(&mut self) {
        self.log.record(format!("producer.close:{}", self.id));
    }
}

struct FakeConsumer {
    id: String,
    producer_id: String,
    kind: MediaKind,
    log: CallLog,
}

impl Consumer for FakeConsumer {
    fn id(&self) -> &str {
        &self.id
    }

    fn producer_id(&self) -> &str {
        &self.producer_id
    }

    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn track(&self) -> TrackHandle {
        TrackHandle::new(format!("track-{}", self.id), self.kind)
    }

    fn pause(&mut self) {
        self.log.record(format!("consumer.pause:{}", self.id));
    }

    fn resume(&mut self) {
        self.log.record(format!("consumer.resume:{}", self.id));
    }

    fn close(&mut self) {
        self.log.record(format!("consumer.close:{}", self.id));
    }
}

#[derive(Debug, Clone, Default)]
struct EngineSettings {
    no_produce: Vec<MediaKind>,
    no_consume: Vec<MediaKind>,
    fail_load: bool,
}

/// In-memory media engine
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    log: CallLog,
    settings: EngineSettings,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }

    pub fn without_produce(mut self, kind: MediaKind) -> Self {
        self.settings.no_produce.push(kind);
        self
    }

    pub fn without_consume(mut self, kind: MediaKind) -> Self {
        self.settings.no_consume.push(kind);
        self
    }

    pub fn fail_load(mut self) -> Self {
        self.settings.fail_load = true;
        self
    }
}

impl MediaEngine for FakeEngine {
    fn create_device(&self) -> Box<dyn MediaDevice> {
        self.log.record("engine.create_device");
        Box::new(FakeDevice {
            log: self.log.clone(),
            settings: self.settings.clone(),
            loaded: false,
        })
    }

    fn create_local_media(&self) -> Box<dyn LocalMedia> {
        self.log.record("engine.create_local_media");
        Box::new(FakeLocalMedia {
            log: self.log.clone(),
            facing: CameraFacing::Front,
        })
    }
}

struct FakeDevice {
    log: CallLog,
    settings: EngineSettings,
    loaded: bool,
}

impl MediaDevice for FakeDevice {
    fn load(&mut self, _router_rtp_capabilities: &Value) -> Result<(), MediaError> {
        self.log.record("device.load");
        if self.settings.fail_load {
            return Err(MediaError::InvalidCapabilities("no common codecs".into()));
        }
        if self.loaded {
            return Err(MediaError::AlreadyLoaded);
        }
        self.loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn can_produce(&self, kind: MediaKind) -> bool {
        self.loaded && !self.settings.no_produce.contains(&kind)
    }

    fn can_consume(&self, kind: MediaKind) -> bool {
        self.loaded && !self.settings.no_consume.contains(&kind)
    }

    fn rtp_capabilities(&self) -> Result<Value, MediaError> {
        if !self.loaded {
            return Err(MediaError::NotLoaded);
        }
        Ok(json!({ "codecs": [{ "mimeType": "audio/opus" }, { "mimeType": "video/VP8" }] }))
    }

    fn create_send_transport(
        &mut self,
        options: &TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> Result<Box<dyn SendTransport>, MediaError> {
        self.log.record("device.create_send_transport");
        Ok(Box::new(FakeSendTransport {
            id: options.id.clone(),
            listener,
            log: self.log.clone(),
            connected: false,
        }))
    }

    fn create_recv_transport(
        &mut self,
        options: &TransportOptions,
        listener: Arc<dyn TransportListener>,
    ) -> Result<Box<dyn RecvTransport>, MediaError> {
        self.log.record("device.create_recv_transport");
        Ok(Box::new(FakeRecvTransport {
            id: options.id.clone(),
            listener,
            log: self.log.clone(),
            connected: false,
        }))
    }

    fn dispose(&mut self) {
        self.log.record("device.dispose");
        self.loaded = false;
    }
}

fn engine_error(error: SignalingError) -> MediaError {
    MediaError::Engine(error.to_string())
}

struct FakeSendTransport {
    id: String,
    listener: Arc<dyn TransportListener>,
    log: CallLog,
    connected: bool,
}

#[async_trait]
impl SendTransport for FakeSendTransport {
    fn id(&self) -> &str {
        &self.id
    }

    async fn produce(&mut self, track: TrackHandle) -> Result<Box<dyn Producer>, MediaError> {
        if !self.connected {
            self.listener
                .on_connect(&self.id, json!({ "role": "client" }))
                .await
                .map_err(engine_error)?;
            self.connected = true;
            self.listener.on_connection_state_change(&self.id, "connected");
        }

        let producer_id = self
            .listener
            .on_produce(
                &self.id,
                track.kind,
                json!({ "codecs": [] }),
                json!({ "mediaTag": track.kind.camera_tag().as_str() }),
            )
            .await
            .map_err(engine_error)?;

        self.log.record(format!("send.produce:{}", track.kind));
        Ok(self.log.producer(&producer_id, track.kind))
    }

    fn close(&mut self) {
        self.log.record("send.close");
    }

    fn dispose(&mut self) {
        self.log.record("send.dispose");
    }
}

struct FakeRecvTransport {
    id: String,
    listener: Arc<dyn TransportListener>,
    log: CallLog,
    connected: bool,
}

#[async_trait]
impl RecvTransport for FakeRecvTransport {
    fn id(&self) -> &str {
        &self.id
    }

    async fn consume(&mut self, params: ConsumeParams) -> Result<Box<dyn Consumer>, MediaError> {
        if !self.connected {
            self.listener
                .on_connect(&self.id, json!({ "role": "client" }))
                .await
                .map_err(engine_error)?;
            self.connected = true;
        }

        self.log.record(format!("recv.consume:{}", params.id));
        Ok(self.log.consumer(&params.id, &params.producer_id, params.kind))
    }

    fn close(&mut self) {
        self.log.record("recv.close");
    }

    fn dispose(&mut self) {
        self.log.record("recv.dispose");
    }
}

struct FakeLocalMedia {
    log: CallLog,
    facing: CameraFacing,
}

impl LocalMedia for FakeLocalMedia {
    fn create_track(&mut self, kind: MediaKind) -> Result<Box<dyn LocalTrack>, MediaError> {
        self.log.record(format!("media.create_track:{}", kind));
        Ok(Box::new(FakeTrack {
            handle: TrackHandle::new(format!("local-{}", kind), kind),
            log: self.log.clone(),
        }))
    }

    fn start_capture(&mut self) -> Result<(), MediaError> {
        self.log.record("media.start_capture");
        Ok(())
    }

    fn stop_capture(&mut self) -> Result<(), MediaError> {
        self.log.record("media.stop_capture");
        Ok(())
    }

    fn switch_camera(&mut self) -> Result<CameraFacing, MediaError> {
        self.facing = match self.facing {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        };
        self.log.record("media.switch_camera");
        Ok(self.facing)
    }

    fn dispose(&mut self) {
        self.log.record("media.dispose");
    }
}

struct FakeTrack {
    handle: TrackHandle,
    log: CallLog,
}

impl LocalTrack for FakeTrack {
    fn handle(&self) -> TrackHandle {
        self.handle.clone()
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.log
            .record(format!("track.enabled:{}:{}", self.handle.kind, enabled));
    }

    fn dispose(&mut self) {
        self.log.record(format!("track.dispose:{}", self.handle.kind));
    }
}
