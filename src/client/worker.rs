//! Serialized room worker
//!
//! One task owns every piece of session state and processes [`Command`]s
//! one at a time. Signaling requests are awaited inline, so at most one is
//! in flight and a roster pass never interleaves with join, leave or mute.
//!
//! A leave requested by the host sets a shared flag before its command is
//! queued. Every continuation after an await checks the flag and drops its
//! result instead of mutating state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde_json::json;
use tokio::sync::{mpsc, watch};

use crate::capability::CapabilityNegotiator;
use crate::error::{Error, Result};
use crate::media::{
    ClosedResource, ConsumeParams, LocalMedia, LocalTrack, MediaEngine, MediaKind, MediaTag,
    RecvTransport, SendTransport, TransportListener,
};
use crate::registry::{ProducerEntry, ResourceRegistry};
use crate::roster::{RosterDiffer, RosterEffect, RosterSnapshot};
use crate::session::{PeerId, SessionState};
use crate::signaling::{
    CreateTransportResponse, Endpoint, JoinResponse, NotificationHandler, RecvTrackResponse,
    Signaler, TransportDirection, TransportOptions,
};
use crate::stats::{RoomStats, SessionCounters};

use super::command::Command;
use super::config::RoomConfig;
use super::event::RoomEvent;
use super::listener::SignalingTransportListener;
use super::retry::JoinRetry;

/// Channels shared between a worker and its `RoomClient`
pub(crate) struct WorkerLinks {
    pub state: Arc<watch::Sender<SessionState>>,
    pub events: mpsc::Sender<RoomEvent>,
    pub commands: mpsc::WeakSender<Command>,
    pub leave_requested: Arc<AtomicBool>,
}

enum JoinOutcome {
    Joined,
    /// Leave was requested while a join step was in flight
    Abandoned,
}

pub(crate) struct RoomWorker {
    signaler: Signaler,
    engine: Arc<dyn MediaEngine>,
    invariant_guard: bool,

    negotiator: CapabilityNegotiator,
    registry: ResourceRegistry,
    differ: RosterDiffer,
    send_transport: Option<Box<dyn SendTransport>>,
    recv_transport: Option<Box<dyn RecvTransport>>,
    local_media: Option<Box<dyn LocalMedia>>,
    local_tracks: HashMap<MediaKind, Box<dyn LocalTrack>>,

    retry: JoinRetry,
    /// Bumped whenever pending retries must be dropped
    retry_generation: u64,
    counters: SessionCounters,
    joined_at: Option<Instant>,

    state: Arc<watch::Sender<SessionState>>,
    events: mpsc::Sender<RoomEvent>,
    commands: mpsc::WeakSender<Command>,
    leave_requested: Arc<AtomicBool>,
}

impl RoomWorker {
    pub fn new(
        config: &RoomConfig,
        signaler: Signaler,
        engine: Arc<dyn MediaEngine>,
        links: WorkerLinks,
    ) -> Self {
        Self {
            negotiator: CapabilityNegotiator::new(engine.clone()),
            registry: ResourceRegistry::new(),
            differ: RosterDiffer::new(signaler.peer_id().clone(), config.selection.clone()),
            send_transport: None,
            recv_transport: None,
            local_media: None,
            local_tracks: HashMap::new(),
            retry: JoinRetry::new(config.join_retry.clone()),
            retry_generation: 0,
            counters: SessionCounters::default(),
            joined_at: None,
            invariant_guard: config.invariant_guard,
            signaler,
            engine,
            state: links.state,
            events: links.events,
            commands: links.commands,
            leave_requested: links.leave_requested,
        }
    }

    /// Process commands until shutdown or until every sender is gone
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        tracing::debug!(peer_id = %self.signaler.peer_id(), "Room worker started");

        while let Some(command) = commands.recv().await {
            if matches!(command, Command::Shutdown) {
                break;
            }
            self.handle(command).await;
        }

        self.shutdown();
        tracing::debug!(peer_id = %self.signaler.peer_id(), "Room worker stopped");
    }

    pub(crate) async fn handle(&mut self, command: Command) {
        if self.state() == SessionState::Left && !matches!(command, Command::Stats(_)) {
            tracing::debug!(command = command.name(), "Session has left, command ignored");
            return;
        }

        match command {
            Command::Join => self.join().await,
            Command::RetryJoin { generation } => self.retry_join(generation).await,
            Command::Leave => self.leave(),
            Command::EnableMic => self.enable_producer(MediaKind::Audio).await,
            Command::EnableCam => self.enable_producer(MediaKind::Video).await,
            Command::MuteMic => self.set_mic_paused(true).await,
            Command::UnmuteMic => self.set_mic_paused(false).await,
            Command::StartCamera => self.set_capture(true),
            Command::StopCamera => self.set_capture(false),
            Command::SwitchCamera => self.switch_camera(),
            Command::Roster(snapshot) => self.on_roster(snapshot).await,
            Command::ResourceClosed(resource) => self.on_resource_closed(resource),
            Command::Stats(reply) => {
                let _ = reply.send(self.stats());
            }
            Command::Shutdown => {}
        }
    }

    fn shutdown(&mut self) {
        match self.state() {
            SessionState::Idle => self.negotiator.dispose(),
            SessionState::Left => {}
            _ => {
                self.signaler.notify(Endpoint::Leave, json!({}));
                self.teardown();
            }
        }
    }

    // ---- state and host plumbing ----

    fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    fn set_state(&mut self, next: SessionState) {
        let current = self.state();
        if current == next {
            return;
        }

        if !current.can_transition_to(next) {
            tracing::error!(from = %current, to = %next, "Illegal session state transition");
            return;
        }

        self.state.send_replace(next);
        tracing::debug!(from = %current, to = %next, "Session state changed");
        self.post(RoomEvent::StateChanged(next));
    }

    fn leave_requested(&self) -> bool {
        self.leave_requested.load(Ordering::SeqCst)
    }

    fn post(&self, event: RoomEvent) {
        if let Err(e) = self.events.try_send(event) {
            tracing::warn!(error = %e, "Host event dropped");
        }
    }

    fn enqueue(&self, command: Command) {
        let Some(commands) = self.commands.upgrade() else {
            return;
        };

        if let Err(e) = commands.try_send(command) {
            tracing::warn!(error = %e, "Worker queue full, command dropped");
        }
    }

    fn roster_handler(&self) -> NotificationHandler {
        let commands = self.commands.clone();

        Arc::new(move |snapshot: RosterSnapshot| {
            let Some(commands) = commands.upgrade() else {
                return;
            };

            if let Err(e) = commands.try_send(Command::Roster(snapshot)) {
                tracing::warn!(error = %e, "Roster update dropped");
            }
        })
    }

    fn stats(&self) -> RoomStats {
        RoomStats::new(
            self.state(),
            &self.counters,
            self.registry.stats(),
            self.differ.active_peer(),
            self.joined_at,
        )
    }

    // ---- join ----

    async fn join(&mut self) {
        let state = self.state();
        if !state.can_join() {
            tracing::debug!(state = %state, "Join ignored");
            return;
        }

        self.retry.reset();
        self.retry_generation += 1;
        self.attempt_join().await;
    }

    async fn retry_join(&mut self, generation: u64) {
        if generation != self.retry_generation || !self.state().can_join() {
            tracing::debug!(generation, "Stale join retry dropped");
            return;
        }

        self.attempt_join().await;
    }

    async fn attempt_join(&mut self) {
        if self.leave_requested() {
            tracing::debug!("Leave pending, join not started");
            return;
        }

        self.counters.join_attempts += 1;
        self.set_state(SessionState::Joining);
        tracing::info!(
            peer_id = %self.signaler.peer_id(),
            attempt = self.retry.attempts(),
            "Joining room"
        );

        match self.try_join().await {
            Ok(JoinOutcome::Joined) => {}
            Ok(JoinOutcome::Abandoned) => {
                tracing::info!("Leave requested during join");
                self.teardown();
            }
            Err(e) if self.leave_requested() => {
                tracing::debug!(error = %e, "Join failed after leave was requested");
                self.teardown();
            }
            Err(e) => {
                self.counters.join_failures += 1;
                tracing::warn!(error = %e, attempt = self.retry.attempts(), "Join failed");
                self.release_join_resources();
                self.set_state(SessionState::Idle);
                self.schedule_retry();
            }
        }
    }

    async fn try_join(&mut self) -> Result<JoinOutcome> {
        let response: JoinResponse = self
            .signaler
            .request(Endpoint::JoinAsNewPeer, json!({}))
            .await?;
        if self.leave_requested() {
            return Ok(JoinOutcome::Abandoned);
        }

        self.negotiator.load(&response.router_rtp_capabilities)?;
        tracing::info!(
            can_produce_audio = self.negotiator.can_produce(MediaKind::Audio),
            can_produce_video = self.negotiator.can_produce(MediaKind::Video),
            "Router capabilities loaded"
        );

        // Both are always attempted; an unsupported kind is skipped later
        self.enqueue(Command::EnableMic);
        self.enqueue(Command::EnableCam);

        let listener: Arc<dyn TransportListener> = Arc::new(SignalingTransportListener::new(
            self.signaler.clone(),
            self.commands.clone(),
        ));

        let options = request_transport(&self.signaler, TransportDirection::Send).await?;
        if self.leave_requested() {
            return Ok(JoinOutcome::Abandoned);
        }
        let transport = self
            .negotiator
            .create_send_transport(&options, listener.clone())?;
        tracing::info!(transport_id = %transport.id(), "Send transport created");
        self.send_transport = Some(transport);

        let options = request_transport(&self.signaler, TransportDirection::Recv).await?;
        if self.leave_requested() {
            return Ok(JoinOutcome::Abandoned);
        }
        let transport = self.negotiator.create_recv_transport(&options, listener)?;
        tracing::info!(transport_id = %transport.id(), "Recv transport created");
        self.recv_transport = Some(transport);

        self.signaler.subscribe(self.roster_handler())?;
        self.joined_at = Some(Instant::now());
        self.set_state(SessionState::Joined);
        tracing::info!(peer_id = %self.signaler.peer_id(), "Joined room");

        Ok(JoinOutcome::Joined)
    }

    /// Undo a partial join so the next attempt starts clean
    fn release_join_resources(&mut self) {
        self.signaler.unsubscribe();
        self.close_transports();
        self.negotiator.renew();
    }

    fn schedule_retry(&mut self) {
        let Some(delay) = self.retry.next_delay() else {
            let attempts = self.retry.attempts();
            let error = Error::JoinExhausted { attempts };
            tracing::error!(error = %error, "Giving up on joining the room");
            self.post(RoomEvent::JoinFailed { attempts });
            return;
        };

        let generation = self.retry_generation;
        let commands = self.commands.clone();
        tracing::info!(
            delay_ms = delay.as_millis() as u64,
            attempt = self.retry.attempts(),
            "Join retry scheduled"
        );

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(commands) = commands.upgrade() {
                let _ = commands.send(Command::RetryJoin { generation }).await;
            }
        });
    }

    // ---- leave ----

    fn leave(&mut self) {
        match self.state() {
            SessionState::Idle => {
                self.leave_requested.store(false, Ordering::SeqCst);
                self.retry_generation += 1;
                tracing::debug!("Leave before join, nothing to tear down");
            }
            SessionState::Joining | SessionState::Joined => self.teardown(),
            SessionState::Leaving | SessionState::Left => {
                tracing::debug!("Already left");
            }
        }
    }

    /// Release everything the session created and move to `Left`
    fn teardown(&mut self) {
        self.set_state(SessionState::Leaving);
        self.signaler.unsubscribe();

        for mut entry in self.registry.drain_consumers() {
            entry.close();
            self.post(RoomEvent::RemoteTrackDetached {
                peer_id: entry.peer_id.clone(),
                consumer_id: entry.id().to_owned(),
                kind: entry.kind,
            });
        }
        for mut entry in self.registry.drain_producers() {
            entry.close();
        }
        self.close_transports();

        for (_, mut track) in self.local_tracks.drain() {
            track.set_enabled(false);
            track.dispose();
        }
        if let Some(mut media) = self.local_media.take() {
            if let Err(e) = media.stop_capture() {
                tracing::debug!(error = %e, "Stopping capture failed");
            }
            media.dispose();
        }
        self.negotiator.dispose();

        if self.differ.active_peer().is_some() {
            self.post(RoomEvent::ActivePeerChanged(None));
        }
        self.differ.reset();
        self.retry_generation += 1;
        self.joined_at = None;

        self.set_state(SessionState::Left);
        tracing::info!(peer_id = %self.signaler.peer_id(), "Left room");
    }

    fn close_transports(&mut self) {
        if let Some(mut transport) = self.send_transport.take() {
            transport.close();
            transport.dispose();
        }
        if let Some(mut transport) = self.recv_transport.take() {
            transport.close();
            transport.dispose();
        }
    }

    // ---- producers and local media ----

    async fn enable_producer(&mut self, kind: MediaKind) {
        if !self.state().is_joined() || self.leave_requested() {
            tracing::debug!(kind = %kind, "Not joined, producer not enabled");
            return;
        }
        if self.registry.producer_for_kind(kind).is_some() {
            tracing::debug!(kind = %kind, "Producer already exists");
            return;
        }
        if let Err(e) = self.negotiator.ensure_can_produce(kind) {
            tracing::warn!(kind = %kind, error = %e, "Producer skipped");
            return;
        }
        if self.send_transport.is_none() {
            tracing::debug!(kind = %kind, "No send transport, producer not enabled");
            return;
        }

        let Some(track) = self.create_local_track(kind) else {
            return;
        };
        let handle = track.handle();

        let Some(transport) = self.send_transport.as_mut() else {
            return;
        };
        let mut producer = match transport.produce(handle.clone()).await {
            Ok(producer) => producer,
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Producer creation failed");
                self.discard_local_track(track);
                return;
            }
        };

        if self.leave_requested() {
            tracing::debug!(kind = %kind, "Leave requested, new producer discarded");
            producer.close();
            self.discard_local_track(track);
            return;
        }

        let producer_id = producer.id().to_owned();
        if let Err(e) = self.registry.insert_producer(producer) {
            tracing::warn!(kind = %kind, error = %e, "Producer rejected");
            self.discard_local_track(track);
            return;
        }

        self.local_tracks.insert(kind, track);
        tracing::info!(producer_id = %producer_id, kind = %kind, "Producer created");
        if kind == MediaKind::Video {
            self.post(RoomEvent::LocalTrack(handle));
        }
    }

    /// Dispose a track that never got a producer; video also stops capture
    fn discard_local_track(&mut self, mut track: Box<dyn LocalTrack>) {
        if track.handle().kind == MediaKind::Video {
            if let Some(media) = self.local_media.as_mut() {
                if let Err(e) = media.stop_capture() {
                    tracing::debug!(error = %e, "Stopping capture failed");
                }
            }
        }
        track.dispose();
    }

    fn create_local_track(&mut self, kind: MediaKind) -> Option<Box<dyn LocalTrack>> {
        let engine = &self.engine;
        let media = self
            .local_media
            .get_or_insert_with(|| engine.create_local_media());

        let track = match media.create_track(kind) {
            Ok(track) => track,
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Local track not created");
                return None;
            }
        };

        if kind == MediaKind::Video {
            if let Err(e) = media.start_capture() {
                tracing::warn!(error = %e, "Camera capture did not start");
            }
        }

        Some(track)
    }

    fn mic_producer(&self) -> Result<&ProducerEntry> {
        self.registry
            .producer_for_kind(MediaKind::Audio)
            .ok_or_else(|| Error::ResourceState("no open microphone producer".into()))
    }

    fn local_media_mut(&mut self) -> Result<&mut Box<dyn LocalMedia>> {
        self.local_media
            .as_mut()
            .ok_or_else(|| Error::ResourceState("no local media".into()))
    }

    async fn set_mic_paused(&mut self, paused: bool) {
        let entry = match self.mic_producer() {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(paused, error = %e, "Microphone unchanged");
                return;
            }
        };
        if entry.paused == paused {
            tracing::debug!(paused, "Microphone already in requested state");
            return;
        }

        let producer_id = entry.id().to_owned();
        let endpoint = if paused {
            Endpoint::PauseProducer
        } else {
            Endpoint::ResumeProducer
        };

        if let Err(e) = self
            .signaler
            .request_ack(endpoint, json!({ "producerId": producer_id }))
            .await
        {
            self.counters.signaling_failures += 1;
            tracing::warn!(producer_id = %producer_id, error = %e, "{} failed", endpoint);
            return;
        }

        if let Some(entry) = self.registry.producer_mut(&producer_id) {
            if entry.set_paused(paused) {
                tracing::info!(producer_id = %producer_id, paused, "Microphone state changed");
            }
        }
    }

    fn set_capture(&mut self, start: bool) {
        let media = match self.local_media_mut() {
            Ok(media) => media,
            Err(e) => {
                tracing::debug!(start, error = %e, "Capture unchanged");
                return;
            }
        };

        let result = if start {
            media.start_capture()
        } else {
            media.stop_capture()
        };

        match result {
            Ok(()) => tracing::info!(capturing = start, "Camera capture changed"),
            Err(e) => tracing::warn!(start, error = %e, "Camera capture change failed"),
        }
    }

    fn switch_camera(&mut self) {
        let media = match self.local_media_mut() {
            Ok(media) => media,
            Err(e) => {
                tracing::debug!(error = %e, "Camera not switched");
                return;
            }
        };

        match media.switch_camera() {
            Ok(facing) => {
                tracing::info!(facing = ?facing, "Camera switched");
                self.post(RoomEvent::CameraSwitched(facing));
            }
            Err(e) => tracing::warn!(error = %e, "Camera switch failed"),
        }
    }

    // ---- roster and consumers ----

    async fn on_roster(&mut self, snapshot: RosterSnapshot) {
        if !self.state().is_joined() || self.leave_requested() {
            tracing::debug!(peers = snapshot.len(), "Roster ignored outside of a joined session");
            return;
        }

        self.counters.diff_passes += 1;
        let before = self.differ.active_peer().cloned();
        let effects = self.differ.apply(snapshot, &self.registry);

        for effect in effects {
            if self.leave_requested() {
                tracing::debug!("Leave requested, remaining roster effects dropped");
                return;
            }

            match effect {
                RosterEffect::Subscribe { peer, tag } => self.subscribe(peer, tag).await,
                RosterEffect::Unsubscribe { peer, kind } => self.close_consumer(&peer, kind).await,
                RosterEffect::PeerLeft { peer } => {
                    tracing::debug!(peer = %peer, "Departed peer released");
                }
            }
        }

        let after = self.differ.active_peer().cloned();
        if before != after {
            self.post(RoomEvent::ActivePeerChanged(after));
        }

        if self.invariant_guard {
            self.guard_invariants();
        }
    }

    fn guard_invariants(&mut self) {
        if let Err(e) = self.registry.check_invariants(self.differ.active_peer()) {
            self.counters.resyncs += 1;
            tracing::error!(error = %e, "Subscription state diverged, resynchronising");
            self.resynchronize();
        }
    }

    /// Drop every consumer and the roster history; the next pass rebuilds
    fn resynchronize(&mut self) {
        for mut entry in self.registry.drain_consumers() {
            let consumer_id = entry.id().to_owned();
            self.signaler
                .notify(Endpoint::CloseConsumer, json!({ "consumerId": consumer_id }));
            entry.close();
            self.post(RoomEvent::RemoteTrackDetached {
                peer_id: entry.peer_id.clone(),
                consumer_id,
                kind: entry.kind,
            });
        }

        if self.differ.active_peer().is_some() {
            self.post(RoomEvent::ActivePeerChanged(None));
        }
        self.differ.reset();
    }

    async fn subscribe(&mut self, peer: PeerId, tag: MediaTag) {
        let kind = tag.kind();

        if let Err(e) = self.negotiator.ensure_can_consume(kind) {
            tracing::warn!(peer = %peer, tag = %tag, error = %e, "Subscription skipped");
            return;
        }
        if self.recv_transport.is_none() {
            tracing::debug!(peer = %peer, tag = %tag, "No recv transport, subscription skipped");
            return;
        }
        if let Err(e) = self.registry.check_consumer_slot(&peer, kind) {
            tracing::warn!(peer = %peer, tag = %tag, error = %e, "Subscription refused");
            return;
        }
        let rtp_capabilities = match self.negotiator.rtp_capabilities() {
            Ok(capabilities) => capabilities,
            Err(e) => {
                tracing::warn!(error = %e, "Local capabilities unavailable");
                return;
            }
        };

        let response: RecvTrackResponse = match self
            .signaler
            .request(
                Endpoint::RecvTrack,
                json!({
                    "rtpCapabilities": rtp_capabilities,
                    "mediaTag": tag,
                    "mediaPeerId": peer,
                }),
            )
            .await
        {
            Ok(response) => response,
            Err(e) => {
                self.counters.signaling_failures += 1;
                tracing::warn!(peer = %peer, tag = %tag, error = %e, "recv-track failed");
                return;
            }
        };
        if self.leave_requested() {
            tracing::debug!(peer = %peer, tag = %tag, "Leave requested, subscription dropped");
            return;
        }

        let producer_paused = response.producer_paused;
        let params = ConsumeParams {
            id: response.id,
            producer_id: response.producer_id,
            kind: response.kind,
            rtp_parameters: response.rtp_parameters,
        };
        let Some(transport) = self.recv_transport.as_mut() else {
            return;
        };
        let mut consumer = match transport.consume(params).await {
            Ok(consumer) => consumer,
            Err(e) => {
                tracing::warn!(peer = %peer, tag = %tag, error = %e, "Consumer not bound");
                return;
            }
        };
        if self.leave_requested() {
            consumer.close();
            return;
        }

        let consumer_id = consumer.id().to_owned();
        let track = consumer.track();
        if let Err(e) = self.registry.insert_consumer(peer.clone(), consumer) {
            tracing::warn!(peer = %peer, consumer_id = %consumer_id, error = %e, "Consumer rejected");
            return;
        }
        self.counters.subscribes += 1;

        match self
            .signaler
            .request_ack(Endpoint::ResumeConsumer, json!({ "consumerId": consumer_id }))
            .await
        {
            Ok(()) => {
                if let Some(entry) = self.registry.consumer_mut(&consumer_id) {
                    entry.resume();
                }
            }
            Err(e) => {
                self.counters.signaling_failures += 1;
                tracing::warn!(consumer_id = %consumer_id, error = %e, "resume-consumer failed, consumer stays paused");
            }
        }

        tracing::info!(
            peer = %peer,
            consumer_id = %consumer_id,
            kind = %kind,
            producer_paused,
            "Subscribed"
        );
        self.post(RoomEvent::RemoteTrackAttached {
            peer_id: peer,
            consumer_id,
            track,
        });
    }

    async fn close_consumer(&mut self, peer: &PeerId, kind: MediaKind) {
        let Some(consumer_id) = self.registry.consumer_id_for(peer, kind).map(str::to_owned) else {
            tracing::debug!(peer = %peer, kind = %kind, "No consumer to close");
            return;
        };
        if !self.registry.begin_close_consumer(&consumer_id) {
            tracing::debug!(consumer_id = %consumer_id, "Consumer already closing");
            return;
        }

        if let Err(e) = self
            .signaler
            .request_ack(Endpoint::CloseConsumer, json!({ "consumerId": consumer_id }))
            .await
        {
            self.counters.signaling_failures += 1;
            tracing::warn!(consumer_id = %consumer_id, error = %e, "close-consumer failed, releasing locally");
        }

        if let Some(mut entry) = self.registry.remove_consumer(&consumer_id) {
            entry.close();
            self.counters.unsubscribes += 1;
            tracing::info!(peer = %peer, consumer_id = %consumer_id, kind = %kind, "Unsubscribed");
            self.post(RoomEvent::RemoteTrackDetached {
                peer_id: entry.peer_id.clone(),
                consumer_id,
                kind: entry.kind,
            });
        }
    }

    fn on_resource_closed(&mut self, resource: ClosedResource) {
        match resource {
            ClosedResource::Producer(id) => match self.registry.remove_producer(&id) {
                Some(mut entry) => {
                    entry.mark_closed();
                    tracing::info!(producer_id = %id, kind = %entry.kind, "Producer closed by transport");
                }
                None => tracing::debug!(producer_id = %id, "Closed producer already released"),
            },
            ClosedResource::Consumer(id) => match self.registry.remove_consumer(&id) {
                Some(mut entry) => {
                    entry.mark_closed();
                    tracing::info!(consumer_id = %id, peer = %entry.peer_id, "Consumer closed by transport");
                    self.post(RoomEvent::RemoteTrackDetached {
                        peer_id: entry.peer_id.clone(),
                        consumer_id: id,
                        kind: entry.kind,
                    });
                }
                None => tracing::debug!(consumer_id = %id, "Closed consumer already released"),
            },
        }
    }
}

async fn request_transport(
    signaler: &Signaler,
    direction: TransportDirection,
) -> Result<TransportOptions> {
    let response: CreateTransportResponse = signaler
        .request(Endpoint::CreateTransport, json!({ "direction": direction }))
        .await?;
    Ok(response.transport_options)
}
