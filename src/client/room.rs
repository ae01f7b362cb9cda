//! Host-facing room session handle
//!
//! `RoomClient` owns nothing but channels. Every operation is queued to the
//! serialized worker; results come back as [`RoomEvent`]s and through the
//! state watch channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::json;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::media::MediaEngine;
use crate::session::{PeerId, SessionState};
use crate::signaling::{Endpoint, Signaler, SignalingPort};
use crate::stats::RoomStats;

use super::command::Command;
use super::config::RoomConfig;
use super::event::RoomEvent;
use super::worker::{RoomWorker, WorkerLinks};

struct WorkerHandle {
    commands: mpsc::Sender<Command>,
    leave_requested: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

/// Session controller for one participant in one room
///
/// Publishes the local microphone and camera and subscribes to a single
/// remote publishing peer at a time.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use sfu_room_rs::client::{RoomClient, RoomConfig, RoomEvent};
/// use sfu_room_rs::media::MediaEngine;
/// use sfu_room_rs::signaling::{HttpSignaling, HttpSignalingConfig};
///
/// # async fn example(engine: Arc<dyn MediaEngine>) -> sfu_room_rs::Result<()> {
/// let signaling = Arc::new(HttpSignaling::new(HttpSignalingConfig::default())?);
/// let (room, mut events) = RoomClient::new(signaling, engine, RoomConfig::default());
///
/// room.join_room().await;
///
/// while let Some(event) = events.recv().await {
///     if let RoomEvent::RemoteTrackAttached { peer_id, track, .. } = event {
///         println!("Render {} from {}", track.id, peer_id);
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct RoomClient {
    config: RoomConfig,
    signaler: Signaler,
    engine: Arc<dyn MediaEngine>,
    state: Arc<watch::Sender<SessionState>>,
    events: mpsc::Sender<RoomEvent>,
    worker: WorkerHandle,
}

impl RoomClient {
    /// Create a session with a fresh random peer id.
    ///
    /// Returns the client and a receiver for events. Must be called from
    /// within a tokio runtime; the worker task is spawned immediately.
    pub fn new(
        signaling: Arc<dyn SignalingPort>,
        engine: Arc<dyn MediaEngine>,
        config: RoomConfig,
    ) -> (Self, mpsc::Receiver<RoomEvent>) {
        Self::with_peer_id(signaling, engine, config, PeerId::random())
    }

    /// Create a session that identifies itself as `peer_id`
    pub fn with_peer_id(
        signaling: Arc<dyn SignalingPort>,
        engine: Arc<dyn MediaEngine>,
        config: RoomConfig,
        peer_id: PeerId,
    ) -> (Self, mpsc::Receiver<RoomEvent>) {
        let (events, rx) = mpsc::channel(config.event_capacity);
        let (state, _) = watch::channel(SessionState::Idle);
        let state = Arc::new(state);
        let signaler = Signaler::new(signaling, peer_id);

        let worker = spawn_worker(&config, &signaler, &engine, &state, &events);
        tracing::debug!(peer_id = %signaler.peer_id(), "Room client created");

        let client = Self {
            config,
            signaler,
            engine,
            state,
            events,
            worker,
        };

        (client, rx)
    }

    /// Identifier sent with every signaling request
    pub fn peer_id(&self) -> &PeerId {
        self.signaler.peer_id()
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch session state changes; survives `reset`
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Join the room. A no-op unless the session is idle.
    pub async fn join_room(&self) {
        self.send(Command::Join).await;
    }

    /// Leave the room. Safe to call repeatedly and while a join is running.
    ///
    /// The leave notification goes out immediately; resources are released
    /// by the worker once any in-flight step returns.
    pub async fn leave_room(&self) {
        self.worker.leave_requested.store(true, Ordering::SeqCst);
        self.signaler.notify(Endpoint::Leave, json!({}));
        self.signaler.unsubscribe();
        self.send(Command::Leave).await;
    }

    /// Start over with a fresh worker and empty registry
    ///
    /// Only valid once the session is idle or has left.
    pub async fn reset(&mut self) -> Result<()> {
        let state = self.state();
        if !state.can_reset() {
            return Err(Error::InvalidState(state));
        }

        let old = std::mem::replace(
            &mut self.worker,
            spawn_worker(
                &self.config,
                &self.signaler,
                &self.engine,
                &self.state,
                &self.events,
            ),
        );
        old.leave_requested.store(true, Ordering::SeqCst);
        if old.commands.send(Command::Shutdown).await.is_ok() {
            let _ = old.task.await;
        }

        self.signaler.unsubscribe();
        self.state.send_replace(SessionState::Idle);
        if state != SessionState::Idle {
            let _ = self.events.try_send(RoomEvent::StateChanged(SessionState::Idle));
        }

        tracing::info!(peer_id = %self.peer_id(), "Room session reset");
        Ok(())
    }

    pub async fn mute_mic(&self) {
        self.send(Command::MuteMic).await;
    }

    pub async fn unmute_mic(&self) {
        self.send(Command::UnmuteMic).await;
    }

    /// Resume camera capture; the video producer is untouched
    pub async fn start_camera(&self) {
        self.send(Command::StartCamera).await;
    }

    /// Stop camera capture; the video producer is untouched
    pub async fn stop_camera(&self) {
        self.send(Command::StopCamera).await;
    }

    pub async fn switch_camera(&self) {
        self.send(Command::SwitchCamera).await;
    }

    /// Snapshot of the session counters, `None` if the worker has stopped
    pub async fn stats(&self) -> Option<RoomStats> {
        let (tx, rx) = oneshot::channel();
        self.worker.commands.send(Command::Stats(tx)).await.ok()?;
        rx.await.ok()
    }

    async fn send(&self, command: Command) {
        let name = command.name();
        if self.worker.commands.send(command).await.is_err() {
            tracing::debug!(command = name, "Room worker stopped, command dropped");
        }
    }
}

impl Drop for RoomClient {
    fn drop(&mut self) {
        self.worker.leave_requested.store(true, Ordering::SeqCst);
        if self.worker.commands.try_send(Command::Shutdown).is_err() {
            self.worker.task.abort();
        }
    }
}

fn spawn_worker(
    config: &RoomConfig,
    signaler: &Signaler,
    engine: &Arc<dyn MediaEngine>,
    state: &Arc<watch::Sender<SessionState>>,
    events: &mpsc::Sender<RoomEvent>,
) -> WorkerHandle {
    let (commands, rx) = mpsc::channel(config.command_capacity);
    let leave_requested = Arc::new(AtomicBool::new(false));

    let links = WorkerLinks {
        state: state.clone(),
        events: events.clone(),
        commands: commands.downgrade(),
        leave_requested: leave_requested.clone(),
    };
    let worker = RoomWorker::new(config, signaler.clone(), engine.clone(), links);
    let task = tokio::spawn(worker.run(rx));

    WorkerHandle {
        commands,
        leave_requested,
        task,
    }
}
