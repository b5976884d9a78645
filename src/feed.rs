//! Equipment feed: one monitoring session at a time.
//!
//! The feed owns the session state (equipment document, reading window,
//! thresholds, alerts) and consumes source events through a single channel.
//! Every applied change is published as a [`FeedSnapshot`].

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::data::{evaluate, ParameterStats, ReadingBuffer, ThresholdStore, DEFAULT_CAPACITY};
use crate::error::FeedError;
use crate::source::{
    DataSource, Envelope, EquipmentUpdate, EventSink, ReadingsUpdate, SourceEvent, Subscription,
    EVENT_BUFFER,
};
use rigwatch_types::{
    AlertState, Equipment, Parameter, PartialThresholdConfig, Reading, ThresholdConfig,
};

/// Lifecycle of the current session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FeedState {
    /// No session.
    #[default]
    Idle,
    /// Subscribed, waiting for the first readings delivery.
    Loading,
    /// Readings have arrived.
    Ready,
    /// A subscription failed. Terminal until the next [`EquipmentFeed::start`].
    Failed(FeedError),
}

impl FeedState {
    /// Returns the display label for this state.
    pub fn label(&self) -> &'static str {
        match self {
            FeedState::Idle => "Idle",
            FeedState::Loading => "Loading",
            FeedState::Ready => "Ready",
            FeedState::Failed(_) => "Failed",
        }
    }
}

/// The published state of a feed: everything a view needs to render.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedSnapshot {
    pub equipment_id: Option<String>,
    pub equipment: Option<Equipment>,
    pub loading: bool,
    pub error: Option<String>,
    pub alerts: AlertState,
    /// Oldest first.
    pub readings: Vec<Reading>,
    pub thresholds: ThresholdConfig,
}

#[derive(Debug)]
struct Session {
    equipment_id: String,
    id: u64,
    subscriptions: [Subscription; 2],
}

/// Drives a monitoring session against a [`DataSource`].
///
/// The source is injected once and shared by every session. Starting a new
/// session cancels the previous one first, and events still in flight from
/// it are discarded by session id.
///
/// Thresholds belong to the feed rather than the session: switching
/// equipment keeps them, dropping the feed loses them.
pub struct EquipmentFeed {
    source: Arc<dyn DataSource>,
    tx: mpsc::Sender<Envelope>,
    rx: mpsc::Receiver<Envelope>,
    next_session: u64,
    session: Option<Session>,

    state: FeedState,
    equipment: Option<Equipment>,
    buffer: ReadingBuffer,
    thresholds: ThresholdStore,
    alerts: AlertState,

    published: watch::Sender<FeedSnapshot>,
}

impl EquipmentFeed {
    /// Create an idle feed over `source`.
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self::with_capacity(source, DEFAULT_CAPACITY)
    }

    /// Create an idle feed whose reading window holds `capacity` readings.
    pub fn with_capacity(source: Arc<dyn DataSource>, capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let thresholds = ThresholdStore::new();
        let (published, _) = watch::channel(FeedSnapshot {
            thresholds: thresholds.current(),
            ..FeedSnapshot::default()
        });
        Self {
            source,
            tx,
            rx,
            next_session: 0,
            session: None,
            state: FeedState::Idle,
            equipment: None,
            buffer: ReadingBuffer::with_capacity(capacity),
            thresholds,
            alerts: AlertState::clear(),
            published,
        }
    }

    /// Start monitoring `equipment_id`.
    ///
    /// Any running session is torn down first and the window is emptied
    /// before the new subscriptions are made. Must be called within a tokio
    /// runtime.
    pub fn start(&mut self, equipment_id: &str) {
        self.teardown();

        self.next_session += 1;
        let id = self.next_session;
        let equipment_sub = self
            .source
            .subscribe_equipment(equipment_id, EventSink::new(id, self.tx.clone()));
        let readings_sub = self
            .source
            .subscribe_readings(equipment_id, EventSink::new(id, self.tx.clone()));

        info!(
            "Session {} started for {} ({})",
            id,
            equipment_id,
            self.source.description()
        );
        self.session = Some(Session {
            equipment_id: equipment_id.to_string(),
            id,
            subscriptions: [equipment_sub, readings_sub],
        });
        self.state = FeedState::Loading;
        self.publish();
    }

    /// End the current session. Safe to call when idle.
    pub fn stop(&mut self) {
        if self.teardown() {
            self.publish();
        }
    }

    /// Cancel subscriptions, drop queued events and clear session state.
    fn teardown(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };
        for subscription in &mut session.subscriptions {
            subscription.cancel();
        }
        let mut dropped = 0;
        while self.rx.try_recv().is_ok() {
            dropped += 1;
        }
        info!(
            "Session {} stopped for {} ({} queued events dropped)",
            session.id, session.equipment_id, dropped
        );

        self.state = FeedState::Idle;
        self.equipment = None;
        self.buffer.clear();
        self.alerts = AlertState::clear();
        true
    }

    /// Wait for the next event that changes the session and return the new
    /// published state.
    ///
    /// Cancel safe. When idle this waits until a session is started, so it
    /// is normally raced against other work in `tokio::select!`.
    pub async fn next_update(&mut self) -> FeedSnapshot {
        loop {
            let Some(envelope) = self.rx.recv().await else {
                // The feed holds a sender, so the channel never closes.
                return self.snapshot();
            };
            if self.apply(envelope) {
                self.publish();
                return self.snapshot();
            }
        }
    }

    /// Apply every event already queued, without waiting.
    ///
    /// Returns the number of events that changed the session.
    pub fn try_process(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(envelope) = self.rx.try_recv() {
            if self.apply(envelope) {
                applied += 1;
            }
        }
        if applied > 0 {
            self.publish();
        }
        applied
    }

    /// Apply one event. Returns false when it was discarded.
    fn apply(&mut self, envelope: Envelope) -> bool {
        let current = self.session.as_ref().map(|s| s.id);
        if current != Some(envelope.session) {
            trace!(
                "Dropping event from session {} (current {:?})",
                envelope.session,
                current
            );
            return false;
        }

        match envelope.event {
            SourceEvent::Equipment(EquipmentUpdate::Snapshot(equipment)) => {
                debug!("Equipment {} is {}", equipment.id, equipment.status);
                self.equipment = Some(equipment);
            }
            SourceEvent::Equipment(EquipmentUpdate::NotFound) => {
                self.equipment = None;
                self.fail(FeedError::NotFound);
            }
            SourceEvent::Equipment(EquipmentUpdate::Failed(e)) => {
                self.fail(FeedError::EquipmentTransport(e));
            }
            SourceEvent::Readings(ReadingsUpdate::Batch(batch)) => {
                debug!("Accepted {} readings", batch.len());
                self.buffer.extend(batch);
                self.reevaluate();
                if self.state == FeedState::Loading {
                    self.state = FeedState::Ready;
                }
            }
            SourceEvent::Readings(ReadingsUpdate::Failed(e)) => {
                self.fail(FeedError::ReadingsTransport(e));
            }
        }
        true
    }

    /// Enter the failed state. The first failure of a session is kept.
    fn fail(&mut self, error: FeedError) {
        if let FeedState::Failed(existing) = &self.state {
            debug!("Ignoring {} after {}", error, existing);
            return;
        }
        match std::error::Error::source(&error) {
            Some(cause) => warn!("{}: {}", error, cause),
            None => warn!("{}", error),
        }
        self.state = FeedState::Failed(error);
    }

    fn reevaluate(&mut self) {
        self.alerts = match self.buffer.latest() {
            Some(latest) => evaluate(latest, &self.thresholds.current()),
            None => AlertState::clear(),
        };
    }

    fn publish(&self) {
        self.published.send_replace(self.snapshot());
    }

    /// Merge `partial` into the thresholds and re-evaluate alerts at once.
    pub fn update_thresholds(&mut self, partial: &PartialThresholdConfig) -> ThresholdConfig {
        let thresholds = self.thresholds.update(partial);
        debug!("Thresholds updated: {:?}", thresholds);
        self.reevaluate();
        self.publish();
        thresholds
    }

    /// Restore default thresholds and re-evaluate alerts.
    pub fn reset_thresholds(&mut self) -> ThresholdConfig {
        let thresholds = self.thresholds.reset();
        self.reevaluate();
        self.publish();
        thresholds
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// The identifier of the running session, if any.
    pub fn equipment_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.equipment_id.as_str())
    }

    pub fn equipment(&self) -> Option<&Equipment> {
        self.equipment.as_ref()
    }

    /// Check if the session is waiting for its first readings.
    pub fn loading(&self) -> bool {
        self.state == FeedState::Loading
    }

    /// The user-visible failure reason, if the session failed.
    pub fn error(&self) -> Option<String> {
        match &self.state {
            FeedState::Failed(e) => Some(e.to_string()),
            _ => None,
        }
    }

    pub fn alerts(&self) -> AlertState {
        self.alerts
    }

    /// The reading window, oldest first.
    pub fn readings(&self) -> &ReadingBuffer {
        &self.buffer
    }

    /// The most recent reading, or `None` before any delivery.
    pub fn latest(&self) -> Option<&Reading> {
        self.buffer.latest()
    }

    pub fn thresholds(&self) -> ThresholdConfig {
        self.thresholds.current()
    }

    /// Statistics for one parameter over the window.
    pub fn stats(&self, parameter: Parameter) -> Option<ParameterStats> {
        ParameterStats::compute(self.buffer.iter(), parameter)
    }

    /// Returns a description of the data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Build the current published state.
    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            equipment_id: self.equipment_id().map(str::to_string),
            equipment: self.equipment.clone(),
            loading: self.loading(),
            error: self.error(),
            alerts: self.alerts,
            readings: self.buffer.snapshot(),
            thresholds: self.thresholds.current(),
        }
    }

    /// Subscribe to published state.
    pub fn watch(&self) -> watch::Receiver<FeedSnapshot> {
        self.published.subscribe()
    }
}

impl std::fmt::Debug for EquipmentFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquipmentFeed")
            .field("source", &self.source.description())
            .field("session", &self.session.as_ref().map(|s| s.id))
            .field("state", &self.state)
            .field("readings", &self.buffer.len())
            .finish()
    }
}

impl Drop for EquipmentFeed {
    fn drop(&mut self) {
        self.teardown();
    }
}
