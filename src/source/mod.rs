//! Data source abstraction for equipment metadata and readings.
//!
//! A [`DataSource`] offers two subscriptions per equipment identifier: the
//! metadata document and the readings collection. Subscribing hands the
//! source an [`EventSink`]; the source pushes discrete [`SourceEvent`]s into
//! it and returns a [`Subscription`] that cancels delivery when dropped.
//!
//! Implementations:
//!
//! - [`SimulatedSource`]: demo data from a [`SampleGenerator`] on a timer
//! - [`LiveSource`]: an in-process live store that producers publish into,
//!   fed from the network by [`StreamIngest`]

mod generator;
mod live;
mod simulated;
mod stream;

pub use generator::{SampleGenerator, Sampler};
pub use live::LiveSource;
pub use simulated::{demo_equipment, SimulatedSource, DEFAULT_INTERVAL, MAX_INTERVAL};
pub use stream::{IngestStats, StreamIngest, WireRecord};

use std::fmt::Debug;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};

use crate::error::SourceError;
use rigwatch_types::{Equipment, Reading};

/// Capacity of the channel between sources and the feed.
pub const EVENT_BUFFER: usize = 64;

/// An update from the metadata subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum EquipmentUpdate {
    /// Full replacement of the equipment document.
    Snapshot(Equipment),
    /// No document exists for the identifier.
    NotFound,
    /// The subscription failed; no further updates follow.
    Failed(SourceError),
}

/// An update from the readings subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadingsUpdate {
    /// Readings to merge into the window, in any order.
    Batch(Vec<Reading>),
    /// The subscription failed; no further updates follow.
    Failed(SourceError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    Equipment(EquipmentUpdate),
    Readings(ReadingsUpdate),
}

/// A source event tagged with the session it was produced for.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub session: u64,
    pub event: SourceEvent,
}

/// Where a subscription delivers its updates.
///
/// Every event is stamped with the session the sink was created for, so a
/// consumer can discard anything left over from an earlier session.
#[derive(Debug, Clone)]
pub struct EventSink {
    session: u64,
    tx: mpsc::Sender<Envelope>,
}

impl EventSink {
    /// Create a sink for `session` that sends into `tx`.
    pub fn new(session: u64, tx: mpsc::Sender<Envelope>) -> Self {
        Self { session, tx }
    }

    /// Create a sink and the receiver it feeds.
    pub fn channel(session: u64) -> (Self, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        (Self::new(session, tx), rx)
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Deliver a metadata update.
    ///
    /// Returns false once the receiving side is gone.
    pub async fn equipment(&self, update: EquipmentUpdate) -> bool {
        self.send(SourceEvent::Equipment(update)).await
    }

    /// Deliver a readings update.
    ///
    /// Returns false once the receiving side is gone.
    pub async fn readings(&self, update: ReadingsUpdate) -> bool {
        self.send(SourceEvent::Readings(update)).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, event: SourceEvent) -> bool {
        let envelope = Envelope {
            session: self.session,
            event,
        };
        self.tx.send(envelope).await.is_ok()
    }
}

/// Cancellation handle for an active subscription.
///
/// Cancelling aborts the delivering task. It is idempotent and also happens
/// on drop.
#[derive(Debug)]
pub struct Subscription {
    handle: Option<AbortHandle>,
}

impl Subscription {
    /// Tie a subscription to the task that delivers it.
    pub fn from_task(task: JoinHandle<()>) -> Self {
        Self {
            handle: Some(task.abort_handle()),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn inert() -> Self {
        Self { handle: None }
    }

    /// Stop delivery. Safe to call more than once.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Check if delivery may still happen.
    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Trait for sources of equipment metadata and readings.
///
/// Both methods must be called from within a tokio runtime; implementations
/// typically spawn a task per subscription. A source is created once and
/// shared by every session.
pub trait DataSource: Send + Sync + Debug {
    /// Subscribe to the metadata document of `equipment_id`.
    fn subscribe_equipment(&self, equipment_id: &str, sink: EventSink) -> Subscription;

    /// Subscribe to the readings of `equipment_id`.
    fn subscribe_readings(&self, equipment_id: &str, sink: EventSink) -> Subscription;

    /// Returns a human-readable description of the source.
    fn description(&self) -> &str;
}
