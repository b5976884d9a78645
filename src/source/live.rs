//! Live data source.
//!
//! An in-process store of equipment documents and their readings. Producers
//! (network ingest, a message bus bridge, tests) publish into it; every
//! subscriber receives the current state on subscribe, then each change.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::{DataSource, EquipmentUpdate, EventSink, ReadingsUpdate, Subscription};
use crate::data::buffer::{ReadingBuffer, DEFAULT_CAPACITY};
use crate::error::SourceError;
use rigwatch_types::{Equipment, Reading};

/// Pending changes a slow subscriber may fall behind by.
const CHANGE_BUFFER: usize = 256;

#[derive(Debug, Clone)]
enum Change {
    Equipment(String, Option<Equipment>),
    Reading(String, Reading),
    /// Transport failure for one identifier, or for all when `None`.
    Failure(Option<String>, SourceError),
}

#[derive(Debug)]
struct Record {
    equipment: Option<Equipment>,
    readings: ReadingBuffer,
}

impl Default for Record {
    fn default() -> Self {
        Self {
            equipment: None,
            readings: ReadingBuffer::with_capacity(DEFAULT_CAPACITY),
        }
    }
}

#[derive(Debug)]
struct Inner {
    description: String,
    records: RwLock<HashMap<String, Record>>,
    changes: broadcast::Sender<Change>,
}

/// A data source backed by published live updates.
///
/// Each equipment's readings are kept bounded to the most recent 30 by
/// timestamp. A new readings subscriber receives those first; afterwards it
/// receives each appended reading as it arrives.
///
/// One record is held per identifier that has been published to, until
/// [`LiveSource::remove_equipment`] drops it.
///
/// # Example
///
/// ```
/// use rigwatch::LiveSource;
/// use rigwatch_types::Reading;
///
/// let live = LiveSource::new("tcp://plant-gateway:7000");
/// live.append_reading("pump-7", Reading::builder("2025-03-01T12:00:00Z").rpm(1500.0).build());
/// assert_eq!(live.readings("pump-7").len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct LiveSource {
    inner: Arc<Inner>,
}

impl LiveSource {
    /// Create an empty live source.
    pub fn new(source_description: &str) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            inner: Arc::new(Inner {
                description: format!("live: {}", source_description),
                records: RwLock::new(HashMap::new()),
                changes,
            }),
        }
    }

    /// Insert or replace an equipment document, keyed by its `id`.
    pub fn upsert_equipment(&self, equipment: Equipment) {
        let mut records = self.inner.records.write();
        let id = equipment.id.clone();
        records.entry(id.clone()).or_default().equipment = Some(equipment.clone());
        let _ = self.inner.changes.send(Change::Equipment(id, Some(equipment)));
    }

    /// Delete an equipment document together with its stored readings.
    ///
    /// Active readings subscriptions stay open and receive readings
    /// appended afterwards.
    pub fn remove_equipment(&self, equipment_id: &str) {
        let mut records = self.inner.records.write();
        records.remove(equipment_id);
        let _ = self
            .inner
            .changes
            .send(Change::Equipment(equipment_id.to_string(), None));
    }

    /// Append a reading to an equipment's collection.
    pub fn append_reading(&self, equipment_id: &str, reading: Reading) {
        let mut records = self.inner.records.write();
        records
            .entry(equipment_id.to_string())
            .or_default()
            .readings
            .push(reading.clone());
        let _ = self
            .inner
            .changes
            .send(Change::Reading(equipment_id.to_string(), reading));
    }

    /// Fail every subscription for `equipment_id`.
    pub fn report_error(&self, equipment_id: &str, error: SourceError) {
        let _records = self.inner.records.write();
        let _ = self
            .inner
            .changes
            .send(Change::Failure(Some(equipment_id.to_string()), error));
    }

    /// Fail every subscription, e.g. when the upstream connection drops.
    pub fn disconnect(&self, error: SourceError) {
        let _records = self.inner.records.write();
        let _ = self.inner.changes.send(Change::Failure(None, error));
    }

    /// The current equipment document, if any.
    pub fn equipment(&self, equipment_id: &str) -> Option<Equipment> {
        self.inner
            .records
            .read()
            .get(equipment_id)
            .and_then(|r| r.equipment.clone())
    }

    /// The stored readings, oldest first.
    pub fn readings(&self, equipment_id: &str) -> Vec<Reading> {
        self.inner
            .records
            .read()
            .get(equipment_id)
            .map(|r| r.readings.snapshot())
            .unwrap_or_default()
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.changes.receiver_count()
    }

    /// Read the current value and register for changes under one lock, so
    /// no change can slip in between.
    fn watch<T>(
        &self,
        read: impl FnOnce(Option<&Record>) -> T,
        equipment_id: &str,
    ) -> (T, broadcast::Receiver<Change>) {
        let records = self.inner.records.read();
        let initial = read(records.get(equipment_id));
        (initial, self.inner.changes.subscribe())
    }
}

fn targets(target: &Option<String>, equipment_id: &str) -> bool {
    target.as_deref().map_or(true, |t| t == equipment_id)
}

impl DataSource for LiveSource {
    fn subscribe_equipment(&self, equipment_id: &str, sink: EventSink) -> Subscription {
        let (initial, mut changes) =
            self.watch(|record| record.and_then(|r| r.equipment.clone()), equipment_id);
        let equipment_id = equipment_id.to_string();

        Subscription::from_task(tokio::spawn(async move {
            let first = match initial {
                Some(equipment) => EquipmentUpdate::Snapshot(equipment),
                None => EquipmentUpdate::NotFound,
            };
            if !sink.equipment(first).await {
                return;
            }

            loop {
                let update = match changes.recv().await {
                    Ok(Change::Equipment(id, doc)) if id == equipment_id => match doc {
                        Some(equipment) => EquipmentUpdate::Snapshot(equipment),
                        None => EquipmentUpdate::NotFound,
                    },
                    Ok(Change::Failure(target, error)) if targets(&target, &equipment_id) => {
                        sink.equipment(EquipmentUpdate::Failed(error)).await;
                        break;
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("{}: equipment subscription lagged by {}", equipment_id, missed);
                        sink.equipment(EquipmentUpdate::Failed(SourceError::Lagged(missed)))
                            .await;
                        break;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if !sink.equipment(update).await {
                    break;
                }
            }
        }))
    }

    fn subscribe_readings(&self, equipment_id: &str, sink: EventSink) -> Subscription {
        let (initial, mut changes) = self.watch(
            |record| record.map(|r| r.readings.snapshot()).unwrap_or_default(),
            equipment_id,
        );
        let equipment_id = equipment_id.to_string();

        Subscription::from_task(tokio::spawn(async move {
            debug!("{}: delivering {} stored readings", equipment_id, initial.len());
            if !sink.readings(ReadingsUpdate::Batch(initial)).await {
                return;
            }

            loop {
                let update = match changes.recv().await {
                    Ok(Change::Reading(id, reading)) if id == equipment_id => {
                        ReadingsUpdate::Batch(vec![reading])
                    }
                    Ok(Change::Failure(target, error)) if targets(&target, &equipment_id) => {
                        sink.readings(ReadingsUpdate::Failed(error)).await;
                        break;
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("{}: readings subscription lagged by {}", equipment_id, missed);
                        sink.readings(ReadingsUpdate::Failed(SourceError::Lagged(missed)))
                            .await;
                        break;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if !sink.readings(update).await {
                    break;
                }
            }
        }))
    }

    fn description(&self) -> &str {
        &self.inner.description
    }
}
