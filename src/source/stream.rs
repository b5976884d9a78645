//! Stream ingest for the live source.
//!
//! Reads newline-delimited JSON records from an async byte stream and
//! applies them to a [`LiveSource`]. This is how a TCP connection or a
//! message bus subscription becomes a live backend.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::LiveSource;
use crate::error::SourceError;
use rigwatch_types::{Equipment, Reading};

/// One line of the ingest protocol.
///
/// ```json
/// {"type":"equipment","id":"pump-7","name":"Pump","status":"operational",...}
/// {"type":"reading","equipmentId":"pump-7","reading":{"rpm":1500,...}}
/// {"type":"removed","equipmentId":"pump-7"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireRecord {
    /// Insert or replace an equipment document.
    Equipment(Equipment),
    /// Append a reading.
    Reading {
        #[serde(rename = "equipmentId")]
        equipment_id: String,
        reading: Reading,
    },
    /// Delete an equipment document.
    Removed {
        #[serde(rename = "equipmentId")]
        equipment_id: String,
    },
}

/// Counters reported when an ingest task finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub applied: usize,
    pub rejected: usize,
}

/// Background task feeding a [`LiveSource`].
///
/// # Example with a byte stream
///
/// ```
/// use std::io::Cursor;
/// use rigwatch::{LiveSource, StreamIngest};
///
/// # tokio_test::block_on(async {
/// let live = LiveSource::new("example");
/// let data = br#"{"type":"removed","equipmentId":"pump-7"}
/// "#;
/// let stats = StreamIngest::spawn(Cursor::new(data.to_vec()), live.clone())
///     .await
///     .unwrap();
/// assert_eq!(stats.applied, 1);
/// # });
/// ```
pub struct StreamIngest;

impl StreamIngest {
    /// Spawn a task that reads records from `reader` until EOF.
    ///
    /// Lines that fail to parse are logged and skipped. When the stream ends
    /// every subscription on `live` fails with [`SourceError::Closed`]; a
    /// read error fails them with [`SourceError::Connection`].
    pub fn spawn<R>(reader: R, live: LiveSource) -> JoinHandle<IngestStats>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            let mut reader = BufReader::new(reader);
            let mut line = String::new();
            let mut stats = IngestStats::default();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        info!("Ingest stream closed after {} records", stats.applied);
                        live.disconnect(SourceError::Closed);
                        break;
                    }
                    Ok(_) => {
                        let text = line.trim();
                        if text.is_empty() {
                            continue;
                        }
                        ingest(&live, text.as_bytes(), &mut stats);
                    }
                    Err(e) => {
                        warn!("Ingest read error: {}", e);
                        live.disconnect(SourceError::Connection(e.to_string()));
                        break;
                    }
                }
            }
            stats
        })
    }

    /// Spawn a task that applies records pushed as raw JSON bytes.
    ///
    /// This is useful when records arrive from something other than an
    /// `AsyncRead`, like a message bus. The task ends when every sender is
    /// dropped; the live source is left connected.
    pub fn from_bytes_channel(
        mut rx: mpsc::Receiver<Vec<u8>>,
        live: LiveSource,
    ) -> JoinHandle<IngestStats> {
        tokio::spawn(async move {
            let mut stats = IngestStats::default();
            while let Some(bytes) = rx.recv().await {
                ingest(&live, &bytes, &mut stats);
            }
            stats
        })
    }

    /// Apply a single record.
    pub fn apply(live: &LiveSource, record: WireRecord) {
        match record {
            WireRecord::Equipment(equipment) => {
                debug!("Ingest: equipment {}", equipment.id);
                live.upsert_equipment(equipment);
            }
            WireRecord::Reading {
                equipment_id,
                reading,
            } => live.append_reading(&equipment_id, reading),
            WireRecord::Removed { equipment_id } => {
                debug!("Ingest: removed {}", equipment_id);
                live.remove_equipment(&equipment_id);
            }
        }
    }
}

fn ingest(live: &LiveSource, bytes: &[u8], stats: &mut IngestStats) {
    match serde_json::from_slice::<WireRecord>(bytes) {
        Ok(record) => {
            StreamIngest::apply(live, record);
            stats.applied += 1;
        }
        Err(e) => {
            warn!("Skipping record: {}", SourceError::Parse(e.to_string()));
            stats.rejected += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{DataSource, EquipmentUpdate, EventSink, ReadingsUpdate, SourceEvent};
    use rigwatch_types::EquipmentStatus;
    use std::io::Cursor;

    fn equipment_json() -> &'static str {
        r#"{"type":"equipment","id":"pump-7","name":"Coolant Pump","status":"needs attention","health":0.55,"lastMaintenance":"2025-01-10T08:00:00Z","nextMaintenance":"2025-04-10T08:00:00Z","anomalyThreshold":0.8}"#
    }

    fn reading_json() -> &'static str {
        r#"{"type":"reading","equipmentId":"pump-7","reading":{"rpm":1500,"voltage":16.5,"temperature":72,"humidity":45,"accelerationX":16384,"accelerationY":0,"accelerationZ":0,"timestamp":"2025-03-01T12:00:00Z"}}"#
    }

    #[test]
    fn test_wire_record_parses_equipment() {
        let record: WireRecord = serde_json::from_str(equipment_json()).unwrap();
        match record {
            WireRecord::Equipment(e) => {
                assert_eq!(e.id, "pump-7");
                assert_eq!(e.status, EquipmentStatus::NeedsAttention);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_wire_record_derives_missing_vibration() {
        let record: WireRecord = serde_json::from_str(reading_json()).unwrap();
        match record {
            WireRecord::Reading {
                equipment_id,
                reading,
            } => {
                assert_eq!(equipment_id, "pump-7");
                assert_eq!(reading.vibration, 1.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_spawn_applies_records() {
        let live = LiveSource::new("test");
        let data = format!("{}\n\n{}\n", equipment_json(), reading_json());

        let stats = StreamIngest::spawn(Cursor::new(data), live.clone())
            .await
            .unwrap();

        assert_eq!(stats, IngestStats { applied: 2, rejected: 0 });
        assert_eq!(live.equipment("pump-7").unwrap().name, "Coolant Pump");
        assert_eq!(live.readings("pump-7").len(), 1);
    }

    #[tokio::test]
    async fn test_spawn_skips_invalid_lines() {
        let live = LiveSource::new("test");
        let data = format!("not valid json\n{}\n{{\"type\":\"bogus\"}}\n", reading_json());

        let stats = StreamIngest::spawn(Cursor::new(data), live.clone())
            .await
            .unwrap();

        assert_eq!(stats, IngestStats { applied: 1, rejected: 2 });
        assert_eq!(live.readings("pump-7").len(), 1);
    }

    #[tokio::test]
    async fn test_reading_missing_fields_is_rejected() {
        let live = LiveSource::new("test");
        let data = concat!(
            r#"{"type":"reading","equipmentId":"x","reading":{}}"#,
            "\n",
            r#"{"type":"reading","equipmentId":"x","reading":{"rpm":1500,"voltage":16.5}}"#,
            "\n",
        );

        let stats = StreamIngest::spawn(Cursor::new(data), live.clone())
            .await
            .unwrap();

        assert_eq!(stats, IngestStats { applied: 0, rejected: 2 });
        assert!(live.readings("x").is_empty());
    }

    #[tokio::test]
    async fn test_end_of_stream_fails_subscriptions() {
        let live = LiveSource::new("test");
        let (sink, mut rx) = EventSink::channel(1);
        let _sub = live.subscribe_readings("pump-7", sink);
        assert_eq!(
            rx.recv().await.unwrap().event,
            SourceEvent::Readings(ReadingsUpdate::Batch(Vec::new()))
        );

        StreamIngest::spawn(Cursor::new(""), live.clone()).await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap().event,
            SourceEvent::Readings(ReadingsUpdate::Failed(SourceError::Closed))
        );
    }

    #[tokio::test]
    async fn test_from_bytes_channel() {
        let live = LiveSource::new("test");
        let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
        let task = StreamIngest::from_bytes_channel(rx, live.clone());

        tx.send(equipment_json().as_bytes().to_vec()).await.unwrap();
        tx.send(br#"{"type":"removed","equipmentId":"pump-7"}"#.to_vec())
            .await
            .unwrap();
        drop(tx);

        let stats = task.await.unwrap();
        assert_eq!(stats.applied, 2);
        assert!(live.equipment("pump-7").is_none());

        let (sink, mut events) = EventSink::channel(1);
        let _sub = live.subscribe_equipment("pump-7", sink);
        assert_eq!(
            events.recv().await.unwrap().event,
            SourceEvent::Equipment(EquipmentUpdate::NotFound)
        );
    }
}
