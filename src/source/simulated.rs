//! Simulated data source.
//!
//! Serves a demo equipment document and a timer-driven stream of generated
//! readings, so the feed can run with no live backend.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::debug;

use super::{
    DataSource, EquipmentUpdate, EventSink, ReadingsUpdate, SampleGenerator, Sampler, Subscription,
};
use crate::data::buffer::DEFAULT_CAPACITY;
use crate::data::timestamp::to_timestamp;
use rigwatch_types::{Equipment, EquipmentStatus};

/// Time between generated readings.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3000);

/// Longest accepted tick interval.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// The equipment document served for `equipment_id` in simulated mode.
pub fn demo_equipment(equipment_id: &str) -> Equipment {
    let now = Utc::now();
    Equipment {
        id: equipment_id.to_string(),
        name: "Demo Industrial Motor".to_string(),
        status: EquipmentStatus::Operational,
        health: 0.87,
        last_maintenance: to_timestamp(now - ChronoDuration::days(30)),
        next_maintenance: to_timestamp(now + ChronoDuration::days(60)),
        anomaly_threshold: 0.8,
    }
}

/// A data source that generates readings on a fixed interval.
///
/// Each readings subscription first delivers `prefill` samples spaced one
/// interval apart and ending now, then one new sample per tick. The sampler
/// is shared by all subscriptions.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rigwatch::{EquipmentFeed, SampleGenerator, SimulatedSource};
///
/// # tokio_test::block_on(async {
/// let source = SimulatedSource::new(SampleGenerator::seeded(1));
/// let mut feed = EquipmentFeed::new(Arc::new(source));
/// feed.start("mock-equipment-1");
/// # });
/// ```
#[derive(Clone)]
pub struct SimulatedSource {
    sampler: Arc<Mutex<Box<dyn Sampler>>>,
    interval: Duration,
    prefill: usize,
    equipment: Option<Equipment>,
    description: String,
}

impl SimulatedSource {
    /// Create a simulated source drawing samples from `sampler`.
    pub fn new<S: Sampler>(sampler: S) -> Self {
        Self {
            sampler: Arc::new(Mutex::new(Box::new(sampler))),
            interval: DEFAULT_INTERVAL,
            prefill: DEFAULT_CAPACITY,
            equipment: None,
            description: format!("simulated: every {}ms", DEFAULT_INTERVAL.as_millis()),
        }
    }

    /// Create a simulated source with an entropy-seeded generator.
    pub fn random() -> Self {
        Self::new(SampleGenerator::new())
    }

    /// Set the tick interval, clamped between one millisecond and
    /// [`MAX_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        let interval = interval.clamp(Duration::from_millis(1), MAX_INTERVAL);
        self.interval = interval;
        self.description = format!("simulated: every {}ms", interval.as_millis());
        self
    }

    /// Set how many samples are delivered before the first tick.
    pub fn with_prefill(mut self, prefill: usize) -> Self {
        self.prefill = prefill;
        self
    }

    /// Serve this document instead of [`demo_equipment`].
    ///
    /// The document's `id` is replaced by the subscribed identifier.
    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = Some(equipment);
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl fmt::Debug for SimulatedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedSource")
            .field("interval", &self.interval)
            .field("prefill", &self.prefill)
            .finish()
    }
}

/// Up to `count` instants spaced `interval` apart and ending at `now`,
/// oldest first. Stops early rather than repeat an instant.
fn prefill_times(now: DateTime<Utc>, interval: Duration, count: usize) -> Vec<DateTime<Utc>> {
    let Ok(step) = ChronoDuration::from_std(interval) else {
        return vec![now];
    };
    let mut times = Vec::with_capacity(count);
    let mut at = Some(now);
    while times.len() < count {
        let Some(current) = at else { break };
        times.push(current);
        at = current.checked_sub_signed(step);
    }
    times.reverse();
    times
}

impl DataSource for SimulatedSource {
    fn subscribe_equipment(&self, equipment_id: &str, sink: EventSink) -> Subscription {
        let document = match &self.equipment {
            Some(template) => Equipment {
                id: equipment_id.to_string(),
                ..template.clone()
            },
            None => demo_equipment(equipment_id),
        };

        Subscription::from_task(tokio::spawn(async move {
            sink.equipment(EquipmentUpdate::Snapshot(document)).await;
        }))
    }

    fn subscribe_readings(&self, equipment_id: &str, sink: EventSink) -> Subscription {
        let sampler = self.sampler.clone();
        let interval = self.interval;
        let prefill = self.prefill;
        let equipment_id = equipment_id.to_string();

        Subscription::from_task(tokio::spawn(async move {
            let initial = {
                let times = prefill_times(Utc::now(), interval, prefill);
                let mut sampler = sampler.lock();
                times.into_iter().map(|at| sampler.sample(at)).collect::<Vec<_>>()
            };
            debug!("{}: prefilled {} simulated readings", equipment_id, initial.len());
            if !sink.readings(ReadingsUpdate::Batch(initial)).await {
                return;
            }

            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let reading = sampler.lock().sample(Utc::now());
                if !sink.readings(ReadingsUpdate::Batch(vec![reading])).await {
                    // Feed dropped
                    break;
                }
            }
        }))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::timestamp::parse_timestamp;
    use crate::source::{Envelope, SourceEvent};
    use chrono::TimeZone;
    use rigwatch_types::Reading;

    fn expect_batch(envelope: Option<Envelope>) -> Vec<Reading> {
        match envelope.map(|e| e.event) {
            Some(SourceEvent::Readings(ReadingsUpdate::Batch(batch))) => batch,
            other => panic!("expected a readings batch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_equipment_snapshot_uses_requested_id() {
        let source = SimulatedSource::new(SampleGenerator::seeded(1));
        let (sink, mut rx) = EventSink::channel(1);
        let _sub = source.subscribe_equipment("press-3", sink);

        match rx.recv().await.map(|e| e.event) {
            Some(SourceEvent::Equipment(EquipmentUpdate::Snapshot(e))) => {
                assert_eq!(e.id, "press-3");
                assert_eq!(e.status, EquipmentStatus::Operational);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_template_equipment_gets_requested_id() {
        let source = SimulatedSource::new(SampleGenerator::seeded(1))
            .with_equipment(demo_equipment("template"));
        let (sink, mut rx) = EventSink::channel(1);
        let _sub = source.subscribe_equipment("lathe-1", sink);

        match rx.recv().await.map(|e| e.event) {
            Some(SourceEvent::Equipment(EquipmentUpdate::Snapshot(e))) => {
                assert_eq!(e.id, "lathe-1")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefill_then_tick() {
        let source = SimulatedSource::new(SampleGenerator::seeded(5));
        let (sink, mut rx) = EventSink::channel(1);
        let _sub = source.subscribe_readings("m-1", sink);

        let initial = expect_batch(rx.recv().await);
        assert_eq!(initial.len(), 30);

        let times: Vec<DateTime<Utc>> = initial
            .iter()
            .map(|r| parse_timestamp(&r.timestamp).unwrap())
            .collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!((times[29] - times[0]).num_milliseconds(), 29 * 3000);

        tokio::time::advance(DEFAULT_INTERVAL).await;
        let next = expect_batch(rx.recv().await);
        assert_eq!(next.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_interval_and_prefill() {
        let source = SimulatedSource::new(SampleGenerator::seeded(5))
            .with_interval(Duration::from_millis(250))
            .with_prefill(3);
        assert_eq!(source.description(), "simulated: every 250ms");

        let (sink, mut rx) = EventSink::channel(1);
        let _sub = source.subscribe_readings("m-1", sink);
        assert_eq!(expect_batch(rx.recv().await).len(), 3);

        tokio::time::advance(Duration::from_millis(250)).await;
        assert_eq!(expect_batch(rx.recv().await).len(), 1);
    }

    #[test]
    fn test_oversized_interval_is_clamped() {
        let source = SimulatedSource::random().with_interval(Duration::MAX);
        assert_eq!(source.interval(), MAX_INTERVAL);
        assert_eq!(source.description(), "simulated: every 86400000ms");
    }

    #[test]
    fn test_prefill_times_strictly_increase() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let times = prefill_times(now, MAX_INTERVAL, 30);

        assert_eq!(times.len(), 30);
        assert_eq!(times[29], now);
        assert!(times.windows(2).all(|w| (w[1] - w[0]).num_seconds() == 86_400));
    }

    #[test]
    fn test_prefill_times_stop_at_earliest_instant() {
        let now = DateTime::<Utc>::MIN_UTC + ChronoDuration::seconds(5);
        let times = prefill_times(now, Duration::from_secs(2), 10);

        assert_eq!(times.len(), 3);
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_ticks() {
        let source = SimulatedSource::new(SampleGenerator::seeded(5)).with_prefill(0);
        let (sink, mut rx) = EventSink::channel(1);
        let mut sub = source.subscribe_readings("m-1", sink);

        assert!(expect_batch(rx.recv().await).is_empty());
        sub.cancel();

        tokio::time::advance(DEFAULT_INTERVAL * 3).await;
        assert!(rx.recv().await.is_none());
    }
}
