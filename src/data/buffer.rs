//! Bounded, time-ordered window of recent readings.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use super::timestamp::parse_timestamp;
use rigwatch_types::Reading;

/// Number of readings kept per equipment unit.
pub const DEFAULT_CAPACITY: usize = 30;

#[derive(Debug, Clone)]
struct Entry {
    /// Parsed timestamp; `None` sorts before every valid time.
    at: Option<DateTime<Utc>>,
    reading: Reading,
}

/// Sliding window of the most recent readings for one equipment unit.
///
/// Readings are kept in ascending timestamp order no matter the order they
/// arrive in. Once the window holds `capacity` readings, the oldest are
/// evicted. Readings with equal timestamps keep their arrival order.
#[derive(Debug, Clone)]
pub struct ReadingBuffer {
    entries: VecDeque<Entry>,
    capacity: usize,
}

impl Default for ReadingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingBuffer {
    /// Create an empty buffer holding [`DEFAULT_CAPACITY`] readings.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with a fixed capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert a reading at its chronological position, then evict the
    /// oldest readings beyond capacity.
    pub fn push(&mut self, reading: Reading) {
        let at = parse_timestamp(&reading.timestamp);
        // Upper bound keeps equal timestamps in arrival order
        let index = self.entries.partition_point(|e| e.at <= at);
        self.entries.insert(index, Entry { at, reading });

        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Push every reading from a batch.
    pub fn extend<I>(&mut self, readings: I)
    where
        I: IntoIterator<Item = Reading>,
    {
        for reading in readings {
            self.push(reading);
        }
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.iter().cloned().collect()
    }

    /// The most recent reading, or `None` when no data has arrived.
    pub fn latest(&self) -> Option<&Reading> {
        self.entries.back().map(|e| &e.reading)
    }

    /// Iterate oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Reading> + ExactSizeIterator + '_ {
        self.entries.iter().map(|e| &e.reading)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every reading. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::timestamp::to_timestamp;
    use chrono::{Duration, TimeZone};

    fn at(seconds: i64) -> String {
        let base = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        to_timestamp(base + Duration::seconds(seconds))
    }

    fn reading(seconds: i64) -> Reading {
        Reading::builder(at(seconds)).rpm(seconds as f64).build()
    }

    fn rpms(buffer: &ReadingBuffer) -> Vec<f64> {
        buffer.iter().map(|r| r.rpm).collect()
    }

    #[test]
    fn test_empty_buffer_has_no_latest() {
        let buffer = ReadingBuffer::new();
        assert!(buffer.is_empty());
        assert!(buffer.latest().is_none());
        assert_eq!(buffer.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_keeps_last_thirty_of_thirty_five() {
        let mut buffer = ReadingBuffer::new();
        for s in 0..35 {
            buffer.push(reading(s));
        }

        assert_eq!(buffer.len(), 30);
        let expected: Vec<f64> = (5..35).map(|s| s as f64).collect();
        assert_eq!(rpms(&buffer), expected);
        assert_eq!(buffer.latest().unwrap().rpm, 34.0);
    }

    #[test]
    fn test_out_of_order_pushes_stay_sorted() {
        let mut buffer = ReadingBuffer::new();
        for s in [5, 1, 9, 3, 7, 2] {
            buffer.push(reading(s));
        }

        assert_eq!(rpms(&buffer), vec![1.0, 2.0, 3.0, 5.0, 7.0, 9.0]);
        assert_eq!(buffer.latest().unwrap().rpm, 9.0);
    }

    #[test]
    fn test_descending_batch_is_reordered() {
        let mut buffer = ReadingBuffer::new();
        buffer.extend((0..10).rev().map(reading));

        let expected: Vec<f64> = (0..10).map(|s| s as f64).collect();
        assert_eq!(rpms(&buffer), expected);
    }

    #[test]
    fn test_late_old_reading_is_evicted_when_full() {
        let mut buffer = ReadingBuffer::with_capacity(3);
        buffer.extend([reading(10), reading(11), reading(12)]);
        buffer.push(reading(1));

        assert_eq!(rpms(&buffer), vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn test_equal_timestamps_keep_arrival_order() {
        let mut buffer = ReadingBuffer::new();
        let ts = at(0);
        buffer.push(Reading::builder(ts.clone()).rpm(1.0).build());
        buffer.push(Reading::builder(ts).rpm(2.0).build());

        assert_eq!(rpms(&buffer), vec![1.0, 2.0]);
    }

    #[test]
    fn test_unparsable_timestamps_sort_oldest() {
        let mut buffer = ReadingBuffer::with_capacity(2);
        buffer.push(reading(1));
        buffer.push(Reading::builder("garbage").rpm(-1.0).build());
        assert_eq!(rpms(&buffer), vec![-1.0, 1.0]);

        buffer.push(reading(2));
        assert_eq!(rpms(&buffer), vec![1.0, 2.0]);
    }

    #[test]
    fn test_clear() {
        let mut buffer = ReadingBuffer::new();
        buffer.push(reading(0));
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
    }
}
