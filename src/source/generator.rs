//! Synthetic sensor samples for demo and offline mode.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::timestamp::to_timestamp;
use rigwatch_types::{derive_vibration, Reading, RawReading, FULL_SCALE_COUNTS};

/// Anything that can produce a reading for a given instant.
///
/// Implemented by [`SampleGenerator`] and by plain closures, which lets
/// tests force exact samples through the simulated source.
pub trait Sampler: Send + 'static {
    fn sample(&mut self, at: DateTime<Utc>) -> Reading;
}

impl<F> Sampler for F
where
    F: FnMut(DateTime<Utc>) -> Reading + Send + 'static,
{
    fn sample(&mut self, at: DateTime<Utc>) -> Reading {
        self(at)
    }
}

/// Generates plausible random readings.
///
/// | parameter    | range            |
/// |--------------|------------------|
/// | rpm          | 1400 - 1700      |
/// | voltage      | 14 - 18          |
/// | temperature  | 60 - 90          |
/// | humidity     | 30 - 70          |
/// | acceleration | -16384 - 16384   |
///
/// Every value is rounded to two decimals and vibration is derived from the
/// rounded acceleration.
#[derive(Debug, Clone)]
pub struct SampleGenerator<R = StdRng> {
    rng: R,
}

impl SampleGenerator<StdRng> {
    /// Create a generator seeded from system entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a reproducible generator.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for SampleGenerator<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SampleGenerator<R> {
    /// Create a generator drawing from `rng`.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a reading stamped with the current time.
    pub fn generate(&mut self) -> Reading {
        self.generate_at(Utc::now())
    }

    /// Generate a reading stamped with `at`.
    pub fn generate_at(&mut self, at: DateTime<Utc>) -> Reading {
        let ax = self.uniform(-FULL_SCALE_COUNTS, FULL_SCALE_COUNTS);
        let ay = self.uniform(-FULL_SCALE_COUNTS, FULL_SCALE_COUNTS);
        let az = self.uniform(-FULL_SCALE_COUNTS, FULL_SCALE_COUNTS);

        Reading::from(RawReading {
            rpm: self.uniform(1400.0, 1700.0),
            voltage: self.uniform(14.0, 18.0),
            temperature: self.uniform(60.0, 90.0),
            humidity: self.uniform(30.0, 70.0),
            vibration: Some(derive_vibration(ax, ay, az)),
            acceleration_x: ax,
            acceleration_y: ay,
            acceleration_z: az,
            timestamp: to_timestamp(at),
        })
    }

    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        round2(self.rng.gen::<f64>() * (max - min) + min)
    }
}

impl<R: Rng + Send + 'static> Sampler for SampleGenerator<R> {
    fn sample(&mut self, at: DateTime<Utc>) -> Reading {
        self.generate_at(at)
    }
}

/// Round to two decimals, halves toward positive infinity.
fn round2(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn assert_two_decimals(value: f64) {
        let scaled = value * 100.0;
        assert!((scaled - scaled.round()).abs() < 1e-6, "{value} has more than 2 decimals");
    }

    #[test]
    fn test_values_within_ranges() {
        let mut generator = SampleGenerator::seeded(42);
        for _ in 0..500 {
            let r = generator.generate();
            assert!((1400.0..=1700.0).contains(&r.rpm));
            assert!((14.0..=18.0).contains(&r.voltage));
            assert!((60.0..=90.0).contains(&r.temperature));
            assert!((30.0..=70.0).contains(&r.humidity));
            for axis in [r.acceleration_x, r.acceleration_y, r.acceleration_z] {
                assert!((-16384.0..=16384.0).contains(&axis));
                assert_two_decimals(axis);
            }
            assert_two_decimals(r.rpm);
            assert_two_decimals(r.voltage);
        }
    }

    #[test]
    fn test_vibration_derived_from_acceleration() {
        let mut generator = SampleGenerator::seeded(7);
        let r = generator.generate();
        assert_eq!(
            r.vibration,
            derive_vibration(r.acceleration_x, r.acceleration_y, r.acceleration_z)
        );
    }

    #[test]
    fn test_seeded_generators_agree() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let a = SampleGenerator::seeded(99).generate_at(at);
        let b = SampleGenerator::seeded(99).generate_at(at);
        assert_eq!(a, b);
        assert_eq!(a.timestamp, "2025-03-01T12:00:00.000Z");
    }

    #[test]
    fn test_closure_sampler() {
        let mut sampler =
            |at: DateTime<Utc>| Reading::builder(to_timestamp(at)).voltage(20.0).build();
        let r = Sampler::sample(&mut sampler, Utc::now());
        assert_eq!(r.voltage, 20.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(1.235_000_1), 1.24);
        assert_eq!(round2(-2.5), -2.5);
    }
}
