//! Expansion of generator directives into individual detections.
//!
//! Each directive contributes `strike_count` detections at uniformly drawn
//! times inside its interval. The distance follows the directive's rate from
//! wherever the previous directive left the storm, starting at the maximum
//! distance (or the minimum when the storm is closest from the first
//! minute). Output lines have the form `hh:mm distance energy`.

use std::io::{self, Write};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::schema::{MAX_PHASE_STRIKES, StormConfig};
use crate::storm::{GeneratorDirective, Partition};

/// A single simulated lightning detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// Whole minutes since the storm started.
    pub minute: u32,
    /// Reported distance, km.
    pub distance_km: u8,
    /// Reported strike energy.
    pub energy: u32,
}

impl std::fmt::Display for Detection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02}:{:02} {} {}",
            self.minute / 60,
            self.minute % 60,
            self.distance_km,
            self.energy
        )
    }
}

/// Seeded detection generator. The same seed always yields the same output.
#[derive(Debug)]
pub struct DetectionExpander {
    rng: StdRng,
    min_distance_km: f64,
    max_distance_km: f64,
}

impl DetectionExpander {
    /// Creates an expander bounded by the configured distances.
    #[must_use]
    pub fn new(config: &StormConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min_distance_km: f64::from(config.min_distance_km),
            max_distance_km: f64::from(config.max_distance_km),
        }
    }

    /// Expands every directive of `partition`, in chronological order.
    pub fn expand(&mut self, partition: &Partition) -> Vec<Detection> {
        let capacity: u64 = partition
            .directives
            .iter()
            .map(|d| u64::from(d.strike_count))
            .sum();
        // Validated configs stay under this; anything else grows the buffer.
        let capacity = capacity.min(u64::from(MAX_PHASE_STRIKES) * 3);
        let mut detections = Vec::with_capacity(usize::try_from(capacity).unwrap_or_default());

        let mut start = 0.0;
        let mut distance = if partition.timeline.minutes_before_closest > 0.0 {
            self.max_distance_km
        } else {
            self.min_distance_km
        };
        for directive in &partition.directives {
            self.expand_directive(directive, start, distance, &mut detections);
            distance = self
                .clamp(distance + directive.distance_rate_km_per_min * directive.duration_min);
            start += directive.duration_min;
        }

        tracing::debug!(count = detections.len(), "detections expanded");
        detections
    }

    fn expand_directive(
        &mut self,
        directive: &GeneratorDirective,
        start: f64,
        start_distance: f64,
        out: &mut Vec<Detection>,
    ) {
        let end = start + directive.duration_min;
        let mut times: Vec<f64> = (0..directive.strike_count)
            .map(|_| {
                if end > start {
                    self.rng.random_range(start..end)
                } else {
                    start
                }
            })
            .collect();
        times.sort_by(f64::total_cmp);

        for time in times {
            let distance =
                self.clamp(start_distance + directive.distance_rate_km_per_min * (time - start));
            let energy = self
                .rng
                .random_range(directive.energy.low..=directive.energy.high);
            out.push(Detection {
                minute: whole_minutes(time),
                distance_km: whole_km(distance),
                energy,
            });
        }
    }

    fn clamp(&self, distance: f64) -> f64 {
        distance.clamp(self.min_distance_km, self.max_distance_km)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_minutes(minutes: f64) -> u32 {
    minutes.floor().max(0.0) as u32
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_km(distance: f64) -> u8 {
    distance.round().clamp(0.0, f64::from(u8::MAX)) as u8
}

/// Writes one `hh:mm distance energy` line per detection.
///
/// # Errors
///
/// Returns any I/O error from `writer`.
pub fn write_detections<W: Write>(mut writer: W, detections: &[Detection]) -> io::Result<()> {
    for detection in detections {
        writeln!(writer, "{detection}")?;
    }
    writer.flush()
}
