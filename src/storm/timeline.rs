//! Storm timeline derived from a [`StormConfig`].
//!
//! All offsets are minutes from the start of the storm. The close window is
//! `[close_start, close_end]`; the storm approaches before it and recedes
//! after it.

use serde::Serialize;

use crate::config::schema::{MAX_STORM_MINUTES, Phase, StormConfig};
use crate::error::TimelineError;

/// Minute offsets and travel parameters for one storm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    /// Sum of the three phase durations.
    pub total_minutes: f64,
    /// Offset where the middle phase starts.
    pub early_end: f64,
    /// Offset where the late phase starts.
    pub middle_end: f64,
    /// Minutes from the start until the storm is closest.
    pub minutes_before_closest: f64,
    /// Length of the close window.
    pub minutes_while_closest: f64,
    /// Minutes from leaving the close window until the end.
    pub minutes_after_closest: f64,
    /// End of the close window rounded to a whole minute, used for classification.
    pub close_minutes: f64,
    /// Distance covered on each leg, km.
    pub distance_traveled_km: f64,
}

impl Timeline {
    /// Derives the timeline.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::EmptyTimeline`] when every phase is 0 minutes
    /// and [`TimelineError::TooLong`] when the phases add up to more than
    /// [`MAX_STORM_MINUTES`].
    pub fn new(config: &StormConfig) -> Result<Self, TimelineError> {
        let total = match config.total_minutes() {
            Some(0) => return Err(TimelineError::EmptyTimeline),
            Some(total) if total <= MAX_STORM_MINUTES => f64::from(total),
            _ => {
                return Err(TimelineError::TooLong {
                    limit: MAX_STORM_MINUTES,
                });
            }
        };

        let early_end = f64::from(config.early.duration_min);
        let middle_end = early_end + f64::from(config.middle.duration_min);

        let minutes_before_closest = total * config.closest_from;
        let minutes_while_closest = (config.closest_to - config.closest_from) * total;
        let minutes_after_closest = total * (1.0 - config.closest_to);

        Ok(Self {
            total_minutes: total,
            early_end,
            middle_end,
            minutes_before_closest,
            minutes_while_closest,
            minutes_after_closest,
            close_minutes: (minutes_before_closest + minutes_while_closest).round(),
            distance_traveled_km: config.distance_traveled_km(),
        })
    }

    /// Offset at which the storm leaves the close window.
    #[must_use]
    pub fn minutes_until_leave_closest(&self) -> f64 {
        self.total_minutes - self.minutes_after_closest
    }

    /// Offset at which the close window starts.
    #[must_use]
    pub const fn close_start(&self) -> f64 {
        self.minutes_before_closest
    }

    /// Offset at which the close window ends.
    #[must_use]
    pub fn close_end(&self) -> f64 {
        self.minutes_before_closest + self.minutes_while_closest
    }

    /// `(start, end)` offsets of a phase.
    #[must_use]
    pub const fn phase_bounds(&self, phase: Phase) -> (f64, f64) {
        match phase {
            Phase::Early => (0.0, self.early_end),
            Phase::Middle => (self.early_end, self.middle_end),
            Phase::Late => (self.middle_end, self.total_minutes),
        }
    }

    /// Approach rate in km/min (never positive).
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoApproach`] when the storm is closest from
    /// minute 0, leaving no time to approach.
    pub fn entry_rate(&self) -> Result<f64, TimelineError> {
        if self.minutes_before_closest <= 0.0 {
            return Err(TimelineError::NoApproach {
                minutes: self.minutes_before_closest,
            });
        }
        Ok(-(self.distance_traveled_km / self.minutes_before_closest))
    }

    /// Departure rate in km/min (never negative).
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoDeparture`] when the storm is closest until
    /// the final minute, leaving no time to recede.
    pub fn exit_rate(&self) -> Result<f64, TimelineError> {
        let denominator = self.total_minutes - self.minutes_until_leave_closest();
        if denominator <= 0.0 {
            return Err(TimelineError::NoDeparture {
                minutes: denominator,
            });
        }
        Ok(self.distance_traveled_km / denominator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{EnergyRange, PhaseSettings};

    fn config(from: f64, to: f64, durations: [u32; 3]) -> StormConfig {
        let phase = |duration_min| PhaseSettings {
            duration_min,
            strikes: 5,
            energy: EnergyRange { low: 1, high: 10 },
        };
        StormConfig {
            min_distance_km: 0,
            max_distance_km: 63,
            closest_from: from,
            closest_to: to,
            early: phase(durations[0]),
            middle: phase(durations[1]),
            late: phase(durations[2]),
        }
    }

    #[test]
    fn derives_close_window() {
        let timeline = Timeline::new(&config(0.1, 0.2, [60, 60, 60])).unwrap();
        assert!((timeline.total_minutes - 180.0).abs() < 1e-9);
        assert!((timeline.close_start() - 18.0).abs() < 1e-9);
        assert!((timeline.close_end() - 36.0).abs() < 1e-9);
        assert!((timeline.minutes_after_closest - 144.0).abs() < 1e-9);
        assert!((timeline.minutes_until_leave_closest() - 36.0).abs() < 1e-9);
        assert!((timeline.close_minutes - 36.0).abs() < 1e-9);
        assert_eq!(timeline.phase_bounds(Phase::Middle), (60.0, 120.0));
    }

    #[test]
    fn rates_have_expected_signs() {
        let timeline = Timeline::new(&config(0.1, 0.2, [60, 60, 60])).unwrap();
        let entry = timeline.entry_rate().unwrap();
        let exit = timeline.exit_rate().unwrap();
        assert!((entry - (-3.5)).abs() < 1e-9);
        assert!((exit - 63.0 / 144.0).abs() < 1e-9);
    }

    #[test]
    fn zero_approach_has_no_entry_rate() {
        let timeline = Timeline::new(&config(0.0, 0.5, [60, 60, 60])).unwrap();
        assert!(matches!(
            timeline.entry_rate(),
            Err(TimelineError::NoApproach { .. })
        ));
        assert!(timeline.exit_rate().is_ok());
    }

    #[test]
    fn zero_departure_has_no_exit_rate() {
        let timeline = Timeline::new(&config(0.5, 1.0, [60, 60, 60])).unwrap();
        assert!(matches!(
            timeline.exit_rate(),
            Err(TimelineError::NoDeparture { .. })
        ));
        assert!(timeline.entry_rate().is_ok());
    }

    #[test]
    fn empty_timeline_rejected() {
        assert_eq!(
            Timeline::new(&config(0.1, 0.2, [0, 0, 0])),
            Err(TimelineError::EmptyTimeline)
        );
    }

    #[test]
    fn overlong_timeline_rejected() {
        let too_long = Err(TimelineError::TooLong {
            limit: MAX_STORM_MINUTES,
        });
        assert_eq!(Timeline::new(&config(0.1, 0.2, [u32::MAX, 1, 60])), too_long);
        assert_eq!(
            Timeline::new(&config(0.1, 0.2, [MAX_STORM_MINUTES, 1, 0])),
            too_long
        );
        assert!(Timeline::new(&config(0.1, 0.2, [MAX_STORM_MINUTES, 0, 0])).is_ok());
    }
}
