//! Timing summary for a partitioned storm.
//!
//! Converts minute offsets into `h:mm:ss` wall-clock spans for the phases,
//! the close window and each directive. The same summary is logged at info
//! level during `generate` and printed by `plan`.

use std::fmt::Write as _;

use serde::{Serialize, Serializer};

use crate::config::schema::{EnergyRange, Phase, StormConfig};
use crate::storm::{DirectiveLabel, Partition, PartitionPattern};

// ============================================================================
// Hms
// ============================================================================

/// Whole-second offset rendered as `h:mm:ss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Hms {
    seconds: u64,
}

impl Hms {
    /// Rounds a second offset to the nearest whole second; negatives clamp to 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            seconds: seconds.round().max(0.0) as u64,
        }
    }

    /// Offset from a minute value.
    #[must_use]
    pub fn from_minutes(minutes: f64) -> Self {
        Self::from_seconds(minutes * 60.0)
    }
}

impl std::fmt::Display for Hms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / 3600;
        let minutes = (self.seconds % 3600) / 60;
        let seconds = self.seconds % 60;
        write!(f, "{hours}:{minutes:02}:{seconds:02}")
    }
}

impl Serialize for Hms {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Inclusive `[start, end]` span in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    /// First second of the span.
    pub start: Hms,
    /// Last second of the span, never before `start`.
    pub end: Hms,
}

impl Span {
    /// Span covering `[start_min, end_min)`: the end is pulled back one second.
    #[must_use]
    pub fn from_minutes(start_min: f64, end_min: f64) -> Self {
        Self::inclusive(start_min * 60.0, end_min * 60.0 - 1.0)
    }

    fn inclusive(start_s: f64, end_s: f64) -> Self {
        let start = Hms::from_seconds(start_s);
        let end = Hms::from_seconds(end_s).max(start);
        Self { start, end }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

// ============================================================================
// Summary
// ============================================================================

/// One phase row of the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseSummary {
    /// Phase name.
    pub phase: Phase,
    /// Wall-clock span of the phase.
    pub span: Span,
    /// Configured strikes.
    pub strikes: u32,
    /// Configured energy range.
    pub energy: EnergyRange,
    /// Whether the close window overlaps the phase.
    pub close: bool,
}

/// One directive row of the summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveSummary {
    /// Directive label.
    pub label: DirectiveLabel,
    /// Wall-clock span of the directive.
    pub span: Span,
    /// Duration in minutes.
    pub duration_min: f64,
    /// Distance rate in km/min.
    pub distance_rate_km_per_min: f64,
    /// Strikes placed in the directive.
    pub strike_count: u32,
    /// Energy range.
    pub energy: EnergyRange,
}

/// Human- and machine-readable description of a partition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingSummary {
    /// Total storm length.
    pub total: Hms,
    /// Distance covered on each leg, km.
    pub distance_traveled_km: f64,
    /// Per-phase spans.
    pub phases: Vec<PhaseSummary>,
    /// Span of the close window. Starts one second after the storm arrives.
    pub close_window: Span,
    /// Approach rate rounded to 0.1 km/min; `None` when the storm never approaches.
    pub entry_rate_km_per_min: Option<f64>,
    /// Departure rate rounded to 0.1 km/min; `None` when the storm never leaves.
    pub exit_rate_km_per_min: Option<f64>,
    /// Selected pattern.
    pub pattern: PartitionPattern,
    /// Pattern description.
    pub pattern_description: &'static str,
    /// Directives with their spans.
    pub directives: Vec<DirectiveSummary>,
}

impl TimingSummary {
    /// Builds the summary for a partition of `config`.
    #[must_use]
    pub fn new(config: &StormConfig, partition: &Partition) -> Self {
        let timeline = &partition.timeline;

        let phases = Phase::ALL
            .iter()
            .map(|&phase| {
                let (start, end) = timeline.phase_bounds(phase);
                let settings = config.phase(phase);
                PhaseSummary {
                    phase,
                    span: Span::from_minutes(start, end),
                    strikes: settings.strikes,
                    energy: settings.energy,
                    close: partition.classification.contains(phase),
                }
            })
            .collect();

        let mut elapsed = 0.0;
        let directives = partition
            .directives
            .iter()
            .map(|directive| {
                let start = elapsed;
                elapsed += directive.duration_min;
                DirectiveSummary {
                    label: directive.label,
                    span: Span::from_minutes(start, elapsed),
                    duration_min: directive.duration_min,
                    distance_rate_km_per_min: directive.distance_rate_km_per_min,
                    strike_count: directive.strike_count,
                    energy: directive.energy,
                }
            })
            .collect();

        Self {
            total: Hms::from_minutes(timeline.total_minutes),
            distance_traveled_km: timeline.distance_traveled_km,
            phases,
            close_window: Span::inclusive(
                timeline.close_start() * 60.0 + 1.0,
                timeline.close_end() * 60.0 - 1.0,
            ),
            entry_rate_km_per_min: timeline.entry_rate().ok().map(round_tenth),
            exit_rate_km_per_min: timeline.exit_rate().ok().map(round_tenth),
            pattern: partition.pattern,
            pattern_description: partition.pattern.description(),
            directives,
        }
    }

    /// Emits the summary as `tracing` info events.
    pub fn log(&self) {
        tracing::info!(
            total = %self.total,
            distance_km = self.distance_traveled_km,
            "storm timeline"
        );
        for phase in &self.phases {
            tracing::info!(
                phase = %phase.phase,
                start = %phase.span.start,
                end = %phase.span.end,
                strikes = phase.strikes,
                energy = %phase.energy,
                close = phase.close,
                "phase"
            );
        }
        tracing::info!(
            start = %self.close_window.start,
            end = %self.close_window.end,
            entry_rate = ?self.entry_rate_km_per_min,
            exit_rate = ?self.exit_rate_km_per_min,
            pattern = self.pattern_description,
            "close window"
        );
        for directive in &self.directives {
            tracing::debug!(
                label = %directive.label,
                start = %directive.span.start,
                end = %directive.span.end,
                rate = directive.distance_rate_km_per_min,
                strikes = directive.strike_count,
                energy = %directive.energy,
                "directive"
            );
        }
    }

    /// Renders the summary as a plain-text report.
    #[must_use]
    pub fn render_human(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "storm {} total, {} km each way",
            self.total, self.distance_traveled_km
        );
        for phase in &self.phases {
            let marker = if phase.close { "  (close)" } else { "" };
            let _ = writeln!(
                out,
                "  {:<7}{}  {} strikes  energy {}{marker}",
                phase.phase, phase.span, phase.strikes, phase.energy
            );
        }
        let _ = writeln!(out, "  close  {}", self.close_window);
        let _ = writeln!(out, "  arrives @ {} km/min", format_rate(self.entry_rate_km_per_min));
        let _ = writeln!(out, "  departs @ {} km/min", format_rate(self.exit_rate_km_per_min));
        let _ = writeln!(out, "pattern: {}", self.pattern_description);
        let _ = writeln!(out, "directives:");
        for directive in &self.directives {
            let _ = writeln!(
                out,
                "  {:<16}{}  {:>9.3} min  {:>8.3} km/min  {:>5} strikes  energy {}",
                directive.label.to_string(),
                directive.span,
                directive.duration_min,
                directive.distance_rate_km_per_min,
                directive.strike_count,
                directive.energy
            );
        }
        out
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn format_rate(rate: Option<f64>) -> String {
    rate.map_or_else(|| "n/a".to_string(), |r| format!("{r:.1}"))
}
