//! Phase partitioner.
//!
//! Turns a validated [`StormConfig`] into the chronological list of
//! [`GeneratorDirective`]s that tile the storm. Each phase yields one
//! directive, or up to three when the close window cuts through it.

use serde::{Serialize, Serializer};

use crate::config::schema::{EnergyRange, Phase, PhaseSettings, StormConfig};
use crate::error::TimelineError;
use crate::storm::classify::{Leg, PartitionPattern, PhaseClassification, PhaseTreatment};
use crate::storm::timeline::Timeline;

/// Sub-intervals shorter than this vanish at 3-decimal precision and are not
/// emitted as separate before/after pieces.
const MIN_PIECE_MINUTES: f64 = 0.0005;

// ============================================================================
// Directives
// ============================================================================

/// Position of a directive relative to the close window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    /// Whole phase outside the close window.
    Only,
    /// Part of a split phase before the close window.
    Before,
    /// Part of a split phase inside the close window.
    Close,
    /// Part of a split phase after the close window.
    After,
    /// Whole phase inside the close window.
    CloseOnly,
}

impl Segment {
    const fn suffix(self) -> &'static str {
        match self {
            Self::Only => "Only",
            Self::Before => "Before",
            Self::Close => "Close",
            Self::After => "After",
            Self::CloseOnly => "CloseOnly",
        }
    }
}

/// Directive label such as `earlyBefore` or `middleCloseOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectiveLabel {
    /// Phase the directive belongs to.
    pub phase: Phase,
    /// Position relative to the close window.
    pub segment: Segment,
}

impl std::fmt::Display for DirectiveLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.phase, self.segment.suffix())
    }
}

impl Serialize for DirectiveLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One contiguous sub-interval of the storm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorDirective {
    /// Label naming the phase and segment.
    pub label: DirectiveLabel,
    /// Change in distance per minute; negative while approaching.
    pub distance_rate_km_per_min: f64,
    /// Detections to place inside the interval.
    pub strike_count: u32,
    /// Energy range inherited from the phase.
    pub energy: EnergyRange,
    /// Interval length, 3-decimal minutes.
    pub duration_min: f64,
}

impl GeneratorDirective {
    /// Phase this directive was cut from.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.label.phase
    }
}

/// Everything the partitioner derived for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Partition {
    /// Derived minute offsets.
    pub timeline: Timeline,
    /// Phases overlapping the close window.
    pub classification: PhaseClassification,
    /// Pattern selected from the classification.
    pub pattern: PartitionPattern,
    /// Chronological directives covering `[0, total_minutes]`.
    pub directives: Vec<GeneratorDirective>,
}

// ============================================================================
// Partitioner
// ============================================================================

/// Partitions the storm described by `config`.
///
/// # Errors
///
/// Returns a [`TimelineError`] when the storm has no duration, the close
/// window classification is impossible, or a directive needs a travel rate
/// whose leg has no time.
pub fn partition(config: &StormConfig) -> Result<Partition, TimelineError> {
    let timeline = Timeline::new(config)?;
    let classification = PhaseClassification::classify(&timeline);
    let pattern = classification.pattern()?;

    tracing::debug!(
        bits = classification.bits(),
        pattern = %pattern,
        "close window classified"
    );

    let mut directives = Vec::with_capacity(7);
    for phase in Phase::ALL {
        let settings = config.phase(phase);
        match pattern.treatment(phase) {
            PhaseTreatment::Whole(leg) => {
                directives.push(whole_phase(&timeline, phase, settings, Some(leg))?);
            }
            PhaseTreatment::CloseOnly => {
                directives.push(whole_phase(&timeline, phase, settings, None)?);
            }
            PhaseTreatment::Split => {
                directives.extend(split_phase(&timeline, phase, settings)?);
            }
        }
    }

    Ok(Partition {
        timeline,
        classification,
        pattern,
        directives,
    })
}

/// Single directive spanning a phase. `leg == None` means close-only.
fn whole_phase(
    timeline: &Timeline,
    phase: Phase,
    settings: &PhaseSettings,
    leg: Option<Leg>,
) -> Result<GeneratorDirective, TimelineError> {
    let duration = f64::from(settings.duration_min);
    let (segment, rate) = match leg {
        None => (Segment::CloseOnly, 0.0),
        // a zero-length phase never moves the storm
        Some(_) if duration <= 0.0 => (Segment::Only, 0.0),
        Some(Leg::Approach) => (Segment::Only, timeline.entry_rate()?),
        Some(Leg::Departure) => (Segment::Only, timeline.exit_rate()?),
    };

    Ok(GeneratorDirective {
        label: DirectiveLabel { phase, segment },
        distance_rate_km_per_min: rate,
        strike_count: settings.strikes,
        energy: settings.energy,
        duration_min: round_minutes(duration),
    })
}

/// Cuts a phase around the close window.
///
/// The close piece is always emitted, even when the window is zero-width;
/// before and after pieces only when they have length.
fn split_phase(
    timeline: &Timeline,
    phase: Phase,
    settings: &PhaseSettings,
) -> Result<Vec<GeneratorDirective>, TimelineError> {
    let duration = f64::from(settings.duration_min);
    let (phase_start, phase_end) = timeline.phase_bounds(phase);

    let before = (timeline.close_start() - phase_start).clamp(0.0, duration);
    let close = (timeline.close_end().min(phase_end) - timeline.close_start().max(phase_start))
        .clamp(0.0, duration - before);
    let after = duration - before - close;

    let mut pieces: Vec<(Segment, f64)> = Vec::with_capacity(3);
    if before >= MIN_PIECE_MINUTES {
        pieces.push((Segment::Before, before));
    }
    pieces.push((Segment::Close, close));
    if after >= MIN_PIECE_MINUTES {
        pieces.push((Segment::After, after));
    }
    if let [(segment, _)] = pieces.as_mut_slice() {
        *segment = Segment::CloseOnly;
    }

    let durations = tile_durations(&pieces, duration);
    let counts = apportion_strikes(&durations, duration, settings.strikes);

    pieces
        .iter()
        .zip(durations)
        .zip(counts)
        .map(|((&(segment, _), duration_min), strike_count)| -> Result<_, TimelineError> {
            let rate = match segment {
                Segment::Before => timeline.entry_rate()?,
                Segment::After => timeline.exit_rate()?,
                Segment::Close | Segment::CloseOnly | Segment::Only => 0.0,
            };
            Ok(GeneratorDirective {
                label: DirectiveLabel { phase, segment },
                distance_rate_km_per_min: rate,
                strike_count,
                energy: settings.energy,
                duration_min,
            })
        })
        .collect()
}

/// Rounds piece boundaries to 3 decimals; the last piece takes whatever is
/// left of the phase so the pieces sum to `total`.
fn tile_durations(pieces: &[(Segment, f64)], total: f64) -> Vec<f64> {
    let Some((_, leading)) = pieces.split_last() else {
        return Vec::new();
    };

    let mut durations = Vec::with_capacity(pieces.len());
    let mut boundary = 0.0;
    let mut elapsed = 0.0;
    for &(_, length) in leading {
        elapsed += length;
        let next = round_minutes(elapsed.min(total));
        durations.push(round_minutes(next - boundary));
        boundary = next;
    }
    durations.push(round_minutes((total - boundary).max(0.0)));
    durations
}

/// Spreads `strikes` over pieces in proportion to their length.
///
/// Each piece but the last gets the difference of consecutive rounded
/// cumulative shares; the last gets the remainder by subtraction, so the
/// counts always sum to `strikes`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn apportion_strikes(durations: &[f64], total: f64, strikes: u32) -> Vec<u32> {
    let Some((_, leading)) = durations.split_last() else {
        return Vec::new();
    };

    let mut counts = Vec::with_capacity(durations.len());
    let mut assigned = 0u32;
    let mut elapsed = 0.0;
    for duration in leading {
        elapsed += duration;
        let share = if total > 0.0 { (elapsed / total).min(1.0) } else { 0.0 };
        let boundary = ((f64::from(strikes) * share).round() as u32).clamp(assigned, strikes);
        counts.push(boundary - assigned);
        assigned = boundary;
    }
    counts.push(strikes - assigned);
    counts
}

/// Rounds to 3 decimal places.
fn round_minutes(minutes: f64) -> f64 {
    (minutes * 1000.0).round() / 1000.0
}
