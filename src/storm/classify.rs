//! Close-window classification and partition pattern selection.
//!
//! Which phases overlap the close window is a 3-bit value. Every one of the
//! eight bit patterns is mapped through [`PATTERN_TABLE`]; the two that
//! cannot describe a contiguous window are errors in the table itself.

use serde::Serialize;

use crate::config::schema::Phase;
use crate::error::TimelineError;
use crate::storm::timeline::Timeline;

// ============================================================================
// Classification
// ============================================================================

/// Which phases overlap the close window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseClassification {
    /// Close window overlaps the early phase.
    pub close_during_early: bool,
    /// Close window overlaps the middle phase.
    pub close_during_middle: bool,
    /// Close window overlaps the late phase.
    pub close_during_late: bool,
}

impl PhaseClassification {
    const EARLY_BIT: u8 = 0b001;
    const MIDDLE_BIT: u8 = 0b010;
    const LATE_BIT: u8 = 0b100;

    /// Classifies a timeline.
    ///
    /// The phase holding the start of the window is decided from
    /// `minutes_before_closest`; the phase holding its end from the rounded
    /// `close_minutes`. A window that starts in early and ends in late also
    /// covers middle.
    #[must_use]
    pub fn classify(timeline: &Timeline) -> Self {
        let mut classification = Self::default();
        let before = timeline.minutes_before_closest;
        let close = timeline.close_minutes;

        if before > timeline.early_end {
            if before > timeline.middle_end {
                classification.close_during_late = true;
            } else {
                classification.close_during_middle = true;
            }
        } else {
            classification.close_during_early = true;
        }

        if close < timeline.early_end {
            // leaves close during early
        } else if close > timeline.middle_end {
            if classification.close_during_early {
                classification.close_during_middle = true;
            }
            classification.close_during_late = true;
        } else {
            classification.close_during_middle = true;
        }

        classification
    }

    /// Packs the flags as `late | middle | early` bits.
    #[must_use]
    pub const fn bits(self) -> u8 {
        let mut bits = 0;
        if self.close_during_early {
            bits |= Self::EARLY_BIT;
        }
        if self.close_during_middle {
            bits |= Self::MIDDLE_BIT;
        }
        if self.close_during_late {
            bits |= Self::LATE_BIT;
        }
        bits
    }

    /// Unpacks `late | middle | early` bits; higher bits are ignored.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            close_during_early: bits & Self::EARLY_BIT != 0,
            close_during_middle: bits & Self::MIDDLE_BIT != 0,
            close_during_late: bits & Self::LATE_BIT != 0,
        }
    }

    /// Whether the window overlaps the given phase.
    #[must_use]
    pub const fn contains(self, phase: Phase) -> bool {
        match phase {
            Phase::Early => self.close_during_early,
            Phase::Middle => self.close_during_middle,
            Phase::Late => self.close_during_late,
        }
    }

    /// Selects the partition pattern for this classification.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::NoCloseWindow`] when no phase is marked and
    /// [`TimelineError::NonAdjacentClose`] for early and late without middle.
    pub const fn pattern(self) -> Result<PartitionPattern, TimelineError> {
        PATTERN_TABLE[self.bits() as usize]
    }
}

// ============================================================================
// Patterns
// ============================================================================

/// How the close window sits across the three phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionPattern {
    /// Window contained in early.
    EarlyOnly,
    /// Window contained in middle.
    MiddleOnly,
    /// Window contained in late.
    LateOnly,
    /// Window spans early and middle.
    EarlyMiddle,
    /// Window spans middle and late.
    MiddleLate,
    /// Window spans all three phases.
    AllThree,
}

/// Rate a whole-phase directive travels at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Storm approaching: entry rate.
    Approach,
    /// Storm receding: exit rate.
    Departure,
}

/// How a phase is turned into directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTreatment {
    /// One directive for the whole phase, moving along the given leg.
    Whole(Leg),
    /// Split into before / close / after pieces around the close window.
    Split,
    /// One directive for the whole phase at rate 0.
    CloseOnly,
}

/// Pattern for every `late | middle | early` bit combination.
pub const PATTERN_TABLE: [Result<PartitionPattern, TimelineError>; 8] = [
    Err(TimelineError::NoCloseWindow),      // ---
    Ok(PartitionPattern::EarlyOnly),        // --E
    Ok(PartitionPattern::MiddleOnly),       // -M-
    Ok(PartitionPattern::EarlyMiddle),      // -ME
    Ok(PartitionPattern::LateOnly),         // L--
    Err(TimelineError::NonAdjacentClose),   // L-E
    Ok(PartitionPattern::MiddleLate),       // LM-
    Ok(PartitionPattern::AllThree),         // LME
];

impl PartitionPattern {
    /// Treatment of each phase under this pattern.
    #[must_use]
    pub const fn treatment(self, phase: Phase) -> PhaseTreatment {
        use Leg::{Approach, Departure};
        use PhaseTreatment::{CloseOnly, Split, Whole};

        match (self, phase) {
            (Self::EarlyOnly, Phase::Early)
            | (Self::MiddleOnly, Phase::Middle)
            | (Self::LateOnly, Phase::Late)
            | (Self::EarlyMiddle, Phase::Early | Phase::Middle)
            | (Self::MiddleLate, Phase::Middle | Phase::Late)
            | (Self::AllThree, Phase::Early | Phase::Late) => Split,

            (Self::AllThree, Phase::Middle) => CloseOnly,

            (Self::MiddleOnly | Self::LateOnly | Self::MiddleLate, Phase::Early)
            | (Self::LateOnly, Phase::Middle) => Whole(Approach),

            (Self::EarlyOnly, Phase::Middle)
            | (Self::EarlyOnly | Self::MiddleOnly | Self::EarlyMiddle, Phase::Late) => {
                Whole(Departure)
            }
        }
    }

    /// Human-readable description used in timing summaries.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::EarlyOnly => "early split, middle/late normal",
            Self::MiddleOnly => "middle split, early/late normal",
            Self::LateOnly => "late split, early/middle normal",
            Self::EarlyMiddle => "early/middle split, late normal",
            Self::MiddleLate => "middle/late split, early normal",
            Self::AllThree => "early/late split, middle close-only",
        }
    }
}

impl std::fmt::Display for PartitionPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}
