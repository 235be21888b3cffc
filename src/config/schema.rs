//! Storm configuration schema
//!
//! Typed form of the `[Storm]` section. Values here have already passed
//! validation; the raw string forms live in [`super::loader::IniSection`].

use serde::Serialize;

/// Smallest distance the detector can report, in km.
pub const MIN_DISTANCE_KM: u8 = 0;

/// Largest distance the detector can report, in km.
pub const MAX_DISTANCE_KM: u8 = 63;

/// Name of the INI section holding storm settings.
pub const STORM_SECTION: &str = "Storm";

/// Default configuration file name looked up in the config directory.
pub const CONFIG_FILE_NAME: &str = "storm_config.ini";

/// Longest storm accepted, in minutes (one week).
pub const MAX_STORM_MINUTES: u32 = 7 * 24 * 60;

/// Most detections a single phase may request.
pub const MAX_PHASE_STRIKES: u32 = 1_000_000;

// ============================================================================
// Phase
// ============================================================================

/// One of the three chronological storm segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// First segment of the storm.
    Early,
    /// Second segment of the storm.
    Middle,
    /// Final segment of the storm.
    Late,
}

impl Phase {
    /// All phases in chronological order.
    pub const ALL: [Self; 3] = [Self::Early, Self::Middle, Self::Late];

    /// Lower-case name used in labels and configuration keys.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::Middle => "middle",
            Self::Late => "late",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Energy Range
// ============================================================================

/// Inclusive strike energy range (`low <= high`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnergyRange {
    /// Lowest energy value.
    pub low: u32,
    /// Highest energy value.
    pub high: u32,
}

impl EnergyRange {
    /// Creates a range, returning `None` when `low > high`.
    #[must_use]
    pub const fn new(low: u32, high: u32) -> Option<Self> {
        if low <= high {
            Some(Self { low, high })
        } else {
            None
        }
    }
}

impl std::fmt::Display for EnergyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

// ============================================================================
// Storm Config
// ============================================================================

/// Settings for a single phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseSettings {
    /// Phase length in whole minutes.
    pub duration_min: u32,
    /// Number of detections to generate inside the phase.
    pub strikes: u32,
    /// Energy range of those detections.
    pub energy: EnergyRange,
}

/// Validated, immutable storm configuration.
///
/// Built once by [`super::Validator`] and passed by reference to the
/// partitioner. Closest-approach bounds are fractions of the total storm
/// duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormConfig {
    /// Distance at closest approach, km.
    pub min_distance_km: u8,
    /// Distance at the start and end of the storm, km.
    pub max_distance_km: u8,
    /// Fraction of the storm elapsed when it becomes closest.
    pub closest_from: f64,
    /// Fraction of the storm elapsed when it stops being closest.
    pub closest_to: f64,
    /// Early phase settings.
    pub early: PhaseSettings,
    /// Middle phase settings.
    pub middle: PhaseSettings,
    /// Late phase settings.
    pub late: PhaseSettings,
}

impl StormConfig {
    /// Settings for the given phase.
    #[must_use]
    pub const fn phase(&self, phase: Phase) -> &PhaseSettings {
        match phase {
            Phase::Early => &self.early,
            Phase::Middle => &self.middle,
            Phase::Late => &self.late,
        }
    }

    /// Distance the storm covers on each leg (arrive, then leave), km.
    #[must_use]
    pub fn distance_traveled_km(&self) -> f64 {
        f64::from(self.max_distance_km) - f64::from(self.min_distance_km)
    }

    /// Total storm length in minutes, or `None` if the sum overflows `u32`.
    #[must_use]
    pub fn total_minutes(&self) -> Option<u32> {
        self.early
            .duration_min
            .checked_add(self.middle.duration_min)?
            .checked_add(self.late.duration_min)
    }
}

// ============================================================================
// Value Parsers
// ============================================================================

/// Parses a percent value (`"0"`..`"100"`, decimals allowed) into a fraction.
///
/// # Errors
///
/// Returns a description of the problem if the value is not a number or
/// lies outside 0-100.
pub fn parse_percent(text: &str) -> Result<f64, String> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| format!("'{text}' is not a number"))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{value} is outside 0-100"));
    }
    Ok(value / 100.0)
}

/// Parses a duration, either `hh:mm` or bare minutes.
///
/// # Errors
///
/// Returns a description of the problem for anything other than one or two
/// non-negative integer parts, or a minutes part above 59 in `hh:mm` form.
pub fn parse_duration(text: &str) -> Result<u32, String> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    match parts.as_slice() {
        [minutes] => parse_count(minutes),
        [hours, minutes] => {
            let hours = parse_count(hours)?;
            let minutes = parse_count(minutes)?;
            if minutes > 59 {
                return Err(format!("minutes part {minutes} must be 0-59"));
            }
            hours
                .checked_mul(60)
                .and_then(|m| m.checked_add(minutes))
                .ok_or_else(|| format!("'{text}' is too long"))
        }
        _ => Err(format!("'{text}' is not hh:mm or minutes")),
    }
}

/// Parses a `"low-high"` energy range.
///
/// # Errors
///
/// Returns a description of the problem if the text does not have exactly
/// two integer parts or `low > high`.
pub fn parse_energy_range(text: &str) -> Result<EnergyRange, String> {
    let parts: Vec<&str> = text.trim().split('-').collect();
    let [low, high] = parts.as_slice() else {
        return Err(format!("'{text}' is not low-high"));
    };
    let low = parse_count(low)?;
    let high = parse_count(high)?;
    EnergyRange::new(low, high).ok_or_else(|| format!("low {low} is greater than high {high}"))
}

/// Parses a non-negative integer.
///
/// # Errors
///
/// Returns a description of the problem if the value is not an unsigned
/// 32-bit integer.
pub fn parse_count(text: &str) -> Result<u32, String> {
    let text = text.trim();
    text.parse()
        .map_err(|_| format!("'{text}' is not a non-negative integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_maps_to_fraction() {
        assert!((parse_percent("10").unwrap() - 0.1).abs() < f64::EPSILON);
        assert!((parse_percent("100").unwrap() - 1.0).abs() < f64::EPSILON);
        assert!(parse_percent("0").unwrap().abs() < f64::EPSILON);
        assert!((parse_percent(" 12.5 ").unwrap() - 0.125).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_rejects_out_of_range() {
        assert!(parse_percent("101").is_err());
        assert!(parse_percent("-1").is_err());
        assert!(parse_percent("ten").is_err());
        assert!(parse_percent("").is_err());
    }

    #[test]
    fn duration_accepts_hh_mm_and_minutes() {
        assert_eq!(parse_duration("1:30"), Ok(90));
        assert_eq!(parse_duration("0:05"), Ok(5));
        assert_eq!(parse_duration("45"), Ok(45));
        assert_eq!(parse_duration("0"), Ok(0));
    }

    #[test]
    fn duration_rejects_malformed() {
        assert!(parse_duration("1:2:3").is_err());
        assert!(parse_duration("1:75").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn energy_range_parses_low_high() {
        assert_eq!(
            parse_energy_range("1-10"),
            Ok(EnergyRange { low: 1, high: 10 })
        );
        assert_eq!(parse_energy_range("7-7"), Ok(EnergyRange { low: 7, high: 7 }));
    }

    #[test]
    fn energy_range_rejects_malformed() {
        assert!(parse_energy_range("10").is_err());
        assert!(parse_energy_range("10-1").is_err());
        assert!(parse_energy_range("1-2-3").is_err());
        assert!(parse_energy_range("a-b").is_err());
    }

    #[test]
    fn phase_labels() {
        assert_eq!(Phase::Early.to_string(), "early");
        assert_eq!(Phase::Middle.as_str(), "middle");
        assert_eq!(Phase::ALL[2], Phase::Late);
    }

    #[test]
    fn total_minutes_checks_overflow() {
        let phase = |duration_min| PhaseSettings {
            duration_min,
            strikes: 1,
            energy: EnergyRange { low: 1, high: 1 },
        };
        let mut config = StormConfig {
            min_distance_km: 0,
            max_distance_km: 63,
            closest_from: 0.1,
            closest_to: 0.2,
            early: phase(60),
            middle: phase(45),
            late: phase(15),
        };
        assert_eq!(config.total_minutes(), Some(120));

        config.early.duration_min = u32::MAX;
        config.middle.duration_min = 1;
        assert_eq!(config.total_minutes(), None);
    }

    #[test]
    fn energy_range_display() {
        assert_eq!(EnergyRange { low: 5, high: 20 }.to_string(), "5-20");
    }
}
