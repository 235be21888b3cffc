//! Configuration validation
//!
//! Turns the raw `[Storm]` section into a [`StormConfig`]. Every field is
//! parsed and range-checked, then cross-field rules are applied. Validation
//! collects ALL errors (doesn't stop at first) so a user can fix the whole
//! file in one pass.

use crate::config::loader::IniSection;
use crate::config::schema::{
    EnergyRange, MAX_DISTANCE_KM, MAX_PHASE_STRIKES, MAX_STORM_MINUTES, MIN_DISTANCE_KM, Phase,
    PhaseSettings, STORM_SECTION, StormConfig, parse_count, parse_duration, parse_energy_range,
    parse_percent,
};
use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Keys
// ============================================================================

/// `[Storm]` key for the closest distance.
pub const KEY_MIN_DISTANCE: &str = "storm_min_distance";
/// `[Storm]` key for the farthest distance.
pub const KEY_MAX_DISTANCE: &str = "storm_max_distance";
/// `[Storm]` key for the closest-approach start percent.
pub const KEY_CLOSEST_FROM: &str = "storm_closest_from";
/// `[Storm]` key for the closest-approach end percent.
pub const KEY_CLOSEST_TO: &str = "storm_closest_to";

/// Per-phase key names, indexed like [`Phase::ALL`].
static PHASE_KEYS: [PhaseKeys; 3] = [
    PhaseKeys {
        duration: "storm_early_duration",
        strikes: "storm_early_strikes",
        energy: "storm_early_energy",
    },
    PhaseKeys {
        duration: "storm_middle_duration",
        strikes: "storm_middle_strikes",
        energy: "storm_middle_energy",
    },
    PhaseKeys {
        duration: "storm_late_duration",
        strikes: "storm_late_strikes",
        energy: "storm_late_energy",
    },
];

struct PhaseKeys {
    duration: &'static str,
    strikes: &'static str,
    energy: &'static str,
}

/// Every key the `[Storm]` section understands.
#[must_use]
pub fn known_keys() -> Vec<&'static str> {
    let mut keys = vec![
        KEY_MIN_DISTANCE,
        KEY_MAX_DISTANCE,
        KEY_CLOSEST_FROM,
        KEY_CLOSEST_TO,
    ];
    for phase in &PHASE_KEYS {
        keys.extend([phase.duration, phase.strikes, phase.energy]);
    }
    keys
}

/// Suggest a known key for a misspelled one.
///
/// Returns the closest match if its Damerau-Levenshtein distance is <= 3.
#[must_use]
pub fn suggest_key(input: &str) -> Option<&'static str> {
    known_keys()
        .into_iter()
        .map(|k| (k, strsim::damerau_levenshtein(input, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(k, _)| k)
}

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,

    /// The typed configuration, present only when there are no errors.
    pub config: Option<StormConfig>,
}

impl ValidationResult {
    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the `[Storm]` section and returns the result.
    ///
    /// This method collects all errors and warnings rather than stopping
    /// at the first issue.
    pub fn validate(&mut self, section: &IniSection) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.check_unknown_keys(section);

        let min_distance = self.distance(section, KEY_MIN_DISTANCE, MIN_DISTANCE_KM);
        let max_distance = self.distance(section, KEY_MAX_DISTANCE, MAX_DISTANCE_KM);
        let closest_from = self.required(section, KEY_CLOSEST_FROM, parse_percent);
        let closest_to = self.required(section, KEY_CLOSEST_TO, parse_percent);

        let phases: Vec<Option<PhaseSettings>> = Phase::ALL
            .iter()
            .map(|&phase| self.phase_settings(section, phase_keys(phase)))
            .collect();

        if let (Some(min), Some(max)) = (min_distance, max_distance) {
            if min > max {
                self.add_error(
                    KEY_MIN_DISTANCE,
                    &format!("storm_min_distance {min} is greater than storm_max_distance {max}"),
                );
            }
        }

        if let [Some(early), Some(middle), Some(late)] = phases.as_slice() {
            let total = [early, middle, late]
                .iter()
                .map(|p| u64::from(p.duration_min))
                .sum::<u64>();
            if total > u64::from(MAX_STORM_MINUTES) {
                self.add_error(
                    PHASE_KEYS[0].duration,
                    &format!(
                        "storm durations add up to {total} minutes, \
                         must be at most {MAX_STORM_MINUTES}"
                    ),
                );
            }
        }

        if let (Some(from), Some(to)) = (closest_from, closest_to) {
            if from > to {
                self.add_error(
                    KEY_CLOSEST_FROM,
                    &format!(
                        "storm_closest_from {}% is after storm_closest_to {}%",
                        from * 100.0,
                        to * 100.0
                    ),
                );
            }
        }

        let config = match (
            min_distance,
            max_distance,
            closest_from,
            closest_to,
            phases.as_slice(),
        ) {
            (Some(min), Some(max), Some(from), Some(to), [Some(early), Some(middle), Some(late)])
                if self.errors.is_empty() =>
            {
                Some(StormConfig {
                    min_distance_km: min,
                    max_distance_km: max,
                    closest_from: from,
                    closest_to: to,
                    early: *early,
                    middle: *middle,
                    late: *late,
                })
            }
            _ => None,
        };

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
            config,
        }
    }

    // ========================================================================
    // Field Validation
    // ========================================================================

    /// Warns about keys that nothing reads.
    fn check_unknown_keys(&mut self, section: &IniSection) {
        let known = known_keys();
        for entry in &section.entries {
            if known.iter().any(|k| *k == entry.key) {
                continue;
            }
            let message = suggest_key(&entry.key).map_or_else(
                || format!("Unknown key '{}' (line {}) is ignored", entry.key, entry.line),
                |s| {
                    format!(
                        "Unknown key '{}' (line {}) is ignored, did you mean '{s}'?",
                        entry.key, entry.line
                    )
                },
            );
            self.add_warning(&entry.key, &message);
        }
    }

    /// Validates a distance, falling back to `default` when the key is absent.
    fn distance(&mut self, section: &IniSection, key: &str, default: u8) -> Option<u8> {
        let Some(entry) = section.get(key) else {
            return Some(default);
        };
        match entry.value.trim().parse::<i64>() {
            Ok(v) if (i64::from(MIN_DISTANCE_KM)..=i64::from(MAX_DISTANCE_KM)).contains(&v) => {
                u8::try_from(v).ok()
            }
            _ => {
                self.add_error(
                    key,
                    &format!(
                        "Invalid \"{key}\" [{}], must be [{MIN_DISTANCE_KM}-{MAX_DISTANCE_KM}]",
                        entry.value
                    ),
                );
                None
            }
        }
    }

    /// Validates a required key with the given parser.
    fn required<T>(
        &mut self,
        section: &IniSection,
        key: &str,
        parse: impl Fn(&str) -> Result<T, String>,
    ) -> Option<T> {
        let Some(entry) = section.get(key) else {
            self.add_error(key, &format!("Missing required key \"{key}\""));
            return None;
        };
        match parse(&entry.value) {
            Ok(value) => Some(value),
            Err(reason) => {
                self.add_error(
                    key,
                    &format!("Invalid \"{key}\" (line {}): {reason}", entry.line),
                );
                None
            }
        }
    }

    /// Validates the three keys of one phase.
    fn phase_settings(&mut self, section: &IniSection, keys: &PhaseKeys) -> Option<PhaseSettings> {
        let duration_min = self.required(section, keys.duration, |text| {
            at_most(parse_duration(text)?, MAX_STORM_MINUTES, "minutes")
        });
        let strikes = self.required(section, keys.strikes, |text| {
            at_most(parse_count(text)?, MAX_PHASE_STRIKES, "strikes")
        });
        let energy: Option<EnergyRange> = self.required(section, keys.energy, parse_energy_range);

        Some(PhaseSettings {
            duration_min: duration_min?,
            strikes: strikes?,
            energy: energy?,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, key: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: format!("{STORM_SECTION}.{key}"),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, key: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: format!("{STORM_SECTION}.{key}"),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

/// Upper bound check shared by durations and strike counts.
fn at_most(value: u32, limit: u32, unit: &str) -> Result<u32, String> {
    if value > limit {
        Err(format!("{value} {unit} is more than the limit of {limit}"))
    } else {
        Ok(value)
    }
}

/// Key names for one phase.
fn phase_keys(phase: Phase) -> &'static PhaseKeys {
    match phase {
        Phase::Early => &PHASE_KEYS[0],
        Phase::Middle => &PHASE_KEYS[1],
        Phase::Late => &PHASE_KEYS[2],
    }
}

// ============================================================================
// Tests
// ============================================================================
