//! Configuration loader
//!
//! This module implements the configuration loading pipeline:
//! 1. File size check
//! 2. Environment variable expansion (pre-parse, on raw text)
//! 3. INI parsing
//! 4. Validation of the `[Storm]` section into a [`StormConfig`]

use crate::config::schema::{CONFIG_FILE_NAME, STORM_SECTION, StormConfig};
use crate::config::validation::Validator;
use crate::error::ConfigError;

use std::path::{Path, PathBuf};

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone, Default)]
pub struct LoaderOptions {
    /// Limits for configuration size.
    pub config_limits: ConfigLimits,
}

/// Limits for configuration size to prevent resource exhaustion.
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_config_size: env_or("STORMGEN_MAX_CONFIG_SIZE", 64 * 1024),
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: StormConfig,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

/// Configuration loader.
///
/// Handles the full loading pipeline from `storm_config.ini` to a validated
/// [`StormConfig`].
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads `storm_config.ini` from the given directory.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::load`].
    pub fn load_dir(&self, dir: &Path) -> Result<LoadResult, ConfigError> {
        self.load(&config_path(dir))
    }

    /// Loads a configuration file and returns the validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or exceeds the size limit
    /// - An environment variable marked required is unset
    /// - INI parsing fails or the `[Storm]` section is missing
    /// - Any field fails validation (all failures are reported together)
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size =
            usize::try_from(metadata.len()).unwrap_or(self.options.config_limits.max_config_size);
        if file_size > self.options.config_limits.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!(
                    "at most {} bytes",
                    self.options.config_limits.max_config_size
                ),
            });
        }

        let raw_content = std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: None,
            message: e.to_string(),
        })?;

        Self::load_str(&raw_content, path)
    }

    /// Runs the pipeline on already-read text. `path` is used for messages.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::load`], minus the file access failures.
    pub fn load_str(raw_content: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let mut warnings = Vec::new();

        // Handle UTF-8 BOM
        let raw_content = raw_content.strip_prefix('\u{feff}').unwrap_or(raw_content);

        let mut env_sub = EnvSubstitution::new();
        let substituted = env_sub.substitute(raw_content, path)?;
        warnings.extend(env_sub.warnings);

        let document = IniDocument::parse(&substituted, path)?;
        let section = document
            .section(STORM_SECTION)
            .ok_or_else(|| ConfigError::MissingSection {
                section: STORM_SECTION.to_string(),
                path: path.to_path_buf(),
            })?;

        let mut validator = Validator::new();
        let validation_result = validator.validate(section);
        let is_valid = validation_result.is_valid();

        for issue in validation_result.warnings {
            warnings.push(LoadWarning {
                message: issue.message,
                location: Some(issue.path),
            });
        }

        match validation_result.config {
            Some(config) if is_valid => {
                Ok(LoadResult { config, warnings })
            }
            _ => Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: validation_result.errors,
            }),
        }
    }
}

// ============================================================================
// INI Document
// ============================================================================

/// A single `key = value` line inside a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    /// Key exactly as written (keys are case-sensitive).
    pub key: String,
    /// Value with surrounding whitespace and inline comment removed.
    pub value: String,
    /// 1-based line number of the key.
    pub line: usize,
}

/// Entries of one `[Section]`, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniSection {
    /// Section name without brackets.
    pub name: String,
    /// Entries in file order.
    pub entries: Vec<IniEntry>,
}

impl IniSection {
    /// Looks up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&IniEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Parsed INI file.
///
/// Follows the conventions of the detector tooling's config files: `=` is
/// the only delimiter, lines starting with `#` or `;` are comments, ` #`
/// starts an inline comment, and indented lines continue the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<IniSection>,
}

impl IniDocument {
    /// Parses INI text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] for keys outside any section,
    /// lines without `=`, unterminated section headers, and duplicate
    /// sections or keys.
    pub fn parse(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let parse_error = |line: usize, message: String| ConfigError::ParseError {
            path: path.to_path_buf(),
            line: Some(line),
            message: format!("line {line}: {message}"),
        };

        let mut sections: Vec<IniSection> = Vec::new();

        for (idx, raw_line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw_line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Continuation of the previous value
            if raw_line.starts_with([' ', '\t']) {
                if let Some(entry) = sections.last_mut().and_then(|s| s.entries.last_mut()) {
                    entry.value.push('\n');
                    entry.value.push_str(strip_inline_comment(trimmed));
                    continue;
                }
            }

            if let Some(header) = trimmed.strip_prefix('[') {
                let name = header
                    .strip_suffix(']')
                    .ok_or_else(|| {
                        parse_error(line_no, format!("unterminated section header '{trimmed}'"))
                    })?
                    .trim();
                if sections.iter().any(|s| s.name == name) {
                    return Err(parse_error(line_no, format!("duplicate section [{name}]")));
                }
                sections.push(IniSection {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(parse_error(line_no, format!("expected key = value, got '{trimmed}'")));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(parse_error(line_no, "empty key".to_string()));
            }

            let Some(section) = sections.last_mut() else {
                return Err(parse_error(
                    line_no,
                    format!("key '{key}' appears before any [section] header"),
                ));
            };
            if section.get(key).is_some() {
                return Err(parse_error(
                    line_no,
                    format!("duplicate key '{key}' in [{}]", section.name),
                ));
            }

            section.entries.push(IniEntry {
                key: key.to_string(),
                value: strip_inline_comment(value.trim()).to_string(),
                line: line_no,
            });
        }

        Ok(Self { sections })
    }

    /// Looks up a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Removes a trailing ` # comment` from a value.
fn strip_inline_comment(value: &str) -> &str {
    value
        .char_indices()
        .find(|&(i, c)| c == '#' && (i == 0 || value[..i].ends_with(char::is_whitespace)))
        .map_or(value, |(i, _)| value[..i].trim_end())
}

// ============================================================================
// Environment Variable Substitution
// ============================================================================

/// What to do when a referenced variable is unset.
#[derive(Debug, PartialEq, Eq)]
enum Fallback {
    /// `${VAR}`: empty string plus a warning.
    Warn,
    /// `${VAR:-default}`.
    Default(String),
    /// `${VAR:?message}`: abort loading.
    Fail(String),
}

/// One `${...}` reference.
#[derive(Debug, PartialEq, Eq)]
struct VarRef {
    name: String,
    fallback: Fallback,
}

impl VarRef {
    /// Parses the text between `${` and the matching `}`.
    fn parse(body: &str) -> Self {
        let (name, fallback) = match body.split_once(':') {
            Some((name, rest)) => match rest.split_at_checked(1) {
                Some(("-", default)) => (name, Fallback::Default(default.to_string())),
                Some(("?", message)) => (name, Fallback::Fail(message.to_string())),
                _ => (body, Fallback::Warn),
            },
            None => (body, Fallback::Warn),
        };
        Self {
            name: name.to_string(),
            fallback,
        }
    }
}

/// Pre-parse environment variable substitution.
///
/// Runs on raw INI text before parsing, so a variable may supply any part of
/// a line. Supports:
/// - `${VAR}` - expand to value (empty string if unset with warning)
/// - `${VAR:-default}` - expand to default if unset
/// - `${VAR:?message}` - fail if unset
/// - `$$` - literal `$`
struct EnvSubstitution {
    warnings: Vec<LoadWarning>,
}

impl EnvSubstitution {
    const fn new() -> Self {
        Self {
            warnings: Vec::new(),
        }
    }

    /// Substitutes environment variables in raw text, line by line.
    fn substitute(&mut self, raw: &str, source_path: &Path) -> Result<String, ConfigError> {
        let mut result = String::with_capacity(raw.len());
        for (idx, line) in raw.split_inclusive('\n').enumerate() {
            self.substitute_line(line, idx + 1, source_path, &mut result)?;
        }
        Ok(result)
    }

    fn substitute_line(
        &mut self,
        line: &str,
        line_no: usize,
        source_path: &Path,
        out: &mut String,
    ) -> Result<(), ConfigError> {
        let mut rest = line;
        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            if let Some(tail) = after.strip_prefix('$') {
                out.push('$');
                rest = tail;
                continue;
            }
            let Some(body) = after.strip_prefix('{') else {
                out.push('$');
                rest = after;
                continue;
            };
            let Some(close) = closing_brace(body) else {
                return Err(ConfigError::ParseError {
                    path: source_path.to_path_buf(),
                    line: Some(line_no),
                    message: format!("line {line_no}: unclosed environment variable reference"),
                });
            };

            let reference = VarRef::parse(&body[..close]);
            out.push_str(&self.resolve(reference, source_path, line_no)?);
            rest = &body[close + 1..];
        }
        out.push_str(rest);
        Ok(())
    }

    fn resolve(
        &mut self,
        reference: VarRef,
        source_path: &Path,
        line_no: usize,
    ) -> Result<String, ConfigError> {
        if let Ok(value) = std::env::var(&reference.name) {
            return Ok(value);
        }
        match reference.fallback {
            Fallback::Default(default) => Ok(default),
            Fallback::Fail(message) => Err(ConfigError::EnvVarNotSet {
                var: reference.name,
                location: message,
            }),
            Fallback::Warn => {
                self.warnings.push(LoadWarning {
                    message: format!(
                        "Environment variable '{}' is not set, using empty string",
                        reference.name
                    ),
                    location: Some(format!("{}:{line_no}", source_path.display())),
                });
                Ok(String::new())
            }
        }
    }
}

/// Byte offset of the `}` closing a reference body, honouring nested braces.
fn closing_brace(body: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parses an environment variable with a default value.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Resolves the config file path for a config directory.
#[must_use]
pub fn config_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# storm settings
[Storm]
storm_min_distance = 0
storm_max_distance = 63
storm_closest_from = 10   # percent
storm_closest_to = 20
storm_early_duration = 1:00
storm_middle_duration = 60
storm_late_duration = 1:00
storm_early_strikes = 5
storm_middle_strikes = 5
storm_late_strikes = 5
storm_early_energy = 1-10
storm_middle_energy = 5-20
storm_late_energy = 1-5
";

    fn sample_path() -> &'static Path {
        Path::new("storm_config.ini")
    }

    #[test]
    fn test_env_substitution_simple() {
        // Use PATH which is always set on Unix/Windows
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("path = ${PATH}", sample_path()).unwrap();
        assert!(!result.contains("${PATH}"));
        assert!(result.starts_with("path = "));
        assert!(result.len() > "path = ".len());
    }

    #[test]
    fn test_env_substitution_default() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute(
                "storm_early_strikes = ${STORMGEN_TEST_NONEXISTENT_VAR_XYZ123:-12}",
                sample_path(),
            )
            .unwrap();
        assert_eq!(result, "storm_early_strikes = 12");
    }

    #[test]
    fn test_env_substitution_required_missing() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute(
            "value = ${STORMGEN_TEST_REQUIRED_XYZ123:?must be set}",
            sample_path(),
        );
        match result {
            Err(ConfigError::EnvVarNotSet { var, location }) => {
                assert_eq!(var, "STORMGEN_TEST_REQUIRED_XYZ123");
                assert_eq!(location, "must be set");
            }
            other => panic!("Expected EnvVarNotSet error, got {other:?}"),
        }
    }

    #[test]
    fn test_env_substitution_escaped_dollar() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("price = $$100", sample_path()).unwrap();
        assert_eq!(result, "price = $100");
    }

    #[test]
    fn test_env_substitution_missing_warning() {
        let mut sub = EnvSubstitution::new();
        let result = sub
            .substitute("value = ${STORMGEN_TEST_WARN_XYZ123}", sample_path())
            .unwrap();
        assert_eq!(result, "value = ");
        assert_eq!(sub.warnings.len(), 1);
        assert!(sub.warnings[0].message.contains("STORMGEN_TEST_WARN_XYZ123"));
    }

    #[test]
    fn test_env_substitution_unclosed() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("[Storm]\nvalue = ${OOPS\n", sample_path());
        assert!(matches!(result, Err(ConfigError::ParseError { line: Some(2), .. })));
    }

    #[test]
    fn test_env_substitution_keeps_lone_dollar() {
        let mut sub = EnvSubstitution::new();
        let result = sub.substitute("a = $5\nb = 1\n", sample_path()).unwrap();
        assert_eq!(result, "a = $5\nb = 1\n");
    }

    #[test]
    fn test_var_ref_forms() {
        assert_eq!(
            VarRef::parse("A:-x:y"),
            VarRef {
                name: "A".to_string(),
                fallback: Fallback::Default("x:y".to_string()),
            }
        );
        assert_eq!(VarRef::parse("B").fallback, Fallback::Warn);
        assert_eq!(
            VarRef::parse("C:?set C").fallback,
            Fallback::Fail("set C".to_string())
        );
        assert_eq!(closing_brace("A:-{x}}rest"), Some(6));
    }

    #[test]
    fn test_ini_parse_sections_and_comments() {
        let doc = IniDocument::parse(SAMPLE, sample_path()).unwrap();
        let storm = doc.section("Storm").unwrap();
        assert_eq!(storm.entries.len(), 13);
        assert_eq!(storm.get("storm_closest_from").unwrap().value, "10");
        assert_eq!(storm.get("storm_early_duration").unwrap().line, 7);
        assert!(doc.section("storm").is_none());
    }

    #[test]
    fn test_ini_inline_hash_without_space_is_kept() {
        let doc = IniDocument::parse("[Storm]\nname = a#b\n", sample_path()).unwrap();
        assert_eq!(doc.section("Storm").unwrap().get("name").unwrap().value, "a#b");
    }

    #[test]
    fn test_ini_continuation_line() {
        let doc = IniDocument::parse("[Storm]\nnote = first\n  second\n", sample_path()).unwrap();
        assert_eq!(
            doc.section("Storm").unwrap().get("note").unwrap().value,
            "first\nsecond"
        );
    }

    #[test]
    fn test_ini_key_before_section_rejected() {
        let err =
            IniDocument::parse("storm_min_distance = 3\n[Storm]\n", sample_path()).unwrap_err();
        match err {
            ConfigError::ParseError { line, message, .. } => {
                assert_eq!(line, Some(1));
                assert!(message.contains("before any [section]"));
            }
            other => panic!("Expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_ini_duplicate_key_rejected() {
        let result = IniDocument::parse("[Storm]\na = 1\na = 2\n", sample_path());
        assert!(matches!(result, Err(ConfigError::ParseError { line: Some(3), .. })));
    }

    #[test]
    fn test_ini_missing_delimiter_rejected() {
        let result = IniDocument::parse("[Storm]\njust words\n", sample_path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_load_str_valid() {
        let result = ConfigLoader::load_str(SAMPLE, sample_path()).unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.config.total_minutes(), Some(180));
        assert_eq!(result.config.early.strikes, 5);
    }

    #[test]
    fn test_load_str_strips_bom() {
        let with_bom = format!("\u{feff}{SAMPLE}");
        assert!(ConfigLoader::load_str(&with_bom, sample_path()).is_ok());
    }

    #[test]
    fn test_load_str_missing_section() {
        let result = ConfigLoader::load_str("[Other]\na = 1\n", sample_path());
        assert!(matches!(result, Err(ConfigError::MissingSection { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let loader = ConfigLoader::with_defaults();
        let result = loader.load(Path::new("/nonexistent/stormgen/storm_config.ini"));
        assert!(matches!(result, Err(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_load_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_path(dir.path());
        std::fs::write(&path, SAMPLE).unwrap();

        let loader = ConfigLoader::new(LoaderOptions {
            config_limits: ConfigLimits { max_config_size: 16 },
        });
        let result = loader.load(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_dir_reads_default_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(config_path(dir.path()), SAMPLE).unwrap();
        let result = ConfigLoader::with_defaults().load_dir(dir.path()).unwrap();
        assert_eq!(result.config.max_distance_km, 63);
    }

    #[test]
    fn test_config_limits_default() {
        let limits = ConfigLimits::default();
        assert!(limits.max_config_size > 0);
    }
}
