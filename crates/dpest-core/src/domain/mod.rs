pub mod errors;

pub use errors::{DpestError, DpestResult, ErrorCategory};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Half-open character span inside one line of text, `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn width(&self) -> usize {
        self.end - self.start
    }

    pub const fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub const fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Number of characters this span shares with `other`.
    pub fn overlap_width(&self, other: &Span) -> usize {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        end.saturating_sub(start)
    }
}

/// One calibratable quantity addressed by (line, column) inside a source
/// file. Lines and token columns are 1-based; `group` defaults to the
/// parameter name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub name: String,
    pub line: usize,
    pub column: usize,
    pub min: f64,
    pub max: f64,
    pub group: String,
}

impl ParameterSpec {
    pub fn new(
        name: impl Into<String>,
        line: usize,
        column: usize,
        min: f64,
        max: f64,
        group: Option<String>,
    ) -> DpestResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DpestError::validation(
                "INPUT.PARAMETER_NAME",
                "parameter name must not be empty",
            ));
        }
        if line == 0 || column == 0 {
            return Err(DpestError::validation(
                "INPUT.PARAMETER_LOCATION",
                format!(
                    "parameter '{}': line and column are 1-based and must be positive (got line {}, column {})",
                    name, line, column
                ),
            ));
        }
        if min > max {
            return Err(DpestError::validation(
                "INPUT.PARAMETER_BOUNDS",
                format!(
                    "parameter '{}': lower bound {} exceeds upper bound {}",
                    name, min, max
                ),
            ));
        }
        let group = match group {
            Some(group) if !group.trim().is_empty() => group.trim().to_string(),
            _ => name.clone(),
        };
        Ok(Self {
            name,
            line,
            column,
            min,
            max,
            group,
        })
    }
}

const MARKER_FORBIDDEN: [char; 7] = ['[', ']', '(', ')', ':', '&', '!'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Primary,
    Secondary,
}

/// Validates one marker delimiter. PEST forbids alphanumerics, brackets,
/// parentheses, colons, whitespace and ampersands; `!` is additionally
/// forbidden for the primary delimiter only (it is the secondary default).
pub fn validate_marker(candidate: char, kind: MarkerKind) -> DpestResult<char> {
    let label = match kind {
        MarkerKind::Primary => "mrk",
        MarkerKind::Secondary => "smk",
    };
    let forbidden = candidate.is_alphanumeric()
        || candidate.is_whitespace()
        || !candidate.is_ascii_graphic()
        || (MARKER_FORBIDDEN.contains(&candidate)
            && !(kind == MarkerKind::Secondary && candidate == '!'));
    if forbidden {
        return Err(DpestError::validation(
            "INPUT.MARKER_DELIMITER",
            format!(
                "'{}' is not a valid {} delimiter; it must be a single printable character other than letters, digits, '!', '[', ']', '(', ')', ':', whitespace and '&'",
                candidate, label
            ),
        ));
    }
    Ok(candidate)
}

/// Validated primary/secondary marker delimiter pair (defaults `~` / `!`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerPair {
    primary: char,
    secondary: char,
}

impl MarkerPair {
    pub fn new(primary: char, secondary: char) -> DpestResult<Self> {
        let primary = validate_marker(primary, MarkerKind::Primary)?;
        let secondary = validate_marker(secondary, MarkerKind::Secondary)?;
        if primary == secondary {
            return Err(DpestError::validation(
                "INPUT.MARKER_DELIMITER",
                "mrk and smk must be different characters",
            ));
        }
        Ok(Self { primary, secondary })
    }

    pub const fn primary(&self) -> char {
        self.primary
    }

    pub const fn secondary(&self) -> char {
        self.secondary
    }
}

impl Default for MarkerPair {
    fn default() -> Self {
        Self {
            primary: '~',
            secondary: '!',
        }
    }
}

/// Treatment tag appended to output filenames and observation names so PEST
/// can tell apart observations of the same variable across treatments.
/// Restricted to 1-4 alphanumeric characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suffix(String);

impl Suffix {
    pub fn new(raw: impl Into<String>) -> DpestResult<Self> {
        let raw = raw.into();
        if raw.is_empty() || raw.len() > 4 {
            return Err(DpestError::validation(
                "INPUT.SUFFIX",
                format!("suffix '{}' must be 1 to 4 characters long", raw),
            ));
        }
        if !raw.chars().all(|character| character.is_ascii_alphanumeric()) {
            return Err(DpestError::validation(
                "INPUT.SUFFIX",
                format!("suffix '{}' must only contain letters and digits", raw),
            ));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `_TAG` form appended to names and filenames.
    pub fn tag(&self) -> String {
        format!("_{}", self.0)
    }
}

/// One template parameter after identifier truncation: the identifier that
/// went into the template, the value found in the source file (verbatim, not
/// reparsed), the calibration bounds, and the PEST group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterEntry {
    pub id: String,
    pub value: String,
    pub min: f64,
    pub max: f64,
    pub group: String,
}

/// Parameters produced by one template-generation call, in spec order.
/// Immutable once returned to the caller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeneratedParameterSet {
    entries: Vec<ParameterEntry>,
}

impl GeneratedParameterSet {
    pub(crate) fn push(&mut self, entry: ParameterEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ParameterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.value.as_str())
    }

    /// Group definitions in first-appearance order, each with the
    /// comma-joined identifiers belonging to it.
    pub fn grouped(&self) -> Vec<(String, String)> {
        let mut groups: Vec<(String, Vec<&str>)> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|(name, _)| *name == entry.group) {
                Some((_, ids)) => ids.push(&entry.id),
                None => groups.push((entry.group.clone(), vec![&entry.id])),
            }
        }
        groups
            .into_iter()
            .map(|(name, ids)| (name, ids.join(", ")))
            .collect()
    }
}

/// One measured observation matched against a simulated output cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub variable_name: String,
    pub value_measured: f64,
    pub group: String,
}

/// Ordered collection of measured observations produced by one
/// instruction-file generation call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObservationTable {
    records: Vec<ObservationRecord>,
}

impl ObservationTable {
    pub(crate) fn push(&mut self, record: ObservationRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ObservationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Result of a template-generation call (.TPL path plus parameter bundle).
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateArtifact {
    pub parameters: GeneratedParameterSet,
    pub output_path: PathBuf,
}

/// Result of an instruction-generation call (.INS path plus observations).
#[derive(Debug, Clone, PartialEq)]
pub struct InstructionArtifact {
    pub observations: ObservationTable,
    pub output_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::{
        GeneratedParameterSet, MarkerKind, MarkerPair, ParameterEntry, ParameterSpec, Span, Suffix,
        validate_marker,
    };

    #[test]
    fn span_arithmetic_matches_half_open_convention() {
        let field = Span::new(3, 9);
        let token = Span::new(5, 9);
        assert_eq!(field.width(), 6);
        assert!(field.contains(&token));
        assert!(field.overlaps(&token));
        assert_eq!(field.overlap_width(&token), 4);
        assert!(!Span::new(0, 3).overlaps(&field));
    }

    #[test]
    fn parameter_spec_defaults_group_to_name() {
        let spec = ParameterSpec::new("PARMAX", 5, 1, 20.0, 60.0, None).expect("spec should build");
        assert_eq!(spec.group, "PARMAX");

        let grouped = ParameterSpec::new("PARMAX", 5, 1, 20.0, 60.0, Some("PHOTOSYN".into()))
            .expect("spec should build");
        assert_eq!(grouped.group, "PHOTOSYN");
    }

    #[test]
    fn parameter_spec_rejects_zero_based_locations_and_inverted_bounds() {
        assert!(ParameterSpec::new("P", 0, 1, 0.0, 1.0, None).is_err());
        assert!(ParameterSpec::new("P", 1, 0, 0.0, 1.0, None).is_err());
        assert!(ParameterSpec::new("P", 1, 1, 2.0, 1.0, None).is_err());
    }

    #[test]
    fn marker_validation_rejects_reserved_characters() {
        for bad in ['a', 'Z', '7', '!', '[', ']', '(', ')', ':', ' ', '&'] {
            assert!(validate_marker(bad, MarkerKind::Primary).is_err(), "{bad}");
        }
        assert_eq!(validate_marker('~', MarkerKind::Primary).unwrap(), '~');
        assert_eq!(validate_marker('!', MarkerKind::Secondary).unwrap(), '!');
        assert_eq!(validate_marker('#', MarkerKind::Secondary).unwrap(), '#');
    }

    #[test]
    fn marker_pair_requires_distinct_delimiters() {
        assert!(MarkerPair::new('~', '~').is_err());
        let pair = MarkerPair::default();
        assert_eq!(pair.primary(), '~');
        assert_eq!(pair.secondary(), '!');
    }

    #[test]
    fn suffix_enforces_short_alphanumeric_tags() {
        assert_eq!(Suffix::new("TRT1").unwrap().tag(), "_TRT1");
        assert!(Suffix::new("").is_err());
        assert!(Suffix::new("LONGSUFFIX").is_err());
        assert!(Suffix::new("bad$").is_err());
    }

    #[test]
    fn parameter_set_groups_preserve_first_appearance_order() {
        let mut set = GeneratedParameterSet::default();
        for (id, group) in [("PAR", "PHOTOSYN"), ("YLM", "TEMP_RESP"), ("PHT", "PHOTOSYN")] {
            set.push(ParameterEntry {
                id: id.to_string(),
                value: "1.0".to_string(),
                min: 0.0,
                max: 2.0,
                group: group.to_string(),
            });
        }

        assert_eq!(
            set.grouped(),
            vec![
                ("PHOTOSYN".to_string(), "PAR, PHT".to_string()),
                ("TEMP_RESP".to_string(), "YLM".to_string()),
            ]
        );
        assert_eq!(set.value("YLM"), Some("1.0"));
    }
}
