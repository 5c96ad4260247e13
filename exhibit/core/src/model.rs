//! Exhibit Data Model
//!
//! The two records that cross the generation boundary:
//! - [`UserInput`]: the three free-text answers typed by the visitor
//! - [`ExhibitData`]: the structured signboard content produced from them
//!
//! # Data Contract
//!
//! Generated payloads are untrusted. [`ExhibitData::from_json`] is the only
//! way raw text becomes an `ExhibitData`, and it rejects anything that does
//! not match the contract exactly. Stats outside `0..=100` are violations,
//! never clamped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::labels;

// ============================================================================
// User Input
// ============================================================================

/// The three answers collected by the input form
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    /// Exhibit name (the visitor's own name)
    pub name: String,
    /// Ecological traits: hobbies, skills, favourite things
    pub hobby: String,
    /// Recently observed behaviour: worries, recent news
    pub worry: String,
}

impl UserInput {
    /// Create an input record from its three fields
    pub fn new(
        name: impl Into<String>,
        hobby: impl Into<String>,
        worry: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            hobby: hobby.into(),
            worry: worry.into(),
        }
    }

    /// Read a single field
    #[must_use]
    pub fn field(&self, field: InputField) -> &str {
        match field {
            InputField::Name => &self.name,
            InputField::Hobby => &self.hobby,
            InputField::Worry => &self.worry,
        }
    }

    /// Replace a single field
    pub fn set(&mut self, field: InputField, value: String) {
        match field {
            InputField::Name => self.name = value,
            InputField::Hobby => self.hobby = value,
            InputField::Worry => self.worry = value,
        }
    }

    /// First field (in form order) that is empty after trimming
    #[must_use]
    pub fn first_missing(&self) -> Option<InputField> {
        InputField::ALL
            .into_iter()
            .find(|f| self.field(*f).trim().is_empty())
    }

    /// Copy with surrounding whitespace removed from every field
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self::new(self.name.trim(), self.hobby.trim(), self.worry.trim())
    }
}

/// Identifies one of the three form fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputField {
    /// Single-line exhibit name
    Name,
    /// Single-line hobby / trait
    Hobby,
    /// Multi-line recent behaviour / worry
    Worry,
}

impl InputField {
    /// All fields in form order
    pub const ALL: [InputField; 3] = [Self::Name, Self::Hobby, Self::Worry];

    /// Form label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => labels::NAME_LABEL,
            Self::Hobby => labels::HOBBY_LABEL,
            Self::Worry => labels::WORRY_LABEL,
        }
    }

    /// Placeholder shown while the field is empty
    #[must_use]
    pub fn placeholder(self) -> &'static str {
        match self {
            Self::Name => labels::NAME_PLACEHOLDER,
            Self::Hobby => labels::HOBBY_PLACEHOLDER,
            Self::Worry => labels::WORRY_PLACEHOLDER,
        }
    }

    /// Whether the field accepts line breaks
    #[must_use]
    pub fn is_multiline(self) -> bool {
        matches!(self, Self::Worry)
    }

    /// Next field, wrapping
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Name => Self::Hobby,
            Self::Hobby => Self::Worry,
            Self::Worry => Self::Name,
        }
    }

    /// Previous field, wrapping
    #[must_use]
    pub fn prev(self) -> Self {
        match self {
            Self::Name => Self::Worry,
            Self::Hobby => Self::Name,
            Self::Worry => Self::Hobby,
        }
    }
}

// ============================================================================
// Exhibit Data
// ============================================================================

/// Structured generation result rendered on the signboard
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitData {
    /// Short category label (e.g. "霊長目ヒト科")
    pub classification: String,
    /// Short severity label
    pub danger_level: String,
    /// Decorative pseudo-taxonomic name
    pub scientific_name: String,
    /// Keeper's commentary; embedded line breaks are significant
    pub description: String,
    /// Percentage attributes
    pub stats: ExhibitStats,
    /// Short supplementary trivia
    pub fun_fact: String,
}

/// The four percentage stats, each in `0..=100`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitStats {
    /// Stamina percentage
    pub stamina: u8,
    /// Intelligence percentage
    pub intelligence: u8,
    /// Laziness percentage
    pub laziness: u8,
    /// Charm percentage
    pub charm: u8,
}

impl ExhibitStats {
    /// Value of one stat
    #[must_use]
    pub fn get(&self, kind: StatKind) -> u8 {
        match kind {
            StatKind::Stamina => self.stamina,
            StatKind::Intelligence => self.intelligence,
            StatKind::Laziness => self.laziness,
            StatKind::Charm => self.charm,
        }
    }

    /// Stats in display order
    pub fn iter(&self) -> impl Iterator<Item = (StatKind, u8)> + '_ {
        StatKind::ALL.into_iter().map(|k| (k, self.get(k)))
    }
}

/// Names one of the four stats
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatKind {
    /// 体力
    Stamina,
    /// 知性
    Intelligence,
    /// 怠惰
    Laziness,
    /// 愛嬌
    Charm,
}

impl StatKind {
    /// All stats in display order
    pub const ALL: [StatKind; 4] = [
        Self::Stamina,
        Self::Intelligence,
        Self::Laziness,
        Self::Charm,
    ];

    /// JSON key inside `stats`
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Stamina => "stamina",
            Self::Intelligence => "intelligence",
            Self::Laziness => "laziness",
            Self::Charm => "charm",
        }
    }

    /// Display label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Stamina => labels::STAT_STAMINA,
            Self::Intelligence => labels::STAT_INTELLIGENCE,
            Self::Laziness => labels::STAT_LAZINESS,
            Self::Charm => labels::STAT_CHARM,
        }
    }
}

// ============================================================================
// Contract Validation
// ============================================================================

/// Ways a generated payload can break the exhibit contract
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractViolation {
    /// Payload is not JSON at all
    #[error("payload is not valid JSON: {0}")]
    NotJson(String),

    /// Top level (or `stats`) is not an object
    #[error("expected a JSON object for `{0}`")]
    NotAnObject(&'static str),

    /// A required field is absent
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A text field is not a string or is blank
    #[error("field `{0}` must be a non-empty string")]
    InvalidText(&'static str),

    /// A stat is not an integer
    #[error("stat `{field}` is not an integer: {value}")]
    NonNumericStat {
        /// Stat key
        field: &'static str,
        /// Offending JSON value
        value: String,
    },

    /// A stat is an integer outside 0..=100
    #[error("stat `{field}` out of range: {value}")]
    StatOutOfRange {
        /// Stat key
        field: &'static str,
        /// Offending value
        value: i64,
    },
}

impl ExhibitData {
    /// Parse and validate a raw generated payload
    ///
    /// A single surrounding markdown code fence (```` ```json ... ``` ````) is
    /// tolerated; anything else must be a bare JSON object.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContractViolation`] found. Nothing is clamped or
    /// defaulted.
    pub fn from_json(raw: &str) -> Result<Self, ContractViolation> {
        let body = strip_code_fence(raw);
        let value: Value =
            serde_json::from_str(body).map_err(|e| ContractViolation::NotJson(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Validate an already-parsed JSON value
    ///
    /// # Errors
    ///
    /// Returns the first [`ContractViolation`] found.
    pub fn from_value(value: &Value) -> Result<Self, ContractViolation> {
        let obj = value
            .as_object()
            .ok_or(ContractViolation::NotAnObject("exhibit"))?;

        let text = |key: &'static str| -> Result<String, ContractViolation> {
            let v = obj.get(key).ok_or(ContractViolation::MissingField(key))?;
            match v.as_str() {
                Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
                _ => Err(ContractViolation::InvalidText(key)),
            }
        };

        let classification = text("classification")?;
        let danger_level = text("dangerLevel")?;
        let scientific_name = text("scientificName")?;
        let description = text("description")?;
        let fun_fact = text("funFact")?;

        let stats_value = obj
            .get("stats")
            .ok_or(ContractViolation::MissingField("stats"))?;
        let stats_obj = stats_value
            .as_object()
            .ok_or(ContractViolation::NotAnObject("stats"))?;

        let stat = |kind: StatKind| -> Result<u8, ContractViolation> {
            let key = kind.key();
            let v = stats_obj
                .get(key)
                .ok_or(ContractViolation::MissingField(key))?;
            let n = stat_integer(v).ok_or_else(|| ContractViolation::NonNumericStat {
                field: key,
                value: v.to_string(),
            })?;
            u8::try_from(n)
                .ok()
                .filter(|p| *p <= 100)
                .ok_or(ContractViolation::StatOutOfRange { field: key, value: n })
        };

        let stats = ExhibitStats {
            stamina: stat(StatKind::Stamina)?,
            intelligence: stat(StatKind::Intelligence)?,
            laziness: stat(StatKind::Laziness)?,
            charm: stat(StatKind::Charm)?,
        };

        Ok(Self {
            classification,
            danger_level,
            scientific_name,
            description,
            stats,
            fun_fact,
        })
    }
}

/// Integer view of a JSON number; `80.0` counts, `80.5` and `"80"` do not
#[allow(clippy::cast_possible_truncation)]
fn stat_integer(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    if v.is_u64() {
        // Larger than i64::MAX, still an integer, certainly out of range
        return Some(i64::MAX);
    }
    let f = v.as_f64()?;
    (f.fract() == 0.0 && f.is_finite()).then_some(f as i64)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop an info string such as `json` on the opening fence line
    match inner.split_once('\n') {
        Some((tag, body)) if is_info_string(tag) => body.trim(),
        _ => inner.trim(),
    }
}

/// Whether the opening fence line is a language tag rather than payload
fn is_info_string(line: &str) -> bool {
    let line = line.trim();
    !line.is_empty() && !line.contains(|c: char| c == '{' || c == '[')
}
