use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Opaque backend identifier.
///
/// Ids arrive as JSON integers from the backend and as strings from form
/// controls, so both are normalized to their trimmed string form before any
/// comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<i64> for RecordId {
    fn from(raw: i64) -> Self {
        Self(raw.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Int(i64),
            Unsigned(u64),
            Float(f64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => RecordId::new(text),
            Raw::Int(value) => RecordId::from(value),
            Raw::Unsigned(value) => RecordId(value.to_string()),
            Raw::Float(value) => RecordId(value.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    #[serde(rename = "category_name")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: RecordId,
    pub name: String,
    #[serde(rename = "category")]
    pub category_id: RecordId,
    pub default_points: u32,
}

/// Row written to the habit log table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    #[serde(rename = "habit")]
    pub habit_id: RecordId,
    pub recorded_points: u32,
}

/// Joined read of a log row with the habit it references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRow {
    pub date: NaiveDate,
    #[serde(default)]
    pub recorded_points: Option<u32>,
    #[serde(rename = "habits")]
    pub habit: LoggedHabit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedHabit {
    pub name: String,
    pub default_points: u32,
    pub category: RecordId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordedEntry {
    pub entry: LogEntry,
    pub habit_name: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct DateRequest {
    pub date: String,
}

/// `today` is the viewer's local date, when the page reports it.
#[derive(Debug, Default, Deserialize)]
pub struct RecordRequest {
    #[serde(default)]
    pub today: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    #[serde(default)]
    pub category_id: String,
}

#[derive(Debug, Deserialize)]
pub struct HabitRequest {
    #[serde(default)]
    pub habit_id: String,
}
