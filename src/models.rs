use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// Step identifiers come from hand-written catalogs, so both numbers and strings are accepted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepId {
    Number(u64),
    Text(String),
}

impl StepId {
    /// Parses user input, preferring the numeric form when it fits.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<u64>() {
            Ok(n) => StepId::Number(n),
            Err(_) => StepId::Text(s.to_string()),
        }
    }

    pub fn matches_text(&self, s: &str) -> bool {
        match self {
            StepId::Number(n) => s.trim().parse::<u64>().map(|v| v == *n).unwrap_or(false),
            StepId::Text(t) => t == s,
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepId::Number(n) => write!(f, "{}", n),
            StepId::Text(t) => f.write_str(t),
        }
    }
}

impl From<u64> for StepId {
    fn from(n: u64) -> Self {
        StepId::Number(n)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        StepId::Text(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDefinition {
    pub id: StepId,
    pub title: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Raw references as written in the catalog (titles or ids).
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// `prerequisites` resolved against the owning path at load time.
    #[serde(skip)]
    pub prerequisite_ids: Vec<StepId>,
}

#[cfg(test)]
impl StepDefinition {
    pub fn new(id: impl Into<StepId>, title: &str) -> Self {
        Self {
            id: id.into(),
            title: title.to_string(),
            duration: String::new(),
            difficulty: None,
            description: None,
            resources: Vec::new(),
            prerequisites: Vec::new(),
            prerequisite_ids: Vec::new(),
        }
    }

    pub fn with_prerequisites(mut self, prerequisites: &[&str]) -> Self {
        self.prerequisites = prerequisites.iter().map(|p| p.to_string()).collect();
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathDefinition {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

impl PathDefinition {
    pub fn position(&self, step_id: &StepId) -> Option<usize> {
        self.steps.iter().position(|s| &s.id == step_id)
    }
}

// Level recorded by the assessment. Older saves stored a numeric score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserLevel {
    Numeric(f64),
    Named(String),
}

impl fmt::Display for UserLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserLevel::Numeric(n) => write!(f, "{}", n),
            UserLevel::Named(s) => f.write_str(s),
        }
    }
}

/// In-memory progress. `current_step` and `total_steps` are derived from the
/// catalog and are recomputed by the tracker after every mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub current_path: String,
    pub user_level: Option<UserLevel>,
    pub completed_steps: Vec<StepId>,
    pub current_step: Option<StepId>,
    pub total_steps: usize,
    pub start_date: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
}

impl ProgressState {
    pub fn new(current_path: &str) -> Self {
        Self {
            current_path: current_path.to_string(),
            user_level: None,
            completed_steps: Vec::new(),
            current_step: None,
            total_steps: 0,
            start_date: None,
            last_activity: None,
        }
    }

    pub fn is_completed(&self, step_id: &StepId) -> bool {
        self.completed_steps.contains(step_id)
    }

    /// Returns false when the step was already recorded.
    pub fn mark_completed(&mut self, step_id: &StepId) -> bool {
        if self.is_completed(step_id) {
            return false;
        }
        self.completed_steps.push(step_id.clone());
        true
    }

    pub fn unmark_completed(&mut self, step_id: &StepId) -> bool {
        let before = self.completed_steps.len();
        self.completed_steps.retain(|id| id != step_id);
        before != self.completed_steps.len()
    }

    /// Applies whatever a saved blob carried, keeping defaults for the rest.
    pub fn merge(&mut self, saved: SavedProgress) {
        if let Some(path) = saved.current_path {
            self.current_path = path;
        }
        if saved.user_level.is_some() {
            self.user_level = saved.user_level;
        }
        if let Some(total) = saved.total_steps {
            self.total_steps = total;
        }
        if let Some(completed) = saved.completed_steps {
            self.completed_steps.clear();
            for id in &completed {
                self.mark_completed(id);
            }
        }
        if saved.current_step.is_some() {
            self.current_step = saved.current_step;
        }
        if saved.start_date.is_some() {
            self.start_date = saved.start_date;
        }
        if saved.last_activity.is_some() {
            self.last_activity = saved.last_activity;
        }
    }

    pub fn to_persisted(&self, saved_at: DateTime<Utc>) -> PersistedState {
        PersistedState {
            current_path: self.current_path.clone(),
            user_level: self.user_level.clone(),
            progress: PersistedProgress {
                total_steps: self.total_steps,
                completed_steps: self.completed_steps.clone(),
                current_step: self.current_step.clone(),
                start_date: self.start_date,
                last_activity: self.last_activity,
            },
            saved_at,
        }
    }
}

// Storage blob layout, shared with the export file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub current_path: String,
    pub user_level: Option<UserLevel>,
    pub progress: PersistedProgress,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedProgress {
    pub total_steps: usize,
    pub completed_steps: Vec<StepId>,
    pub current_step: Option<StepId>,
    pub start_date: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
}

/// A saved blob decoded field by field. Anything missing or malformed is
/// `None` so it can be merged onto defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SavedProgress {
    pub current_path: Option<String>,
    pub user_level: Option<UserLevel>,
    pub total_steps: Option<usize>,
    pub completed_steps: Option<Vec<StepId>>,
    pub current_step: Option<StepId>,
    pub start_date: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub saved_at: Option<DateTime<Utc>>,
}

impl SavedProgress {
    pub fn from_value(value: &Value) -> Self {
        let empty = serde_json::Map::new();
        let root = value.as_object().unwrap_or(&empty);
        let progress = root
            .get("progress")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        Self {
            current_path: field(root, "currentPath"),
            user_level: field(root, "userLevel"),
            total_steps: field(progress, "totalSteps"),
            completed_steps: field(progress, "completedSteps"),
            current_step: field(progress, "currentStep"),
            start_date: field(progress, "startDate"),
            last_activity: field(progress, "lastActivity"),
            saved_at: field(root, "savedAt"),
        }
    }
}

fn field<T: DeserializeOwned>(obj: &serde_json::Map<String, Value>, key: &str) -> Option<T> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(v) => match serde_json::from_value(v.clone()) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!(key, error = %e, "ignoring malformed saved field");
                None
            }
        },
    }
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
