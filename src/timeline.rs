//! Timeline view model for one path.
//!
//! Everything here is derived from the catalog and `ProgressState`; front
//! ends only paint it.

use serde::Serialize;

use crate::catalog::PathCatalog;
use crate::models::{ProgressState, Resource, StepId};
use crate::tracker::step_locked;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Completed,
    Locked,
    Open,
}

impl Marker {
    pub fn icon(&self) -> &'static str {
        match self {
            Marker::Completed => "✓",
            Marker::Locked => "🔒",
            Marker::Open => "○",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    Toggle { completed: bool },
    Locked,
}

impl StepAction {
    pub fn label(&self) -> &'static str {
        match self {
            StepAction::Toggle { completed: true } => "Mark incomplete",
            StepAction::Toggle { completed: false } => "Mark complete",
            StepAction::Locked => "Locked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub index: usize,
    pub id: StepId,
    pub title: String,
    pub duration: String,
    pub difficulty: Option<String>,
    pub description: Option<String>,
    pub marker: Marker,
    pub is_current: bool,
    pub action: StepAction,
    pub resources: Vec<Resource>,
    pub prerequisites: Vec<String>,
}

impl TimelineEntry {
    pub fn prerequisites_line(&self) -> Option<String> {
        if self.prerequisites.is_empty() {
            None
        } else {
            Some(format!("Prerequisites: {}", self.prerequisites.join(", ")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub path_id: String,
    pub path_name: String,
    pub entries: Vec<TimelineEntry>,
}

pub fn build(catalog: &PathCatalog, state: &ProgressState, path_id: &str) -> Option<Timeline> {
    let path = catalog.get(path_id)?;

    let entries = path
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let completed = state.is_completed(&step.id);
            let locked = step_locked(path, index, state);
            let marker = if completed {
                Marker::Completed
            } else if locked {
                Marker::Locked
            } else {
                Marker::Open
            };
            let action = if locked {
                StepAction::Locked
            } else {
                StepAction::Toggle { completed }
            };

            TimelineEntry {
                index,
                id: step.id.clone(),
                title: step.title.clone(),
                duration: step.duration.clone(),
                difficulty: step.difficulty.clone(),
                description: step.description.clone(),
                marker,
                is_current: path_id == state.current_path
                    && state.current_step.as_ref() == Some(&step.id),
                action,
                resources: step.resources.clone(),
                prerequisites: step.prerequisites.clone(),
            }
        })
        .collect();

    Some(Timeline {
        path_id: path_id.to_string(),
        path_name: path.name.clone(),
        entries,
    })
}
