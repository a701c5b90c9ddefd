use serde::Serialize;

use crate::catalog::PathCatalog;
use crate::models::{PathDefinition, ProgressState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PathProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: u8,
}

impl PathProgress {
    pub fn compute(path: &PathDefinition, state: &ProgressState) -> Self {
        let total = path.steps.len();
        let completed = path
            .steps
            .iter()
            .filter(|s| state.is_completed(&s.id))
            .count();
        Self {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// `round(completed / total * 100)`, 0 for an empty path.
pub fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (completed as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress { completed: usize, total: usize },
    Complete { path_name: String },
}

impl ProgressStatus {
    pub fn message(&self) -> String {
        match self {
            ProgressStatus::NotStarted => "Not started yet - pick the first step to begin".to_string(),
            ProgressStatus::InProgress { completed, total } => {
                format!("{}/{} steps completed", completed, total)
            }
            ProgressStatus::Complete { path_name } => {
                format!("Path complete! Congratulations on finishing {}", path_name)
            }
        }
    }
}

// Completion badge shown on each path tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathBadge {
    pub path_id: String,
    pub name: String,
    pub percentage: u8,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSummary {
    pub path_id: String,
    pub path_name: String,
    pub progress: PathProgress,
    pub label: String,
    pub status: ProgressStatus,
    pub message: String,
    pub badges: Vec<PathBadge>,
}

impl ProgressSummary {
    /// Progress bar fill, 0..=100.
    pub fn bar_width(&self) -> u8 {
        self.progress.percentage
    }
}

pub fn summarize(catalog: &PathCatalog, state: &ProgressState) -> ProgressSummary {
    let active = catalog.get(&state.current_path);
    let progress = active
        .map(|path| PathProgress::compute(path, state))
        .unwrap_or(PathProgress {
            completed: 0,
            total: 0,
            percentage: 0,
        });
    let path_name = active
        .map(|path| path.name.clone())
        .unwrap_or_else(|| state.current_path.clone());

    let status = if progress.completed == 0 {
        ProgressStatus::NotStarted
    } else if progress.is_complete() {
        ProgressStatus::Complete {
            path_name: path_name.clone(),
        }
    } else {
        ProgressStatus::InProgress {
            completed: progress.completed,
            total: progress.total,
        }
    };

    ProgressSummary {
        path_id: state.current_path.clone(),
        path_name,
        progress,
        label: format!("{}%", progress.percentage),
        message: status.message(),
        status,
        badges: badges(catalog, state),
    }
}

/// Badges for every path in the catalog, not just the active one.
pub fn badges(catalog: &PathCatalog, state: &ProgressState) -> Vec<PathBadge> {
    catalog
        .iter()
        .map(|(id, path)| PathBadge {
            path_id: id.to_string(),
            name: path.name.clone(),
            percentage: PathProgress::compute(path, state).percentage,
            active: id == state.current_path,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StepDefinition, StepId};

    fn catalog() -> PathCatalog {
        PathCatalog::from_paths(vec![
            (
                "beginner".to_string(),
                PathDefinition {
                    name: "Beginner".to_string(),
                    steps: vec![
                        StepDefinition::new(1, "Intro"),
                        StepDefinition::new(2, "Values"),
                        StepDefinition::new(3, "Entities"),
                    ],
                },
            ),
            (
                "expert".to_string(),
                PathDefinition {
                    name: "Expert".to_string(),
                    steps: vec![StepDefinition::new(10, "Sagas"), StepDefinition::new(11, "ES")],
                },
            ),
            (
                "empty".to_string(),
                PathDefinition {
                    name: "Empty".to_string(),
                    steps: Vec::new(),
                },
            ),
        ])
    }

    fn state_with(path: &str, completed: &[u64]) -> ProgressState {
        let mut state = ProgressState::new(path);
        for id in completed {
            state.mark_completed(&StepId::Number(*id));
        }
        state
    }

    mod percentage_tests {
        use super::*;

        #[test]
        fn zero_total_is_zero() {
            assert_eq!(percentage(0, 0), 0);
        }

        #[test]
        fn rounds_to_nearest() {
            assert_eq!(percentage(1, 3), 33);
            assert_eq!(percentage(2, 3), 67);
            assert_eq!(percentage(3, 3), 100);
        }
    }

    mod summary_tests {
        use super::*;

        #[test]
        fn not_started() {
            let summary = summarize(&catalog(), &state_with("beginner", &[]));
            assert_eq!(summary.status, ProgressStatus::NotStarted);
            assert_eq!(summary.label, "0%");
            assert_eq!(summary.bar_width(), 0);
        }

        #[test]
        fn in_progress_message() {
            let summary = summarize(&catalog(), &state_with("beginner", &[1]));
            assert_eq!(summary.message, "1/3 steps completed");
            assert_eq!(summary.label, "33%");
        }

        #[test]
        fn complete_message() {
            let summary = summarize(&catalog(), &state_with("beginner", &[1, 2, 3]));
            assert_eq!(
                summary.status,
                ProgressStatus::Complete {
                    path_name: "Beginner".to_string()
                }
            );
            assert_eq!(summary.bar_width(), 100);
        }

        #[test]
        fn empty_path_is_zero_not_nan() {
            let summary = summarize(&catalog(), &state_with("empty", &[]));
            assert_eq!(summary.progress.total, 0);
            assert_eq!(summary.progress.percentage, 0);
            assert_eq!(summary.status, ProgressStatus::NotStarted);
        }

        #[test]
        fn unknown_active_path_is_empty() {
            let summary = summarize(&catalog(), &state_with("missing", &[1]));
            assert_eq!(summary.progress.total, 0);
            assert_eq!(summary.path_name, "missing");
        }

        #[test]
        fn steps_from_other_paths_do_not_count() {
            let summary = summarize(&catalog(), &state_with("beginner", &[10, 11]));
            assert_eq!(summary.progress.completed, 0);
        }
    }

    mod badge_tests {
        use super::*;

        #[test]
        fn covers_every_path() {
            let badges = badges(&catalog(), &state_with("beginner", &[1, 10]));
            let pcts: Vec<(&str, u8, bool)> = badges
                .iter()
                .map(|b| (b.path_id.as_str(), b.percentage, b.active))
                .collect();
            assert_eq!(
                pcts,
                vec![("beginner", 33, true), ("expert", 50, false), ("empty", 0, false)]
            );
        }
    }
}
