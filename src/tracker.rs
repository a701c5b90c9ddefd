use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::assessment::{Assessment, AssessmentResult, Thresholds, QUESTIONS};
use crate::autosave::{Autosave, Clock};
use crate::catalog::PathCatalog;
use crate::error::{AssessmentError, ExportError};
use crate::export::{self, ExportedProgress};
use crate::models::{PathDefinition, ProgressState, StepId, UserLevel};
use crate::notify::{Notification, NotificationLevel};
use crate::progress::{self, ProgressSummary};
use crate::storage::ProgressStore;
use crate::timeline::{self, Timeline};

/// A step is locked when its predecessor or any resolved prerequisite is
/// incomplete. The first step never is.
pub fn step_locked(path: &PathDefinition, index: usize, state: &ProgressState) -> bool {
    if index == 0 {
        return false;
    }
    let Some(step) = path.steps.get(index) else {
        return false;
    };

    let previous = &path.steps[index - 1];
    if !state.is_completed(&previous.id) {
        return true;
    }

    step.prerequisite_ids
        .iter()
        .any(|id| !state.is_completed(id))
}

/// Lowest-index incomplete step of the path.
pub fn first_incomplete(path: &PathDefinition, state: &ProgressState) -> Option<StepId> {
    path.steps
        .iter()
        .find(|s| !state.is_completed(&s.id))
        .map(|s| s.id.clone())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    Completed,
    Uncompleted,
    Locked,
    NotInActivePath,
}

/// Owns the progress state for one catalog. Front ends drive it and drain
/// `notifications` after each action.
pub struct LearningPathTracker {
    catalog: PathCatalog,
    state: ProgressState,
    store: Box<dyn ProgressStore>,
    clock: Box<dyn Clock>,
    autosave: Autosave,
    thresholds: Thresholds,
    notifications: Vec<Notification>,
}

impl LearningPathTracker {
    pub fn new(catalog: PathCatalog, store: Box<dyn ProgressStore>, clock: Box<dyn Clock>) -> Self {
        let state = ProgressState::new(catalog.default_path_id());
        let mut tracker = Self {
            catalog,
            state,
            store,
            clock,
            autosave: Autosave::default(),
            thresholds: Thresholds::default(),
            notifications: Vec::new(),
        };
        tracker.recompute();
        tracker
    }

    /// Constructs the tracker and restores whatever the store holds.
    pub fn open(catalog: PathCatalog, store: Box<dyn ProgressStore>, clock: Box<dyn Clock>) -> Self {
        let mut tracker = Self::new(catalog, store, clock);
        tracker.load_progress();
        tracker
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_autosave_interval(mut self, interval: Duration) -> Self {
        self.autosave = Autosave::new(interval);
        self
    }

    pub fn catalog(&self) -> &PathCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn active_path(&self) -> Option<&PathDefinition> {
        self.catalog.get(&self.state.current_path)
    }

    fn default_state(&self) -> ProgressState {
        let mut state = ProgressState::new(self.catalog.default_path_id());
        if let Some(path) = self.catalog.get(&state.current_path) {
            state.total_steps = path.steps.len();
            state.current_step = first_incomplete(path, &state);
        }
        state
    }

    // Derived fields; must run after every mutation and before render/persist
    fn recompute(&mut self) {
        match self.catalog.get(&self.state.current_path) {
            Some(path) => {
                self.state.total_steps = path.steps.len();
                self.state.current_step = first_incomplete(path, &self.state);
            }
            None => {
                self.state.total_steps = 0;
                self.state.current_step = None;
            }
        }
    }

    fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        let notification = Notification::new(level, message, self.clock.now());
        self.notifications.push(notification);
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    // === Path selection ===

    /// Unknown ids are ignored.
    pub fn select_path(&mut self, path_id: &str) -> bool {
        if !self.catalog.contains(path_id) {
            debug!(path = path_id, "ignoring unknown path");
            return false;
        }
        self.state.current_path = path_id.to_string();
        self.recompute();
        self.save_progress();
        true
    }

    pub fn timeline(&self) -> Option<Timeline> {
        self.timeline_for(&self.state.current_path)
    }

    pub fn timeline_for(&self, path_id: &str) -> Option<Timeline> {
        timeline::build(&self.catalog, &self.state, path_id)
    }

    pub fn progress_summary(&self) -> ProgressSummary {
        progress::summarize(&self.catalog, &self.state)
    }

    // === Step completion ===

    /// Checks the step at `index_in_path` of the active path.
    pub fn is_step_locked(&self, step_id: &StepId, index_in_path: usize) -> bool {
        let Some(path) = self.active_path() else {
            return false;
        };
        match path.steps.get(index_in_path) {
            Some(step) if &step.id == step_id => step_locked(path, index_in_path, &self.state),
            _ => match path.position(step_id) {
                Some(index) => step_locked(path, index, &self.state),
                None => false,
            },
        }
    }

    /// Maps typed input to a step of the active path. Ids are compared as
    /// written in the catalog, so a text id "10" wins over parsing to a number.
    pub fn resolve_step_id(&self, raw: &str) -> StepId {
        let raw = raw.trim();
        self.active_path()
            .and_then(|path| {
                path.steps
                    .iter()
                    .find(|s| matches!(&s.id, StepId::Text(t) if t == raw))
                    .or_else(|| path.steps.iter().find(|s| s.id.matches_text(raw)))
            })
            .map(|s| s.id.clone())
            .unwrap_or_else(|| StepId::parse(raw))
    }

    pub fn toggle_step_completion(&mut self, step_id: &StepId) -> ToggleOutcome {
        let Some(path) = self.catalog.get(&self.state.current_path) else {
            return ToggleOutcome::NotInActivePath;
        };
        let Some(index) = path.position(step_id) else {
            debug!(step = %step_id, path = %self.state.current_path, "step is not in the active path");
            return ToggleOutcome::NotInActivePath;
        };
        let title = path.steps[index].title.clone();

        if self.is_step_locked(step_id, index) {
            self.notify(
                NotificationLevel::Warning,
                format!("\"{}\" is locked. Complete the previous steps first.", title),
            );
            return ToggleOutcome::Locked;
        }

        let outcome = if self.state.is_completed(step_id) {
            self.state.unmark_completed(step_id);
            ToggleOutcome::Uncompleted
        } else {
            let now = self.clock.now();
            self.state.mark_completed(step_id);
            self.state.last_activity = Some(now);
            if self.state.start_date.is_none() {
                self.state.start_date = Some(now);
            }
            ToggleOutcome::Completed
        };

        self.recompute();
        self.save_progress();

        if outcome == ToggleOutcome::Completed {
            info!(step = %step_id, "step completed");
            self.notify(
                NotificationLevel::Success,
                format!("Completed \"{}\"", title),
            );
        }
        outcome
    }

    // === Assessment ===

    pub fn start_assessment(&self) -> Assessment {
        Assessment::new(QUESTIONS)
    }

    /// Blocks an incomplete form with a warning; never changes state.
    pub fn submit_assessment(
        &mut self,
        assessment: &Assessment,
    ) -> Result<AssessmentResult, AssessmentError> {
        match assessment.calculate_results(&self.thresholds) {
            Ok(result) => Ok(result),
            Err(e) => {
                self.notify(NotificationLevel::Warning, e.to_string());
                Err(e)
            }
        }
    }

    /// Explicit acceptance of a recommendation.
    pub fn apply_recommendation(&mut self, result: &AssessmentResult) -> bool {
        let path_id = result.recommendation.path_id();
        if !self.catalog.contains(path_id) {
            warn!(path = path_id, "recommended path is not in the catalog");
            return false;
        }
        self.state.user_level = Some(UserLevel::Named(path_id.to_string()));
        self.select_path(path_id);
        self.notify(
            NotificationLevel::Info,
            format!("Switched to the {} path", result.recommendation.label()),
        );
        true
    }

    // === Persistence ===

    /// Merges the saved blob onto defaults. Any failure leaves defaults in
    /// place and is only logged.
    pub fn load_progress(&mut self) -> bool {
        let mut state = self.default_state();
        let restored = match self.store.load() {
            Ok(Some(saved)) => {
                debug!(saved_at = ?saved.saved_at, "restoring saved progress");
                state.merge(saved);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "failed to load saved progress, starting fresh");
                false
            }
        };

        if !self.catalog.contains(&state.current_path) {
            warn!(path = %state.current_path, "saved path no longer exists, using default");
            state.current_path = self.catalog.default_path_id().to_string();
        }

        self.state = state;
        self.recompute();
        restored
    }

    pub fn save_progress(&mut self) -> bool {
        let persisted = self.state.to_persisted(self.clock.now());
        match self.store.save(&persisted) {
            Ok(()) => {
                debug!(path = %self.state.current_path, "progress saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to save progress");
                false
            }
        }
    }

    /// Requires confirmation; keeps the active path.
    pub fn reset_progress(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        let current_path = self.state.current_path.clone();
        self.state = ProgressState::new(&current_path);
        self.recompute();
        self.save_progress();
        info!(path = %current_path, "progress reset");
        self.notify(NotificationLevel::Info, "Progress has been reset");
        true
    }

    pub fn export_snapshot(&self) -> ExportedProgress {
        let now = self.clock.now();
        ExportedProgress::new(self.state.to_persisted(now), now)
    }

    pub fn export_progress(&mut self, dir: &Path) -> Result<PathBuf, ExportError> {
        let path = export::write(dir, &self.export_snapshot())?;
        info!(file = %path.display(), "progress exported");
        self.notify(
            NotificationLevel::Success,
            format!("Progress exported to {}", path.display()),
        );
        Ok(path)
    }

    // === Autosave ===

    pub fn start_autosave(&mut self) {
        if self.autosave.is_running() {
            return;
        }
        let now = self.clock.now();
        self.autosave.start(now);
    }

    pub fn stop_autosave(&mut self) {
        self.autosave.stop();
    }

    /// Saves when the autosave interval has elapsed.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        if self.autosave.poll(now) {
            return self.save_progress();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::Recommendation;
    use crate::autosave::ManualClock;
    use crate::models::StepDefinition;
    use crate::storage::MemoryStore;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    fn example_catalog() -> PathCatalog {
        PathCatalog::from_paths(vec![
            (
                "beginner".to_string(),
                PathDefinition {
                    name: "Beginner".to_string(),
                    steps: vec![
                        StepDefinition::new(1, "Intro"),
                        StepDefinition::new(2, "Values").with_prerequisites(&["Intro"]),
                        StepDefinition::new(3, "Entities"),
                    ],
                },
            ),
            (
                "intermediate".to_string(),
                PathDefinition {
                    name: "Intermediate".to_string(),
                    steps: vec![
                        StepDefinition::new(4, "Aggregates"),
                        StepDefinition::new(5, "Events"),
                    ],
                },
            ),
            (
                "expert".to_string(),
                PathDefinition {
                    name: "Expert".to_string(),
                    steps: vec![
                        StepDefinition::new(6, "Contexts"),
                        StepDefinition::new(7, "Sourcing"),
                        // explicit prerequisite on a later step of the path
                        StepDefinition::new(8, "Sagas").with_prerequisites(&["Capstone"]),
                        StepDefinition::new(9, "Capstone"),
                    ],
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

    fn setup() -> (LearningPathTracker, MemoryStore, ManualClock) {
        let store = MemoryStore::new();
        let clock = ManualClock::at(t0());
        let tracker = LearningPathTracker::open(
            example_catalog(),
            Box::new(store.clone()),
            Box::new(clock.clone()),
        );
        (tracker, store, clock)
    }

    fn id(n: u64) -> StepId {
        StepId::Number(n)
    }

    fn locks(tracker: &LearningPathTracker) -> Vec<bool> {
        let path = tracker.active_path().unwrap();
        path.steps
            .iter()
            .enumerate()
            .map(|(i, s)| tracker.is_step_locked(&s.id, i))
            .collect()
    }

    mod locking_tests {
        use super::*;

        #[test]
        fn first_step_never_locked() {
            let (mut tracker, _, _) = setup();
            for path_id in ["beginner", "intermediate", "expert"] {
                tracker.select_path(path_id);
                let first = tracker.active_path().unwrap().steps[0].id.clone();
                assert!(!tracker.is_step_locked(&first, 0));
            }
        }

        #[test]
        fn sequence_rule_locks_following_steps() {
            let (tracker, _, _) = setup();
            assert_eq!(locks(&tracker), vec![false, true, true]);
        }

        #[test]
        fn explicit_prerequisite_locks_independently() {
            let (mut tracker, _, _) = setup();
            tracker.select_path("expert");
            tracker.toggle_step_completion(&id(6));
            tracker.toggle_step_completion(&id(7));

            // predecessor done, but "Capstone" is not
            assert_eq!(locks(&tracker), vec![false, false, true, true]);
        }

        #[test]
        fn locked_iff_predecessor_or_prerequisite_incomplete() {
            let catalog = example_catalog();
            let path = catalog.get("beginner").unwrap();
            let combos: [&[u64]; 6] = [&[], &[1], &[2], &[1, 2], &[2, 3], &[1, 2, 3]];
            for completed in combos {
                let mut state = ProgressState::new("beginner");
                for n in completed {
                    state.mark_completed(&id(*n));
                }
                for (i, step) in path.steps.iter().enumerate().skip(1) {
                    let expected = !state.is_completed(&path.steps[i - 1].id)
                        || step.prerequisite_ids.iter().any(|p| !state.is_completed(p));
                    assert_eq!(step_locked(path, i, &state), expected, "{:?} @ {}", completed, i);
                }
            }
        }

        #[test]
        fn mismatched_index_falls_back_to_position() {
            let (tracker, _, _) = setup();
            assert!(tracker.is_step_locked(&id(2), 0));
            assert!(!tracker.is_step_locked(&id(99), 1));
        }
    }

    mod toggle_tests {
        use super::*;

        #[test]
        fn worked_example() {
            let (mut tracker, _, _) = setup();
            let pct = |t: &LearningPathTracker| t.progress_summary().progress.percentage;

            assert_eq!(tracker.state().current_step, Some(id(1)));
            assert_eq!(pct(&tracker), 0);

            assert_eq!(tracker.toggle_step_completion(&id(1)), ToggleOutcome::Completed);
            assert_eq!(locks(&tracker), vec![false, false, true]);
            assert_eq!(tracker.state().current_step, Some(id(2)));
            assert_eq!(pct(&tracker), 33);

            assert_eq!(tracker.toggle_step_completion(&id(2)), ToggleOutcome::Completed);
            assert_eq!(locks(&tracker), vec![false, false, false]);
            assert_eq!(tracker.state().current_step, Some(id(3)));
            assert_eq!(pct(&tracker), 67);

            assert_eq!(tracker.toggle_step_completion(&id(3)), ToggleOutcome::Completed);
            assert_eq!(tracker.state().current_step, None);
            assert_eq!(pct(&tracker), 100);
        }

        #[test]
        fn locked_step_is_rejected_with_warning() {
            let (mut tracker, store, _) = setup();
            let before = store.raw();

            assert_eq!(tracker.toggle_step_completion(&id(3)), ToggleOutcome::Locked);
            assert!(tracker.state().completed_steps.is_empty());
            assert_eq!(store.raw(), before);

            let notes = tracker.drain_notifications();
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].level, NotificationLevel::Warning);
            assert!(notes[0].message.contains("Entities"));
        }

        #[test]
        fn toggle_twice_restores_original_state() {
            let (mut tracker, _, _) = setup();
            let original = tracker.state().completed_steps.clone();

            tracker.toggle_step_completion(&id(1));
            assert_eq!(tracker.state().completed_steps, vec![id(1)]);
            assert_eq!(
                tracker.toggle_step_completion(&id(1)),
                ToggleOutcome::Uncompleted
            );
            assert_eq!(tracker.state().completed_steps, original);
            assert_eq!(tracker.state().current_step, Some(id(1)));
            assert!(!tracker.is_step_locked(&id(1), 0));
        }

        #[test]
        fn completion_notification_only_on_completion() {
            let (mut tracker, _, _) = setup();
            tracker.toggle_step_completion(&id(1));
            let notes = tracker.drain_notifications();
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].level, NotificationLevel::Success);

            tracker.toggle_step_completion(&id(1));
            assert!(tracker.drain_notifications().is_empty());
        }

        #[test]
        fn last_activity_only_on_completion() {
            let (mut tracker, _, clock) = setup();
            tracker.toggle_step_completion(&id(1));
            assert_eq!(tracker.state().last_activity, Some(t0()));
            assert_eq!(tracker.state().start_date, Some(t0()));

            clock.advance(Duration::minutes(5));
            tracker.toggle_step_completion(&id(1));
            assert_eq!(tracker.state().last_activity, Some(t0()));
        }

        #[test]
        fn resolve_step_id_prefers_catalog_ids() {
            let catalog = PathCatalog::from_paths(vec![(
                "beginner".to_string(),
                PathDefinition {
                    name: "Beginner".to_string(),
                    steps: vec![StepDefinition::new("10", "Intro"), StepDefinition::new(11, "Values")],
                },
            )]);
            let mut tracker = LearningPathTracker::new(
                catalog,
                Box::new(MemoryStore::new()),
                Box::new(ManualClock::at(t0())),
            );

            assert_eq!(tracker.resolve_step_id("10"), StepId::Text("10".to_string()));
            assert_eq!(tracker.resolve_step_id(" 11 "), id(11));
            assert_eq!(tracker.resolve_step_id("42"), id(42));
            assert_eq!(tracker.resolve_step_id("intro"), StepId::Text("intro".to_string()));

            let step = tracker.resolve_step_id("10");
            assert_eq!(tracker.toggle_step_completion(&step), ToggleOutcome::Completed);
            assert!(tracker.state().is_completed(&StepId::Text("10".to_string())));
        }

        #[test]
        fn start_date_stamped_by_first_completion() {
            let (mut tracker, _, clock) = setup();
            assert_eq!(tracker.state().start_date, None);

            clock.advance(Duration::minutes(1));
            tracker.toggle_step_completion(&id(1));
            let started = t0() + Duration::minutes(1);
            assert_eq!(tracker.state().start_date, Some(started));

            clock.advance(Duration::minutes(5));
            tracker.toggle_step_completion(&id(2));
            assert_eq!(tracker.state().start_date, Some(started));

            tracker.reset_progress(true);
            assert_eq!(tracker.state().start_date, None);
        }

        #[test]
        fn step_from_another_path_is_ignored() {
            let (mut tracker, _, _) = setup();
            assert_eq!(
                tracker.toggle_step_completion(&id(4)),
                ToggleOutcome::NotInActivePath
            );
            assert!(tracker.state().completed_steps.is_empty());
            assert!(tracker.drain_notifications().is_empty());
        }

        #[test]
        fn toggle_persists() {
            let (mut tracker, store, _) = setup();
            tracker.toggle_step_completion(&id(1));
            assert!(store.raw().unwrap().contains("\"completedSteps\":[1]"));
        }
    }

    mod selection_tests {
        use super::*;

        #[test]
        fn select_switches_and_recomputes() {
            let (mut tracker, _, _) = setup();
            assert!(tracker.select_path("intermediate"));
            assert_eq!(tracker.state().current_path, "intermediate");
            assert_eq!(tracker.state().current_step, Some(id(4)));
            assert_eq!(tracker.state().total_steps, 2);
            assert_eq!(tracker.timeline().unwrap().path_id, "intermediate");
        }

        #[test]
        fn unknown_path_is_noop() {
            let (mut tracker, store, _) = setup();
            let before = store.raw();
            assert!(!tracker.select_path("wizard"));
            assert_eq!(tracker.state().current_path, "beginner");
            assert_eq!(store.raw(), before);
        }

        #[test]
        fn completions_survive_path_switch() {
            let (mut tracker, _, _) = setup();
            tracker.toggle_step_completion(&id(1));
            tracker.select_path("intermediate");
            tracker.select_path("beginner");
            assert_eq!(tracker.state().current_step, Some(id(2)));
        }

        #[test]
        fn empty_path_has_no_current_step() {
            let (mut tracker, _, _) = setup();
            tracker.select_path("empty");
            assert_eq!(tracker.state().current_step, None);
            assert_eq!(tracker.progress_summary().progress.percentage, 0);
        }

        #[test]
        fn badges_cover_whole_catalog() {
            let (mut tracker, _, _) = setup();
            tracker.select_path("intermediate");
            tracker.toggle_step_completion(&id(4));
            tracker.select_path("beginner");
            let badges = tracker.progress_summary().badges;
            assert_eq!(badges.len(), 4);
            assert_eq!(badges[1].percentage, 50);
            assert!(badges[0].active);
        }
    }

    mod assessment_tests {
        use super::*;

        fn answered(option: usize) -> Assessment {
            let mut quiz = Assessment::new(QUESTIONS);
            for q in 0..QUESTIONS.len() {
                quiz.answer(q, option).unwrap();
            }
            quiz
        }

        #[test]
        fn results_are_not_applied_automatically() {
            let (mut tracker, _, _) = setup();
            let result = tracker.submit_assessment(&answered(3)).unwrap();
            assert_eq!(result.recommendation, Recommendation::Expert);
            assert_eq!(tracker.state().current_path, "beginner");
            assert!(tracker.state().user_level.is_none());
        }

        #[test]
        fn applying_selects_path_and_records_level() {
            let (mut tracker, _, _) = setup();
            let result = tracker.submit_assessment(&answered(2)).unwrap();
            assert!(tracker.apply_recommendation(&result));
            assert_eq!(tracker.state().current_path, "intermediate");
            assert_eq!(
                tracker.state().user_level,
                Some(UserLevel::Named("intermediate".to_string()))
            );
        }

        #[test]
        fn incomplete_form_warns_and_changes_nothing() {
            let (mut tracker, _, _) = setup();
            let mut quiz = tracker.start_assessment();
            quiz.answer(0, 1).unwrap();
            let before = tracker.state().clone();

            assert!(tracker.submit_assessment(&quiz).is_err());
            assert_eq!(tracker.state(), &before);
            let notes = tracker.drain_notifications();
            assert_eq!(notes[0].level, NotificationLevel::Warning);
        }

        #[test]
        fn recommendation_missing_from_catalog_is_noop() {
            let catalog = PathCatalog::from_paths(vec![(
                "beginner".to_string(),
                PathDefinition {
                    name: "B".to_string(),
                    steps: vec![StepDefinition::new(1, "Intro")],
                },
            )]);
            let mut tracker = LearningPathTracker::new(
                catalog,
                Box::new(MemoryStore::new()),
                Box::new(ManualClock::at(t0())),
            );
            let result = tracker.submit_assessment(&answered(3)).unwrap();
            assert!(!tracker.apply_recommendation(&result));
            assert!(tracker.state().user_level.is_none());
        }

        #[test]
        fn custom_thresholds_are_used() {
            let (tracker, _, _) = setup();
            let mut tracker = tracker.with_thresholds(Thresholds {
                beginner_max: -1.0,
                intermediate_max: 0.0,
            });
            let result = tracker.submit_assessment(&answered(0)).unwrap();
            assert_eq!(result.recommendation, Recommendation::Intermediate);
        }
    }

    mod persistence_tests {
        use super::*;

        #[test]
        fn empty_storage_matches_fresh_instance() {
            let (tracker, _, _) = setup();
            let fresh = LearningPathTracker::new(
                example_catalog(),
                Box::new(MemoryStore::new()),
                Box::new(ManualClock::at(t0())),
            );
            assert_eq!(tracker.state(), fresh.state());
        }

        #[test]
        fn corrupt_storage_falls_back_to_defaults() {
            let store = MemoryStore::with_raw("{{{ definitely not json");
            let mut tracker = LearningPathTracker::new(
                example_catalog(),
                Box::new(store),
                Box::new(ManualClock::at(t0())),
            );
            assert!(!tracker.load_progress());
            assert_eq!(tracker.state().current_path, "beginner");
            assert_eq!(tracker.state().current_step, Some(id(1)));
        }

        #[test]
        fn unavailable_storage_does_not_prevent_startup() {
            let mut tracker = LearningPathTracker::open(
                example_catalog(),
                Box::new(MemoryStore::unavailable()),
                Box::new(ManualClock::at(t0())),
            );
            assert!(tracker.state().completed_steps.is_empty());
            assert!(!tracker.save_progress());
            assert_eq!(tracker.toggle_step_completion(&id(1)), ToggleOutcome::Completed);
        }

        #[test]
        fn round_trip_reproduces_state() {
            let (mut tracker, store, clock) = setup();
            tracker.select_path("intermediate");
            tracker.toggle_step_completion(&id(4));
            let result = tracker
                .submit_assessment(&{
                    let mut quiz = Assessment::new(QUESTIONS);
                    for q in 0..QUESTIONS.len() {
                        quiz.answer(q, 2).unwrap();
                    }
                    quiz
                })
                .unwrap();
            tracker.apply_recommendation(&result);
            tracker.save_progress();

            let reloaded = LearningPathTracker::open(
                example_catalog(),
                Box::new(store.clone()),
                Box::new(clock.clone()),
            );
            assert_eq!(reloaded.state(), tracker.state());
        }

        #[test]
        fn partial_blob_merges_onto_defaults() {
            let store = MemoryStore::with_raw(r#"{"progress":{"completedSteps":[1]}}"#);
            let tracker = LearningPathTracker::open(
                example_catalog(),
                Box::new(store),
                Box::new(ManualClock::at(t0())),
            );
            assert_eq!(tracker.state().current_path, "beginner");
            assert_eq!(tracker.state().completed_steps, vec![id(1)]);
            assert_eq!(tracker.state().current_step, Some(id(2)));
        }

        #[test]
        fn stale_current_step_is_recomputed() {
            let store = MemoryStore::with_raw(
                r#"{"currentPath":"beginner","progress":{"completedSteps":[1,2],"currentStep":1}}"#,
            );
            let tracker = LearningPathTracker::open(
                example_catalog(),
                Box::new(store),
                Box::new(ManualClock::at(t0())),
            );
            assert_eq!(tracker.state().current_step, Some(id(3)));
        }

        #[test]
        fn unknown_saved_path_falls_back() {
            let store = MemoryStore::with_raw(r#"{"currentPath":"retired"}"#);
            let tracker = LearningPathTracker::open(
                example_catalog(),
                Box::new(store),
                Box::new(ManualClock::at(t0())),
            );
            assert_eq!(tracker.state().current_path, "beginner");
        }

        #[test]
        fn reset_requires_confirmation() {
            let (mut tracker, _, _) = setup();
            tracker.toggle_step_completion(&id(1));
            assert!(!tracker.reset_progress(false));
            assert_eq!(tracker.state().completed_steps, vec![id(1)]);
        }

        #[test]
        fn reset_clears_progress_and_persists() {
            let (mut tracker, store, _) = setup();
            tracker.select_path("intermediate");
            tracker.toggle_step_completion(&id(4));
            tracker.toggle_step_completion(&id(5));

            assert!(tracker.reset_progress(true));
            assert!(tracker.state().completed_steps.is_empty());
            assert_eq!(tracker.state().current_path, "intermediate");
            assert_eq!(tracker.state().current_step, Some(id(4)));
            assert!(store.raw().unwrap().contains("\"completedSteps\":[]"));
        }

        #[test]
        fn export_writes_file() {
            let (mut tracker, _, _) = setup();
            tracker.toggle_step_completion(&id(1));
            let dir = tempfile::tempdir().unwrap();

            let path = tracker.export_progress(dir.path()).unwrap();
            let contents = std::fs::read_to_string(path).unwrap();
            assert!(contents.contains("\"version\": \"1.0\""));
            assert!(contents.contains("\"exportDate\""));
        }
    }

    mod autosave_tests {
        use super::*;

        #[test]
        fn tick_saves_on_interval() {
            let (mut tracker, store, clock) = setup();
            tracker.start_autosave();
            assert!(!tracker.tick());
            assert!(store.raw().is_none());

            clock.advance(Duration::seconds(30));
            assert!(tracker.tick());
            assert!(store.raw().is_some());
        }

        #[test]
        fn stopped_autosave_does_not_save() {
            let (mut tracker, store, clock) = setup();
            tracker.start_autosave();
            tracker.stop_autosave();
            clock.advance(Duration::minutes(5));
            assert!(!tracker.tick());
            assert!(store.raw().is_none());
        }

        #[test]
        fn custom_interval() {
            let (tracker, _, clock) = setup();
            let mut tracker = tracker.with_autosave_interval(Duration::seconds(5));
            tracker.start_autosave();
            clock.advance(Duration::seconds(5));
            assert!(tracker.tick());
        }
    }
}
