mod ui;
pub mod widgets;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::debug;

use crate::assessment::{Assessment, AssessmentResult};
use crate::notify::{Notification, NotificationLevel, Toasts};
use crate::tracker::LearningPathTracker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Timeline,
    Assessment,
    Results,
    ConfirmReset,
}

pub struct App {
    tracker: LearningPathTracker,
    export_dir: PathBuf,
    pub mode: Mode,
    pub selected_step: usize,
    pub assessment: Option<Assessment>,
    pub option_cursor: usize,
    pub results: Option<AssessmentResult>,
    pub toasts: Toasts,
    pub should_quit: bool,
}

impl App {
    pub fn new(tracker: LearningPathTracker, export_dir: PathBuf) -> Self {
        let mut app = Self {
            tracker,
            export_dir,
            mode: Mode::Timeline,
            selected_step: 0,
            assessment: None,
            option_cursor: 0,
            results: None,
            toasts: Toasts::default(),
            should_quit: false,
        };
        app.focus_current_step();
        app
    }

    pub fn tracker(&self) -> &LearningPathTracker {
        &self.tracker
    }

    fn step_count(&self) -> usize {
        self.tracker
            .active_path()
            .map(|p| p.steps.len())
            .unwrap_or(0)
    }

    fn focus_current_step(&mut self) {
        let current = self.tracker.state().current_step.clone();
        self.selected_step = match (self.tracker.active_path(), current) {
            (Some(path), Some(id)) => path.position(&id).unwrap_or(0),
            (Some(path), None) => path.steps.len().saturating_sub(1),
            _ => 0,
        };
    }

    /// Moves notifications from the tracker to the toast list and expires old ones.
    fn collect_notifications(&mut self) {
        let fresh = self.tracker.drain_notifications();
        self.toasts.extend(fresh);
        self.toasts.expire(chrono::Utc::now());
    }

    fn switch_path(&mut self, forward: bool) {
        let ids: Vec<String> = self
            .tracker
            .catalog()
            .path_ids()
            .into_iter()
            .map(String::from)
            .collect();
        if ids.is_empty() {
            return;
        }
        let current = ids
            .iter()
            .position(|id| *id == self.tracker.state().current_path)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % ids.len()
        } else {
            (current + ids.len() - 1) % ids.len()
        };
        self.tracker.select_path(&ids[next]);
        self.focus_current_step();
    }

    fn toggle_selected(&mut self) {
        let step_id = self
            .tracker
            .active_path()
            .and_then(|p| p.steps.get(self.selected_step))
            .map(|s| s.id.clone());
        if let Some(id) = step_id {
            let outcome = self.tracker.toggle_step_completion(&id);
            debug!(step = %id, ?outcome, "toggled from tui");
        }
    }

    fn start_assessment(&mut self) {
        self.assessment = Some(self.tracker.start_assessment());
        self.option_cursor = 0;
        self.mode = Mode::Assessment;
    }

    pub fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match self.mode {
            Mode::Timeline => self.handle_timeline_key(key, modifiers),
            Mode::Assessment => self.handle_assessment_key(key),
            Mode::Results => self.handle_results_key(key),
            Mode::ConfirmReset => self.handle_confirm_key(key),
        }
        self.collect_notifications();
    }

    fn handle_timeline_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.tracker.save_progress();
            }

            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => self.switch_path(false),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => self.switch_path(true),

            KeyCode::Char('j') | KeyCode::Down => {
                let count = self.step_count();
                if count > 0 {
                    self.selected_step = (self.selected_step + 1).min(count - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_step = self.selected_step.saturating_sub(1);
            }
            KeyCode::Char('g') => self.selected_step = 0,
            KeyCode::Char('G') => self.selected_step = self.step_count().saturating_sub(1),
            KeyCode::Char('c') => self.focus_current_step(),

            KeyCode::Char(' ') | KeyCode::Enter => self.toggle_selected(),

            KeyCode::Char('a') => self.start_assessment(),
            KeyCode::Char('r') => self.mode = Mode::ConfirmReset,
            KeyCode::Char('e') => {
                let dir = self.export_dir.clone();
                // failures surface as a toast
                if let Err(e) = self.tracker.export_progress(&dir) {
                    self.toasts.extend([Notification::new(
                        NotificationLevel::Warning,
                        e.to_string(),
                        chrono::Utc::now(),
                    )]);
                }
            }

            _ => {}
        }
    }

    fn handle_assessment_key(&mut self, key: KeyCode) {
        let Some(quiz) = self.assessment.as_mut() else {
            self.mode = Mode::Timeline;
            return;
        };
        let option_count = quiz.current_question().map(|q| q.options.len()).unwrap_or(0);

        match key {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.assessment = None;
                self.mode = Mode::Timeline;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if option_count > 0 {
                    self.option_cursor = (self.option_cursor + 1).min(option_count - 1);
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.option_cursor = self.option_cursor.saturating_sub(1);
            }
            KeyCode::Char('h') | KeyCode::Left => {
                quiz.previous_question();
                self.option_cursor = quiz.answers()[quiz.current_index()].unwrap_or(0);
            }
            KeyCode::Char(' ') => {
                let question = quiz.current_index();
                let _ = quiz.answer(question, self.option_cursor);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                quiz.next_question();
                self.option_cursor = quiz.answers()[quiz.current_index()].unwrap_or(0);
            }
            KeyCode::Enter => {
                let question = quiz.current_index();
                let _ = quiz.answer(question, self.option_cursor);
                if quiz.is_last_question() {
                    self.submit_assessment();
                } else {
                    quiz.next_question();
                    self.option_cursor = quiz.answers()[quiz.current_index()].unwrap_or(0);
                }
            }
            _ => {}
        }
    }

    fn submit_assessment(&mut self) {
        let Some(quiz) = self.assessment.as_ref() else {
            return;
        };
        // an incomplete form stays open; the tracker already queued a warning
        if let Ok(result) = self.tracker.submit_assessment(quiz) {
            self.results = Some(result);
            self.assessment = None;
            self.mode = Mode::Results;
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('y') | KeyCode::Enter => {
                if let Some(result) = self.results.take() {
                    self.tracker.apply_recommendation(&result);
                    self.focus_current_step();
                }
                self.mode = Mode::Timeline;
            }
            KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => {
                self.results = None;
                self.mode = Mode::Timeline;
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyCode) {
        if key == KeyCode::Char('y') {
            self.tracker.reset_progress(true);
            self.focus_current_step();
        }
        self.mode = Mode::Timeline;
    }
}

pub fn run(tracker: LearningPathTracker, export_dir: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(tracker, export_dir);
    app.tracker.start_autosave();

    let result = run_app(&mut terminal, &mut app);

    app.tracker.stop_autosave();
    app.tracker.save_progress();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key.code, key.modifiers);
                }
            }
        }

        app.tracker.tick();
        app.collect_notifications();

        if app.should_quit {
            return Ok(());
        }
    }
}
