mod assessment;
mod autosave;
mod catalog;
mod config;
mod error;
mod export;
mod models;
mod notify;
mod progress;
mod storage;
mod timeline;
mod tracker;
mod tui;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use assessment::{Assessment, AssessmentResult};
use autosave::SystemClock;
use catalog::PathCatalog;
use config::Config;
use error::AssessmentError;
use models::{JsonOutput, StepId};
use storage::SqliteStore;
use tracker::{LearningPathTracker, ToggleOutcome};
use tui::widgets::truncate;

#[derive(Parser)]
#[command(name = "waypath")]
#[command(about = "Track your progress through Domain-Driven Design learning paths")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List learning paths with their completion
    Paths,

    /// Show the step timeline of a path
    Show {
        /// Path ID (defaults to the active path)
        path: Option<String>,
    },

    /// Make a path the active one
    Select {
        /// Path ID
        path: String,
    },

    /// Toggle completion of a step in the active path
    Toggle {
        /// Step ID
        step: String,
    },

    /// Show progress on the active path
    Progress,

    /// Take the level assessment quiz
    Assess {
        /// Comma-separated option numbers, one per question (1-based)
        #[arg(long, short)]
        answers: Option<String>,

        /// Switch to the recommended path without asking
        #[arg(long)]
        apply: bool,
    },

    /// Clear all completed steps
    Reset {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Write progress to a timestamped JSON file
    Export {
        /// Target directory (defaults to WAYPATH_EXPORT_DIR or .)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Launch interactive terminal UI
    Tui,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("waypath=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn open_tracker(config: &Config) -> Result<LearningPathTracker, Box<dyn std::error::Error>> {
    let catalog = match &config.catalog_path {
        Some(path) => PathCatalog::load(path)?,
        None => PathCatalog::builtin()?,
    };
    if catalog.is_empty() {
        warn!("catalog has no learning paths");
    }
    debug!(db = %config.db_path.display(), paths = catalog.len(), "opening tracker");

    let store = SqliteStore::open(&config.db_path)?;
    let tracker = LearningPathTracker::open(catalog, Box::new(store), Box::new(SystemClock))
        .with_thresholds(config.thresholds)
        .with_autosave_interval(config.autosave_interval);
    Ok(tracker)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    let mut tracker = open_tracker(&config)?;

    match cli.command {
        Commands::Paths => {
            let summary = tracker.progress_summary();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&summary.badges))?);
            } else {
                println!("{:<3}{:<16} {:<30} DONE", "", "ID", "NAME");
                println!("{}", "-".repeat(56));
                for badge in &summary.badges {
                    let marker = if badge.active { "*" } else { "" };
                    println!(
                        "{:<3}{:<16} {:<30} {}%",
                        marker,
                        badge.path_id,
                        truncate(&badge.name, 28),
                        badge.percentage
                    );
                }
            }
        }

        Commands::Show { path } => {
            let timeline = match &path {
                Some(id) => tracker.timeline_for(id),
                None => tracker.timeline(),
            };
            match timeline {
                Some(timeline) if cli.json => {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&timeline))?);
                }
                Some(timeline) => {
                    println!("=== {} ===", timeline.path_name);
                    println!();
                    for entry in &timeline.entries {
                        let current = if entry.is_current { ">" } else { " " };
                        println!(
                            "{} {} {:<6} {:<40} {:<10} {}",
                            current,
                            entry.marker.icon(),
                            entry.id.to_string(),
                            truncate(&entry.title, 38),
                            entry.duration,
                            entry.difficulty.as_deref().unwrap_or("-")
                        );
                        if let Some(line) = entry.prerequisites_line() {
                            println!("           {}", line);
                        }
                    }
                }
                None if cli.json => {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::<()>::err("Path not found"))?
                    );
                }
                None => println!("Path not found."),
            }
        }

        Commands::Select { path } => {
            if tracker.select_path(&path) {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                } else {
                    println!("Active path: {}", tracker.progress_summary().path_name);
                }
            } else if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::<()>::err("Path not found"))?
                );
            } else {
                println!(
                    "Unknown path '{}'. Available: {}",
                    path,
                    tracker.catalog().path_ids().join(", ")
                );
            }
        }

        Commands::Toggle { step } => {
            let step_id = tracker.resolve_step_id(&step);
            let outcome = tracker.toggle_step_completion(&step_id);
            if cli.json {
                let payload = toggle_payload(&mut tracker, &step_id, outcome);
                println!("{}", serde_json::to_string(&JsonOutput::ok(payload))?);
            } else {
                match outcome {
                    ToggleOutcome::Uncompleted => println!("Step {} marked incomplete.", step_id),
                    ToggleOutcome::NotInActivePath => {
                        println!("Step {} is not part of the active path.", step_id)
                    }
                    ToggleOutcome::Completed | ToggleOutcome::Locked => {}
                }
                print_notifications(&mut tracker);
                if outcome == ToggleOutcome::Completed {
                    println!("{}", tracker.progress_summary().message);
                }
            }
        }

        Commands::Progress => {
            let summary = tracker.progress_summary();
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&summary))?);
            } else {
                println!("=== {} ===", summary.path_name);
                println!("{}", progress_bar(summary.bar_width(), 30));
                println!("{}", summary.label);
                println!("{}", summary.message);
                if let Some(current) = &tracker.state().current_step {
                    if let Some((_, _, step)) = tracker.catalog().find_step(current) {
                        println!("Next up: {} ({})", step.title, step.id);
                    }
                }
            }
        }

        Commands::Assess { answers, apply } => {
            let mut quiz = tracker.start_assessment();
            match answers {
                Some(raw) => fill_answers(&mut quiz, &raw)?,
                None => ask_questions(&mut quiz)?,
            }

            let result = match tracker.submit_assessment(&quiz) {
                Ok(result) => result,
                Err(e) if cli.json => {
                    let output = JsonOutput {
                        success: false,
                        data: Some(serde_json::json!({
                            "notifications": tracker.drain_notifications()
                        })),
                        error: Some(e.to_string()),
                    };
                    println!("{}", serde_json::to_string(&output)?);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            let applied = if apply || (!cli.json && confirm(&recommendation_prompt(&result))?) {
                tracker.apply_recommendation(&result)
            } else {
                false
            };

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "result": result,
                        "applied": applied,
                        "notifications": tracker.drain_notifications()
                    })))?
                );
            } else {
                println!("Average score: {:.2}", result.average_score);
                println!("Recommended path: {}", result.recommendation.label());
                print_notifications(&mut tracker);
            }
        }

        Commands::Reset { yes } => {
            let confirmed = yes
                || (!cli.json && confirm("Reset all progress? This cannot be undone. [y/N] ")?);
            let reset = tracker.reset_progress(confirmed);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({ "reset": reset })))?
                );
            } else if reset {
                print_notifications(&mut tracker);
            } else {
                println!("Reset cancelled.");
            }
        }

        Commands::Export { out } => {
            let dir = out.unwrap_or_else(|| config.export_dir.clone());
            let path = tracker.export_progress(&dir)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "file": path.display().to_string()
                    })))?
                );
            } else {
                println!("Progress exported to {}", path.display());
            }
        }

        Commands::Tui => {
            tui::run(tracker, config.export_dir)?;
        }
    }

    Ok(())
}

fn toggle_payload(
    tracker: &mut LearningPathTracker,
    step_id: &StepId,
    outcome: ToggleOutcome,
) -> serde_json::Value {
    serde_json::json!({
        "step": step_id,
        "outcome": outcome,
        "progress": tracker.progress_summary().progress,
        "notifications": tracker.drain_notifications()
    })
}

fn print_notifications(tracker: &mut LearningPathTracker) {
    for notification in tracker.drain_notifications() {
        println!("[{}] {}", notification.level.label(), notification.message);
    }
}

fn progress_bar(percent: u8, width: usize) -> String {
    let filled = usize::from(percent.min(100)) * width / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn recommendation_prompt(result: &AssessmentResult) -> String {
    format!(
        "Switch to the {} path? [y/N] ",
        result.recommendation.label()
    )
}

/// Answers are 1-based option numbers, in question order.
fn fill_answers(quiz: &mut Assessment, raw: &str) -> Result<(), AssessmentError> {
    let picks: Vec<&str> = raw.split(',').map(str::trim).collect();
    if picks.len() != quiz.questions().len() {
        return Err(AssessmentError::AnswerCount {
            expected: quiz.questions().len(),
            actual: picks.len(),
        });
    }

    for (question, pick) in picks.into_iter().enumerate() {
        let option = pick
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .unwrap_or(usize::MAX);
        quiz.answer(question, option)?;
    }
    Ok(())
}

fn ask_questions(quiz: &mut Assessment) -> io::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    for (index, question) in quiz.questions().iter().enumerate() {
        println!();
        println!("{}. {}", index + 1, question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            println!("   {}) {}", i + 1, option.label);
        }

        loop {
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                // stdin closed; leave the rest unanswered
                return Ok(());
            };
            let choice = line?.trim().parse::<usize>().ok().and_then(|n| n.checked_sub(1));
            match choice {
                Some(option) if quiz.answer(index, option).is_ok() => break,
                _ => println!("Pick a number between 1 and {}.", question.options.len()),
            }
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}
