use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("saved progress is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog must be a JSON object keyed by path id")]
    NotAnObject,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssessmentError {
    #[error("please answer every question (missing: {})", format_questions(.missing))]
    Incomplete { missing: Vec<usize> },

    #[error("question {question} has no option {option}")]
    InvalidOption { question: usize, option: usize },

    #[error("expected {expected} answers, got {actual}")]
    AnswerCount { expected: usize, actual: usize },
}

fn format_questions(missing: &[usize]) -> String {
    missing
        .iter()
        .map(|q| (q + 1).to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}
