use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOption {
    pub label: &'static str,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub prompt: &'static str,
    pub options: &'static [AnswerOption],
}

pub const QUESTIONS: &[Question] = &[
    Question {
        prompt: "How familiar are you with Domain-Driven Design?",
        options: &[
            AnswerOption {
                label: "I have never heard of it",
                weight: 0,
            },
            AnswerOption {
                label: "I know the basic terms",
                weight: 1,
            },
            AnswerOption {
                label: "I have applied some patterns in a project",
                weight: 2,
            },
            AnswerOption {
                label: "I use it regularly and teach it to others",
                weight: 3,
            },
        ],
    },
    Question {
        prompt: "Have you modeled aggregates and their consistency boundaries?",
        options: &[
            AnswerOption {
                label: "No",
                weight: 0,
            },
            AnswerOption {
                label: "I have read about them",
                weight: 1,
            },
            AnswerOption {
                label: "Yes, in one or two services",
                weight: 2,
            },
            AnswerOption {
                label: "Yes, across several bounded contexts",
                weight: 3,
            },
        ],
    },
    Question {
        prompt: "What is your experience with event-driven designs (events, CQRS, sagas)?",
        options: &[
            AnswerOption {
                label: "None",
                weight: 0,
            },
            AnswerOption {
                label: "I have published or consumed events",
                weight: 1,
            },
            AnswerOption {
                label: "I have separated commands from queries",
                weight: 2,
            },
            AnswerOption {
                label: "I have built event-sourced systems",
                weight: 3,
            },
        ],
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Beginner,
    Intermediate,
    Expert,
}

impl Recommendation {
    /// Catalog path this recommendation points at.
    pub fn path_id(&self) -> &'static str {
        match self {
            Recommendation::Beginner => "beginner",
            Recommendation::Intermediate => "intermediate",
            Recommendation::Expert => "expert",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Recommendation::Beginner => "Beginner",
            Recommendation::Intermediate => "Intermediate",
            Recommendation::Expert => "Expert",
        }
    }
}

/// Upper bounds (inclusive) on the average score for each recommendation.
/// Tied to the option weights in `QUESTIONS`; change them together.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub beginner_max: f64,
    pub intermediate_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            beginner_max: 1.0,
            intermediate_max: 2.5,
        }
    }
}

impl Thresholds {
    pub fn recommend(&self, average_score: f64) -> Recommendation {
        if average_score <= self.beginner_max {
            Recommendation::Beginner
        } else if average_score <= self.intermediate_max {
            Recommendation::Intermediate
        } else {
            Recommendation::Expert
        }
    }
}

// Parsed from "beginner_max,intermediate_max", e.g. "1,2.5"
impl FromStr for Thresholds {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [beginner, intermediate] = parts.as_slice() else {
            return Err(format!("expected two comma-separated numbers, got '{}'", s));
        };
        let beginner_max: f64 = beginner
            .parse()
            .map_err(|_| format!("invalid number '{}'", beginner))?;
        let intermediate_max: f64 = intermediate
            .parse()
            .map_err(|_| format!("invalid number '{}'", intermediate))?;
        if beginner_max > intermediate_max {
            return Err(format!(
                "beginner threshold {} is above intermediate threshold {}",
                beginner_max, intermediate_max
            ));
        }
        Ok(Self {
            beginner_max,
            intermediate_max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub total_score: u32,
    pub average_score: f64,
    pub recommendation: Recommendation,
}

/// Requires exactly one valid answer per question.
pub fn calculate_results(
    questions: &[Question],
    answers: &[Option<usize>],
    thresholds: &Thresholds,
) -> Result<AssessmentResult, AssessmentError> {
    if answers.len() != questions.len() {
        return Err(AssessmentError::AnswerCount {
            expected: questions.len(),
            actual: answers.len(),
        });
    }

    let missing: Vec<usize> = answers
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_none())
        .map(|(i, _)| i)
        .collect();
    if !missing.is_empty() {
        return Err(AssessmentError::Incomplete { missing });
    }

    let mut total_score = 0;
    for (question_index, (question, answer)) in questions.iter().zip(answers).enumerate() {
        let option = answer.unwrap_or_default();
        let chosen = question
            .options
            .get(option)
            .ok_or(AssessmentError::InvalidOption {
                question: question_index,
                option,
            })?;
        total_score += chosen.weight;
    }

    let average_score = if questions.is_empty() {
        0.0
    } else {
        total_score as f64 / questions.len() as f64
    };

    Ok(AssessmentResult {
        total_score,
        average_score,
        recommendation: thresholds.recommend(average_score),
    })
}

/// A quiz in progress: one slot per question, filled as the user answers.
#[derive(Debug, Clone)]
pub struct Assessment {
    questions: &'static [Question],
    answers: Vec<Option<usize>>,
    current: usize,
}

impl Assessment {
    pub fn new(questions: &'static [Question]) -> Self {
        Self {
            questions,
            answers: vec![None; questions.len()],
            current: 0,
        }
    }

    pub fn questions(&self) -> &'static [Question] {
        self.questions
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        self.questions.get(self.current)
    }

    pub fn answer(&mut self, question: usize, option: usize) -> Result<(), AssessmentError> {
        let valid = self
            .questions
            .get(question)
            .map(|q| option < q.options.len())
            .unwrap_or(false);
        if !valid {
            return Err(AssessmentError::InvalidOption { question, option });
        }
        self.answers[question] = Some(option);
        Ok(())
    }

    pub fn next_question(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    pub fn previous_question(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn is_complete(&self) -> bool {
        self.answers.iter().all(Option::is_some)
    }

    pub fn calculate_results(
        &self,
        thresholds: &Thresholds,
    ) -> Result<AssessmentResult, AssessmentError> {
        calculate_results(self.questions, &self.answers, thresholds)
    }
}
