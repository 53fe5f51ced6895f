use super::question::Question;
use anyhow::{ensure, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// One row of the export snapshot: a question and its answer ("" if unanswered)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub question: Question,
    pub answer: String,
}

impl SnapshotEntry {
    /// Report line in the form `<label>: <answer>`
    pub fn line(&self) -> String {
        format!("{}: {}", self.question.label, self.answer)
    }
}

/// In-memory state of one user's pass through the questionnaire
///
/// Holds the fixed question list, the cursor into it and the collected answers.
/// The cursor always points at a valid question.
#[derive(Debug, Clone)]
pub struct QuestionnaireSession {
    /// Ordered questions, fixed at creation
    questions: Vec<Question>,

    /// Index of the question currently presented
    cursor: usize,

    /// Answers keyed by question label
    answers: HashMap<String, String>,

    /// When the session was created
    started_at: DateTime<Utc>,
}

impl QuestionnaireSession {
    /// Create a session positioned at the first question
    ///
    /// Fails if `questions` is empty or contains duplicate labels.
    pub fn new(questions: Vec<Question>) -> Result<Self> {
        ensure!(
            !questions.is_empty(),
            "A questionnaire needs at least one question"
        );

        let mut seen = HashSet::new();
        for question in &questions {
            ensure!(
                seen.insert(question.label.as_str()),
                "Duplicate question label: {}",
                question.label
            );
        }

        Ok(Self {
            questions,
            cursor: 0,
            answers: HashMap::new(),
            started_at: Utc::now(),
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; a session cannot be built without questions
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_first(&self) -> bool {
        self.cursor == 0
    }

    pub fn is_last(&self) -> bool {
        self.cursor + 1 == self.questions.len()
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.cursor]
    }

    /// Look up a question by label
    pub fn question(&self, label: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.label == label)
    }

    /// Store `value` under `label`, replacing any previous answer
    ///
    /// The value is not checked against the question kind. Labels that match no
    /// question are kept but never appear in the snapshot.
    pub fn set_answer(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        debug!("Answer set for '{}' ({} chars)", label, value.len());
        self.answers.insert(label, value);
    }

    /// Store `value` as the answer to the current question
    pub fn set_current_answer(&mut self, value: impl Into<String>) {
        let label = self.current_question().label.clone();
        self.set_answer(label, value);
    }

    pub fn answer(&self, label: &str) -> Option<&str> {
        self.answers.get(label).map(String::as_str)
    }

    /// Number of questions with a non-empty answer
    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| self.answer(&q.label).is_some_and(|a| !a.is_empty()))
            .count()
    }

    /// Move to the next question; false if already at the last one
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.questions.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Move to the previous question; false if already at the first one
    pub fn retreat(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Fraction of the questionnaire reached, `(cursor + 1) / total`
    pub fn progress(&self) -> f32 {
        (self.cursor + 1) as f32 / self.questions.len() as f32
    }

    /// Every question in order, zipped with its answer or an empty string
    pub fn snapshot(&self) -> Vec<SnapshotEntry> {
        self.questions
            .iter()
            .map(|question| SnapshotEntry {
                question: question.clone(),
                answer: self.answer(&question.label).unwrap_or_default().to_string(),
            })
            .collect()
    }
}
