use super::question::{Question, QuestionKind};
use super::session::QuestionnaireSession;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Display state of a single question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub label: String,
    pub kind: QuestionKind,
    pub answer: String,
    pub is_current: bool,
}

/// Everything a front end needs to draw the questionnaire
///
/// Built from scratch after every mutation; holds no state of its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// Index of the question being asked
    pub cursor: usize,

    /// Total number of questions
    pub total: usize,

    /// Progress in `0.0..=1.0`, `(cursor + 1) / total`
    pub progress: f32,

    /// Number of questions with a non-empty answer
    pub answered: usize,

    /// Whether "Previous" is available
    pub can_retreat: bool,

    /// Whether "Next" is available
    pub can_advance: bool,

    /// The question currently presented
    pub current: QuestionView,

    /// All questions in order, with answers
    pub questions: Vec<QuestionView>,

    pub started_at: DateTime<Utc>,
}

impl SessionView {
    pub fn render(session: &QuestionnaireSession) -> Self {
        let questions: Vec<QuestionView> = session
            .questions()
            .iter()
            .enumerate()
            .map(|(index, question)| question_view(session, index, question))
            .collect();

        Self {
            cursor: session.cursor(),
            total: session.len(),
            progress: session.progress(),
            answered: session.answered_count(),
            can_retreat: !session.is_first(),
            can_advance: !session.is_last(),
            current: questions[session.cursor()].clone(),
            questions,
            started_at: session.started_at(),
        }
    }

    /// Text progress bar, e.g. `[3/9] ######-------------- 33%`
    pub fn progress_bar(&self, width: usize) -> String {
        let filled = ((self.progress * width as f32).round() as usize).min(width);
        format!(
            "[{}/{}] {}{} {:.0}%",
            self.cursor + 1,
            self.total,
            "#".repeat(filled),
            "-".repeat(width - filled),
            self.progress * 100.0
        )
    }
}

fn question_view(
    session: &QuestionnaireSession,
    index: usize,
    question: &Question,
) -> QuestionView {
    QuestionView {
        index,
        label: question.label.clone(),
        kind: question.kind,
        answer: session.answer(&question.label).unwrap_or_default().to_string(),
        is_current: index == session.cursor(),
    }
}
