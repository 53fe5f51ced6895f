use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared answer type of a question
///
/// The kind is a hint for answer extraction and display. Answers are stored as
/// raw text regardless of kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Text,
    Number,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Text => "text",
            QuestionKind::Number => "number",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single questionnaire entry, identified by its label
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Question {
    /// Label shown to the user and used as the answer key (unique per session)
    pub label: String,

    /// Declared answer type
    pub kind: QuestionKind,
}

impl Question {
    pub fn new(label: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    pub fn text(label: impl Into<String>) -> Self {
        Self::new(label, QuestionKind::Text)
    }

    pub fn number(label: impl Into<String>) -> Self {
        Self::new(label, QuestionKind::Number)
    }
}

/// The nine intake questions, in the order they are asked
pub fn medical_intake_questions() -> Vec<Question> {
    vec![
        Question::text("Name"),
        Question::number("Age"),
        Question::text("Address"),
        Question::number("Contact number"),
        Question::text("Occupation"),
        Question::text("Socioeconomic status"),
        Question::text("Nearest health center"),
        Question::number("Time taken to reach health center"),
        Question::text("Means of transport to health center"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn intake_questions_have_unique_labels() {
        let questions = medical_intake_questions();
        assert_eq!(questions.len(), 9);

        let labels: HashSet<_> = questions.iter().map(|q| q.label.as_str()).collect();
        assert_eq!(labels.len(), questions.len());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&Question::number("Age")).unwrap();
        assert_eq!(json, r#"{"label":"Age","kind":"number"}"#);
    }
}
