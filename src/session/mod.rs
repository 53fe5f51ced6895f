//! Questionnaire session management
//!
//! This module provides the `QuestionnaireSession` state machine:
//! - Ordered, fixed question definitions
//! - A cursor moved by Previous/Next navigation
//! - Answers keyed by question label
//! - The ordered snapshot used for report export
//! - A pure display model rendered after every mutation

mod question;
mod session;
mod view;

pub use question::{medical_intake_questions, Question, QuestionKind};
pub use session::{QuestionnaireSession, SnapshotEntry};
pub use view::{QuestionView, SessionView};
