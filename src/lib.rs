pub mod audio;
pub mod config;
pub mod console;
pub mod extraction;
pub mod http;
pub mod intake;
pub mod llm;
pub mod report;
pub mod session;
pub mod transcription;

pub use audio::{
    AudioCapture, AudioCaptureFactory, AudioClip, AudioFile, CaptureConfig, CaptureSource,
    ClipArchive, FileCapture,
};
pub use config::Config;
pub use console::{Command, Console};
pub use extraction::{AnswerExtractor, LlmExtractor};
pub use http::{create_router, AppState};
pub use intake::{AssistantOptions, IntakeAssistant, VoiceOutcome};
pub use llm::ChatClient;
pub use report::{PdfReportExporter, ReportExporter};
pub use session::{
    medical_intake_questions, Question, QuestionKind, QuestionnaireSession, SessionView,
    SnapshotEntry,
};
pub use transcription::{ApiTranscriber, Transcriber};
