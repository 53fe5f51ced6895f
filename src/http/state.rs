use crate::audio::CaptureConfig;
use crate::config::ReportConfig;
use crate::intake::IntakeAssistant;
use crate::report::{PdfReportExporter, ReportExporter};
use crate::session::{Question, QuestionnaireSession};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Active questionnaire sessions (session_id → session)
    pub sessions: Arc<RwLock<HashMap<String, QuestionnaireSession>>>,

    /// Questions every new session starts with
    pub questions: Arc<Vec<Question>>,

    /// Speech and extraction collaborators; voice answers are refused without them
    pub assistant: Option<Arc<IntakeAssistant>>,

    pub exporter: Arc<dyn ReportExporter>,

    pub report: ReportConfig,

    /// Target format for uploaded answer recordings
    pub capture: CaptureConfig,
}

impl AppState {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            questions: Arc::new(questions),
            assistant: None,
            exporter: Arc::new(PdfReportExporter::new()),
            report: ReportConfig::default(),
            capture: CaptureConfig::default(),
        }
    }

    pub fn with_assistant(mut self, assistant: Arc<IntakeAssistant>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    pub fn with_report(mut self, report: ReportConfig) -> Self {
        self.report = report;
        self
    }

    pub fn with_exporter(mut self, exporter: Arc<dyn ReportExporter>) -> Self {
        self.exporter = exporter;
        self
    }

    pub fn with_capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(crate::session::medical_intake_questions())
    }
}
