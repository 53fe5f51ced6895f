//! Interactive terminal walkthrough of a questionnaire session

use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

use crate::audio::AudioCapture;
use crate::config::ReportConfig;
use crate::intake::IntakeAssistant;
use crate::report::ReportExporter;
use crate::session::{QuestionnaireSession, SessionView};

const HELP: &str = "Type an answer and press Enter, or use a command:\n  \
:next  :prev  :voice  :show  :export [path]  :help  :quit";

const PROGRESS_WIDTH: usize = 30;

/// A line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(String),
    Next,
    Previous,
    Voice,
    Show,
    Export(Option<PathBuf>),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }

        let Some(rest) = line.strip_prefix(':') else {
            return Command::Answer(line.to_string());
        };

        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match name.as_str() {
            "next" | "n" => Command::Next,
            "prev" | "previous" | "p" => Command::Previous,
            "voice" | "v" => Command::Voice,
            "show" | "s" => Command::Show,
            "export" | "e" => Command::Export(arg.map(PathBuf::from)),
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => Command::Unknown(other.to_string()),
        }
    }
}

/// Terminal front end over one session
pub struct Console {
    session_id: String,
    session: QuestionnaireSession,
    assistant: Option<Arc<IntakeAssistant>>,
    capture: Option<Box<dyn AudioCapture>>,
    exporter: Arc<dyn ReportExporter>,
    report: ReportConfig,
}

impl Console {
    pub fn new(
        session: QuestionnaireSession,
        exporter: Arc<dyn ReportExporter>,
        report: ReportConfig,
    ) -> Self {
        Self {
            session_id: format!("console-{}", uuid::Uuid::new_v4()),
            session,
            assistant: None,
            capture: None,
            exporter,
            report,
        }
    }

    /// Enable `:voice` with the given collaborators
    pub fn with_voice(
        mut self,
        assistant: Arc<IntakeAssistant>,
        capture: Box<dyn AudioCapture>,
    ) -> Self {
        self.assistant = Some(assistant);
        self.capture = Some(capture);
        self
    }

    pub fn session(&self) -> &QuestionnaireSession {
        &self.session
    }

    pub fn into_session(self) -> QuestionnaireSession {
        self.session
    }

    /// Read commands until `:quit` or end of input
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        writeln!(out, "{}", self.report.title)?;
        writeln!(out, "{}", HELP)?;
        self.render(out)?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("Failed to read input")? {
            match Command::parse(&line) {
                Command::Quit => break,
                command => self.handle(command, out).await?,
            }
        }

        info!(
            "Console session {} ended ({}/{} answered)",
            self.session_id,
            self.session.answered_count(),
            self.session.len()
        );
        Ok(())
    }

    async fn handle<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::Answer(text) => {
                self.session.set_current_answer(text);
                if !self.session.advance() {
                    writeln!(
                        out,
                        "Last question answered. \
                         Type :export to save the report or :prev to review."
                    )?;
                }
            }
            Command::Next => {
                if !self.session.advance() {
                    writeln!(out, "Already at the last question.")?;
                }
            }
            Command::Previous => {
                if !self.session.retreat() {
                    writeln!(out, "Already at the first question.")?;
                }
            }
            Command::Voice => self.voice(out).await?,
            Command::Show => {
                for (index, entry) in self.session.snapshot().iter().enumerate() {
                    let marker = if index == self.session.cursor() { '>' } else { ' ' };
                    writeln!(out, "{} {}. {}", marker, index + 1, entry.line())?;
                }
                return Ok(());
            }
            Command::Export(path) => {
                self.export(path, out)?;
                return Ok(());
            }
            Command::Help | Command::Empty => {
                writeln!(out, "{}", HELP)?;
                return Ok(());
            }
            Command::Unknown(name) => {
                writeln!(out, "Unknown command ':{}'", name)?;
                writeln!(out, "{}", HELP)?;
                return Ok(());
            }
            Command::Quit => return Ok(()),
        }

        self.render(out)
    }

    async fn voice<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let (Some(assistant), Some(capture)) = (self.assistant.as_ref(), self.capture.as_mut())
        else {
            writeln!(out, "Voice input is not available; type the answer instead.")?;
            return Ok(());
        };

        writeln!(out, "Recording... speak now.")?;
        out.flush()?;

        match assistant
            .answer_by_voice(&self.session_id, &mut self.session, capture.as_mut())
            .await
        {
            Ok(outcome) => writeln!(out, "{}", outcome.message())?,
            Err(e) => {
                warn!("Voice answer failed: {:#}", e);
                writeln!(out, "Recording failed: {}", e)?;
            }
        }
        Ok(())
    }

    fn export<W: Write>(&self, path: Option<PathBuf>, out: &mut W) -> Result<()> {
        let path = path.unwrap_or_else(|| PathBuf::from(&self.report.file_name));

        let result = self
            .exporter
            .export(&self.report.title, &self.session.snapshot())
            .and_then(|bytes| {
                std::fs::write(&path, bytes)
                    .with_context(|| format!("Failed to write report to {}", path.display()))
            });

        match result {
            Ok(()) => {
                info!("Report written to {}", path.display());
                writeln!(out, "Report saved to {}", path.display())?;
            }
            Err(e) => {
                warn!("Report export failed: {:#}", e);
                writeln!(out, "Export failed: {:#}", e)?;
            }
        }
        Ok(())
    }

    fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        let view = SessionView::render(&self.session);

        writeln!(out)?;
        writeln!(out, "{}", view.progress_bar(PROGRESS_WIDTH))?;
        writeln!(out, "{} ({})", view.current.label, view.current.kind)?;
        if !view.current.answer.is_empty() {
            writeln!(out, "  current answer: {}", view.current.answer)?;
        }
        write!(out, "> ")?;
        out.flush()?;
        Ok(())
    }
}
