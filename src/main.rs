use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use medical_intake::{
    create_router, medical_intake_questions, AppState, AudioCaptureFactory, CaptureSource, Config,
    Console, IntakeAssistant, PdfReportExporter, QuestionnaireSession,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "medical-intake", version, about = "Step-by-step medical intake questionnaire")]
struct Args {
    /// Config file path without extension
    #[arg(short, long, default_value = "config/medical-intake")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the questionnaire HTTP API
    Serve,

    /// Walk through the questionnaire in the terminal
    Interactive {
        /// Disable voice answers
        #[arg(long)]
        text_only: bool,

        /// Use a WAV file instead of the microphone for voice answers
        #[arg(long)]
        audio_file: Option<PathBuf>,
    },

    /// Print the questions
    Questions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Commands::Serve => {
            tracing_subscriber::fmt::init();
            let cfg = Config::load(&args.config)?;
            serve(cfg).await
        }
        Commands::Interactive {
            text_only,
            audio_file,
        } => {
            // Keep stdout for the prompt
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            let cfg = Config::load(&args.config)?;
            interactive(cfg, text_only, audio_file).await
        }
        Commands::Questions => {
            for (index, question) in medical_intake_questions().iter().enumerate() {
                println!("{}. {} ({})", index + 1, question.label, question.kind);
            }
            Ok(())
        }
    }
}

async fn serve(cfg: Config) -> Result<()> {
    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let assistant = IntakeAssistant::from_config(&cfg).context("Failed to set up voice answers")?;
    let exporter = PdfReportExporter::from_config(&cfg.report)?;
    let state = AppState::new(medical_intake_questions())
        .with_assistant(Arc::new(assistant))
        .with_exporter(Arc::new(exporter))
        .with_report(cfg.report.clone())
        .with_capture(cfg.audio.capture_config());

    let app = create_router(state);
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutting down");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn interactive(cfg: Config, text_only: bool, audio_file: Option<PathBuf>) -> Result<()> {
    let session = QuestionnaireSession::new(medical_intake_questions())?;
    let exporter = PdfReportExporter::from_config(&cfg.report)?;
    let mut console = Console::new(session, Arc::new(exporter), cfg.report.clone());

    if !text_only {
        let source = match audio_file {
            Some(path) => CaptureSource::File(path),
            None => CaptureSource::Microphone,
        };

        match AudioCaptureFactory::create(source, cfg.audio.capture_config()) {
            Ok(capture) => {
                let assistant = IntakeAssistant::from_config(&cfg)?;
                console = console.with_voice(Arc::new(assistant), capture);
            }
            Err(e) => warn!("Voice answers disabled: {:#}", e),
        }
    }

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    console.run(stdin, &mut stdout).await
}
