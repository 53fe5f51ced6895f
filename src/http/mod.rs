//! HTTP API for driving questionnaire sessions from a browser front end
//!
//! - POST /sessions - Start a new session
//! - GET /sessions/:id - Current display model
//! - DELETE /sessions/:id - Discard a session
//! - PUT /sessions/:id/answer - Store a typed answer
//! - POST /sessions/:id/voice - Answer from a WAV recording
//! - POST /sessions/:id/next, /previous - Navigate
//! - GET /sessions/:id/snapshot - Ordered answers
//! - GET /sessions/:id/report - PDF report
//! - GET /questions - Question list
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{ErrorResponse, SetAnswerRequest};
pub use routes::create_router;
pub use state::AppState;
