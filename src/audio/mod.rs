pub mod archive;
pub mod backend;
pub mod file;

#[cfg(feature = "microphone")]
pub mod microphone;

pub use archive::ClipArchive;
pub use backend::{AudioCapture, AudioCaptureFactory, AudioClip, CaptureConfig, CaptureSource};
pub use file::{AudioFile, FileCapture};
