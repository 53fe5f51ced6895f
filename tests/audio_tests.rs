// Integration tests for answer audio handling
//
// These tests verify WAV decoding, conversion to mono 16kHz clips,
// file-based capture and the on-disk clip archive.

mod common;

use anyhow::Result;
use common::tone_wav_bytes;
use medical_intake::{
    AudioCapture, AudioCaptureFactory, AudioClip, AudioFile, CaptureConfig, CaptureSource,
    ClipArchive, FileCapture,
};
use std::time::Duration;
use tempfile::TempDir;

fn config(seconds: u64) -> CaptureConfig {
    CaptureConfig {
        sample_rate: 16000,
        duration: Duration::from_secs(seconds),
    }
}

#[test]
fn test_decode_wav_bytes() -> Result<()> {
    let audio = AudioFile::from_wav_bytes(&tone_wav_bytes(16000, 1, 1.0))?;

    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);
    assert_eq!(audio.samples.len(), 16000);
    assert!((audio.duration_seconds - 1.0).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_8bit_wav_is_scaled_to_16bit_range() -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 8,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for sample in [0i8, 64, -128, 127] {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    let audio = AudioFile::from_wav_bytes(cursor.get_ref())?;
    assert_eq!(audio.samples, vec![0, 16384, -32768, 32512]);

    Ok(())
}

#[test]
fn test_invalid_wav_bytes_fail() {
    let result = AudioFile::from_wav_bytes(b"definitely not a wav file");
    assert!(result.is_err(), "Garbage input should not decode");
}

#[test]
fn test_stereo_44k_converts_to_mono_16k() -> Result<()> {
    let audio = AudioFile::from_wav_bytes(&tone_wav_bytes(44100, 2, 1.0))?;
    let clip = audio.to_clip(&config(5))?;

    assert_eq!(clip.sample_rate, 16000);
    let expected = 16000i64;
    assert!(
        (clip.samples.len() as i64 - expected).abs() <= 1,
        "expected ~{} samples, got {}",
        expected,
        clip.samples.len()
    );

    Ok(())
}

#[test]
fn test_clip_is_cut_to_capture_duration() -> Result<()> {
    let audio = AudioFile::from_wav_bytes(&tone_wav_bytes(16000, 1, 3.0))?;
    let clip = audio.to_clip(&config(1))?;

    assert_eq!(clip.samples.len(), 16000);
    assert!((clip.duration_seconds() - 1.0).abs() < 1e-6);

    Ok(())
}

#[test]
fn test_clip_wav_encoding_decodes_back() -> Result<()> {
    let clip = AudioClip::new(vec![100, -200, 300, -400], 16000);
    let audio = AudioFile::from_wav_bytes(&clip.to_wav_bytes()?)?;

    assert_eq!(audio.samples, clip.samples);
    assert_eq!(audio.sample_rate, 16000);
    assert_eq!(audio.channels, 1);

    Ok(())
}

#[tokio::test]
async fn test_file_capture_reads_wav() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("answer.wav");
    std::fs::write(&path, tone_wav_bytes(48000, 1, 2.0))?;

    let mut capture = FileCapture::new(&path, config(5));
    let clip = capture.capture().await?;

    assert_eq!(capture.name(), "file");
    assert_eq!(clip.sample_rate, 16000);
    assert_eq!(clip.samples.len(), 32000);

    Ok(())
}

#[tokio::test]
async fn test_file_capture_missing_file_fails() {
    let mut capture = FileCapture::new("/nonexistent/answer.wav", config(5));
    assert!(capture.capture().await.is_err());
}

#[tokio::test]
async fn test_factory_builds_file_capture() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("answer.wav");
    std::fs::write(&path, tone_wav_bytes(16000, 1, 0.5))?;

    let mut capture = AudioCaptureFactory::create(CaptureSource::File(path), config(5))?;
    let clip = capture.capture().await?;
    assert_eq!(clip.samples.len(), 8000);

    Ok(())
}

#[cfg(not(feature = "microphone"))]
#[test]
fn test_factory_refuses_microphone_without_feature() {
    let result = AudioCaptureFactory::create(CaptureSource::Microphone, config(5));
    assert!(result.is_err());
}

#[test]
fn test_archive_writes_named_wav() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let archive = ClipArchive::new(temp_dir.path().join("recordings"))?;

    let clip = AudioClip::new(vec![0i16; 1600], 16000);
    let path = archive.save("intake-1", "Contact number", &clip)?;

    assert!(path.exists(), "recording should be written");
    assert!(path.to_string_lossy().ends_with("intake-1-contact-number.wav"));

    let reread = AudioFile::open(&path)?;
    assert_eq!(reread.samples.len(), 1600);

    // Answering again replaces the recording
    let longer = AudioClip::new(vec![0i16; 3200], 16000);
    let again = archive.save("intake-1", "Contact number", &longer)?;
    assert_eq!(again, path);
    assert_eq!(AudioFile::open(&again)?.samples.len(), 3200);

    Ok(())
}
