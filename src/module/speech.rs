//! Speech to text via a remote transcription service.
//!
//! Recorded audio is posted as multipart form data to a whisper-style
//! endpoint. Failures are classified so the front end can tell a timeout
//! from an unintelligible recording from a broken service; none of them
//! is retried or fatal.

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::module::util::conf;

/// Classified transcription failure, surfaced as a status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// The service did not answer within the configured timeout.
    Timeout,
    /// The service answered but produced no transcript.
    Unintelligible,
    /// Transport failure, non-success status or a malformed response.
    ServiceUnavailable(String),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::Timeout => write!(f, "No speech service response (timeout)"),
            SpeechError::Unintelligible => write!(f, "Could not understand audio"),
            SpeechError::ServiceUnavailable(e) => write!(f, "Speech service unavailable: {}", e),
        }
    }
}

impl std::error::Error for SpeechError {}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Transcribe a recorded WAV file.
pub fn transcribe(conf: &conf::Speech, wav_path: &str) -> Result<String, SpeechError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(conf.timeout_sec))
        .build()
        .map_err(|e| SpeechError::ServiceUnavailable(e.to_string()))?;

    let form = reqwest::blocking::multipart::Form::new()
        .text("model", conf.model.clone())
        .text("response_format", "json")
        .file("file", wav_path)
        .map_err(|e| SpeechError::ServiceUnavailable(e.to_string()))?;

    let response = client
        .post(&conf.endpoint)
        .bearer_auth(&conf.api_key)
        .multipart(form)
        .send();
    let response = match response {
        Ok(r) => r,
        Err(e) if e.is_timeout() => return Err(SpeechError::Timeout),
        Err(e) => return Err(SpeechError::ServiceUnavailable(e.to_string())),
    };

    if !response.status().is_success() {
        return Err(SpeechError::ServiceUnavailable(format!(
            "status {}",
            response.status()
        )));
    }

    let body: TranscriptionResponse = response
        .json()
        .map_err(|e| SpeechError::ServiceUnavailable(e.to_string()))?;
    classify_transcript(&body.text)
}

/// An empty transcript means the service heard nothing usable.
fn classify_transcript(text: &str) -> Result<String, SpeechError> {
    let text = text.trim();
    if text.is_empty() {
        Err(SpeechError::Unintelligible)
    } else {
        Ok(text.to_string())
    }
}
