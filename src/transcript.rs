/*!
 * Transcript input model.
 *
 * Mirrors the JSON produced by Whisper-style speech recognizers: a list of
 * segments, each with text, start/end times in seconds and an optional list
 * of per-word timestamps.
 */

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::file_utils::FileManager;

/// A transcript as produced by the speech-to-text step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    /// Recognized segments in time order
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
}

/// One recognized segment
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptSegment {
    // @field: Segment text
    #[serde(default)]
    pub text: String,

    // @field: Start in seconds
    #[serde(default)]
    pub start: f64,

    // @field: End in seconds
    #[serde(default)]
    pub end: f64,

    // @field: Per-word timestamps, when the recognizer produced them
    #[serde(default)]
    pub words: Option<Vec<TranscriptWord>>,
}

/// A word as it appears in the transcript JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptWord {
    // @field: Raw word text, usually with a leading space
    #[serde(default)]
    pub word: String,

    // @field: Start in seconds
    #[serde(default)]
    pub start: f64,

    // @field: End in seconds; missing values fall back to start
    #[serde(default)]
    pub end: Option<f64>,
}

impl Transcript {
    /// Parse a transcript from a JSON string
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse transcript JSON")
    }

    /// Load a transcript from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = FileManager::read_to_string(&path)?;
        Self::from_json_str(&content)
            .with_context(|| format!("Invalid transcript: {}", path.as_ref().display()))
    }

    /// Whether any segment carries per-word timestamps
    pub fn has_word_timestamps(&self) -> bool {
        self.segments
            .iter()
            .any(|seg| seg.words.as_ref().is_some_and(|w| !w.is_empty()))
    }

    /// Total number of segments
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
