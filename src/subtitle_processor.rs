use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use log::{warn, debug};

use crate::caption_builder::CaptionUnit;

// @module: Plain-timestamp (SRT) subtitle serialization

// @const: SRT timestamp line regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2,}):(\d{2}):(\d{2}),(\d{3})\s*-->\s*(\d{2,}):(\d{2}):(\d{2}),(\d{3})")
        .expect("valid SRT timestamp regex")
});

/// Convert seconds to whole milliseconds, rounding half away from zero.
/// Negative times clamp to zero.
pub fn seconds_to_ms(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0).round() as u64
}

// @struct: Single SRT cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number, starting at 1
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Cue body, lines separated by '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    /// Creates the cue for a caption unit
    pub fn from_caption(seq_num: usize, unit: &CaptionUnit) -> Self {
        Self::new(
            seq_num,
            seconds_to_ms(unit.start),
            seconds_to_ms(unit.end),
            unit.text_with_separator("\n"),
        )
    }

    /// Parse an SRT timestamp (HH:MM:SS,mmm) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ','][..]).collect();

        if parts.len() != 4 {
            return Err(anyhow!("Invalid timestamp format: {}", timestamp));
        }

        let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
        let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
        let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
        let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format milliseconds as an SRT timestamp (HH:MM:SS,mmm).
    /// Hours grow past two digits when needed.
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Format seconds as an SRT timestamp
    pub fn format_seconds(seconds: f64) -> String {
        Self::format_timestamp(seconds_to_ms(seconds))
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(
            f,
            "{} --> {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms)
        )?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// An SRT document
#[derive(Debug, Clone, Default)]
pub struct SrtDocument {
    /// Cues in display order
    pub entries: Vec<SubtitleEntry>,
}

impl SrtDocument {
    /// Build one cue per caption unit, numbered from 1
    pub fn from_units(units: &[CaptionUnit]) -> Self {
        let entries = units
            .iter()
            .enumerate()
            .map(|(i, unit)| SubtitleEntry::from_caption(i + 1, unit))
            .collect();
        Self { entries }
    }

    /// Render the whole document
    pub fn render(&self) -> String {
        self.entries.iter().map(|e| e.to_string()).collect()
    }

    /// Write the document to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut file = File::create(path)
            .with_context(|| format!("Failed to create subtitle file: {}", path.display()))?;

        for entry in &self.entries {
            write!(file, "{}", entry)?;
        }

        debug!("Wrote {} SRT cues to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Parse SRT content back into cues
    pub fn parse(content: &str) -> Result<Self> {
        let mut entries = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();

        let mut finish = |seq: Option<usize>, times: Option<(u64, u64)>, text: &mut String| {
            if let (Some(seq_num), Some((start, end))) = (seq, times) {
                if text.is_empty() {
                    warn!("Skipping empty subtitle entry {}", seq_num);
                } else {
                    entries.push(SubtitleEntry::new(seq_num, start, end, text.clone()));
                }
            }
            text.clear();
        };

        for (line_no, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if current_times.is_some() {
                    finish(current_seq_num.take(), current_times.take(), &mut current_text);
                }
                continue;
            }

            if current_seq_num.is_none() {
                if let Ok(num) = trimmed.parse::<usize>() {
                    current_seq_num = Some(num);
                    continue;
                }
            }

            if current_seq_num.is_some() && current_times.is_none() {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    let start = Self::captured_ms(&caps, 1)?;
                    let end = Self::captured_ms(&caps, 5)?;
                    current_times = Some((start, end));
                    continue;
                }
            }

            if current_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!("Unexpected text at line {} before a timestamp: {}", line_no + 1, trimmed);
            }
        }
        finish(current_seq_num, current_times, &mut current_text);

        if entries.is_empty() {
            return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
        }

        Ok(Self { entries })
    }

    // @returns: Milliseconds from four consecutive capture groups
    fn captured_ms(caps: &regex::Captures, start_idx: usize) -> Result<u64> {
        let field = |offset: usize| -> Result<u64> {
            caps.get(start_idx + offset)
                .ok_or_else(|| anyhow!("Missing timestamp component"))?
                .as_str()
                .parse::<u64>()
                .context("Invalid timestamp component")
        };
        Ok(((field(0)? * 60 + field(1)?) * 60 + field(2)?) * 1000 + field(3)?)
    }
}

/// Render caption units as SRT text
pub fn render_srt(units: &[CaptionUnit]) -> String {
    SrtDocument::from_units(units).render()
}
