/*!
 * Error types for the capburn application.
 *
 * This module contains custom error types for the different stages of the
 * caption pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors raised while validating configuration values.
///
/// These are never fatal: the caller reverts to the documented defaults
/// and logs the error as a warning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The separate threshold must be strictly greater than the continue threshold
    #[error("separate gap ({separate_ms} ms) must be greater than continue gap ({continue_ms} ms)")]
    InvalidGapThresholds {
        /// Configured continue threshold
        continue_ms: u64,
        /// Configured separate threshold
        separate_ms: u64,
    },

    /// A word limit was zero
    #[error("{field} must be at least 1")]
    ZeroWordLimit {
        /// Name of the offending field
        field: &'static str,
    },
}

/// Errors that can occur while probing a media file
#[derive(Error, Debug)]
pub enum ProbeError {
    /// The probe tool could not be started or timed out
    #[error("Failed to run probe tool: {0}")]
    Execution(String),

    /// The probe tool exited with a failure status
    #[error("Probe tool failed: {0}")]
    ToolFailed(String),

    /// The probe output could not be interpreted
    #[error("Failed to parse probe output: {0}")]
    Parse(String),
}

/// Errors produced by the external rendering tool
#[derive(Error, Debug)]
pub enum RenderError {
    /// The tool process could not be spawned
    #[error("Failed to start {tool}: {message}")]
    Spawn {
        /// Tool binary name
        tool: String,
        /// OS error message
        message: String,
    },

    /// The tool exited with a non-zero status
    #[error("{tool} exited with status {status}: {stderr}")]
    ToolFailed {
        /// Tool binary name
        tool: String,
        /// Exit code, or -1 if killed by a signal
        status: i32,
        /// Filtered stderr output
        stderr: String,
    },

    /// The tool did not finish in time and was killed
    #[error("{tool} timed out after {secs} seconds")]
    TimedOut {
        /// Tool binary name
        tool: String,
        /// Timeout that elapsed
        secs: u64,
    },

    /// Staging files for a render attempt failed
    #[error("Failed to stage render inputs: {0}")]
    Staging(String),

    /// Every fallback tier failed; carries the last tier's failure
    #[error("All render tiers failed, last error: {0}")]
    AllTiersFailed(Box<RenderError>),
}

/// Errors raised by font discovery
#[derive(Error, Debug)]
pub enum FontError {
    /// The font file could not be read
    #[error("Failed to read font file: {0}")]
    Read(String),

    /// The font file has no usable name table
    #[error("Font has no readable family name: {0}")]
    NoName(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or unreadable input (video or transcript)
    #[error("Input error: {0}")]
    Input(String),

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// The transcript did not yield any caption
    #[error("No captions could be built from the transcript")]
    NoCaptions,

    /// Error from configuration validation
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Error from the resolution probe
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Error from the render tool
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
