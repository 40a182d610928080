/*!
 * # capburn - caption timing and burn-in
 *
 * A Rust library that turns a word-timed speech transcript into captions
 * and burns them into a video.
 *
 * ## Features
 *
 * - Group timed words into short captions by pauses, word limits and
 *   sentence endings
 * - Write plain (SRT) and styled (ASS) subtitle files
 * - Styled captions with layered glow, drop shadow and entry/exit animation
 * - Burn captions into the video with ffmpeg, falling back through three
 *   rendering strategies
 * - Font discovery from the system font directories
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `transcript`: Transcript JSON model
 * - `caption_builder`: Word grouping into caption units
 * - `subtitle_processor`: SRT cues and documents
 * - `styling`: ASS generation:
 *   - `styling::color`: Colour normalization
 *   - `styling::glow`: Glow layer table
 *   - `styling::placement`: Position keywords
 *   - `styling::animation`: Entry/exit transform windows
 *   - `styling::document`: Script writer
 * - `subtitle_writer`: Writes both subtitle files
 * - `media_probe`: Video resolution via ffprobe
 * - `fonts`: Font catalog
 * - `burner`: ffmpeg burn-in with tier fallback
 * - `file_utils`: File system operations
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![cfg_attr(test, allow(non_snake_case))]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod burner;
pub mod caption_builder;
pub mod errors;
pub mod file_utils;
pub mod fonts;
pub mod media_probe;
pub mod styling;
pub mod subtitle_processor;
pub mod subtitle_writer;
pub mod transcript;

// Re-export main types for easier usage
pub use app_config::{Config, GapPolicy, SegmentationConfig, StyleConfig};
pub use app_controller::Controller;
pub use burner::{Compositor, FfmpegTool, RenderTier, RenderTool};
pub use caption_builder::{segment, CaptionBuilder, CaptionUnit, Word};
pub use errors::{AppError, ConfigError, FontError, ProbeError, RenderError};
pub use media_probe::Resolution;
pub use styling::AssDocument;
pub use subtitle_processor::{render_srt, SrtDocument, SubtitleEntry};
pub use subtitle_writer::{write_subtitle_files, SubtitleArtifacts};
pub use transcript::Transcript;
