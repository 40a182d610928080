use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::styling::GlowLayer;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
///
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Caption grouping rules
    #[serde(default)]
    pub segmentation: SegmentationConfig,

    /// Caption styling
    #[serde(default)]
    pub style: StyleConfig,

    /// External tool settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// What to do when a moderate pause or a full line is reached inside a caption
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum GapPolicy {
    // @policy: End the caption; nothing is shown during the pause
    #[default]
    Flush,
    // @policy: Keep the caption on screen and continue on a new line
    LineBreak,
}

impl GapPolicy {
    // @returns: Config/CLI identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flush => "flush",
            Self::LineBreak => "line-break",
        }
    }
}

impl std::fmt::Display for GapPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for GapPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "flush" => Ok(Self::Flush),
            "line-break" | "linebreak" | "line_break" => Ok(Self::LineBreak),
            _ => Err(anyhow!("Invalid gap policy: {}", s)),
        }
    }
}

/// Caption grouping thresholds
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SegmentationConfig {
    /// Maximum words on a single caption line
    #[serde(default = "default_max_words_per_line")]
    pub max_words_per_line: usize,

    /// Maximum words in a caption unit
    #[serde(default = "default_max_words_per_caption")]
    pub max_words_per_caption: usize,

    /// Pauses shorter than this keep the caption going unchanged
    #[serde(default = "default_continue_gap_ms")]
    pub continue_gap_ms: u64,

    /// Pauses at least this long always end the caption
    #[serde(default = "default_separate_gap_ms")]
    pub separate_gap_ms: u64,

    /// Behavior for pauses between the two thresholds and for full lines
    #[serde(default)]
    pub gap_policy: GapPolicy,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_words_per_line: default_max_words_per_line(),
            max_words_per_caption: default_max_words_per_caption(),
            continue_gap_ms: default_continue_gap_ms(),
            separate_gap_ms: default_separate_gap_ms(),
            gap_policy: GapPolicy::default(),
        }
    }
}

impl SegmentationConfig {
    /// Check the threshold relationships
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.max_words_per_line == 0 {
            return Err(ConfigError::ZeroWordLimit { field: "max_words_per_line" });
        }
        if self.max_words_per_caption == 0 {
            return Err(ConfigError::ZeroWordLimit { field: "max_words_per_caption" });
        }
        if self.separate_gap_ms <= self.continue_gap_ms {
            return Err(ConfigError::InvalidGapThresholds {
                continue_ms: self.continue_gap_ms,
                separate_ms: self.separate_gap_ms,
            });
        }
        Ok(())
    }

    /// Return a usable configuration, reverting invalid values to defaults.
    ///
    /// Invalid thresholds are not fatal; the offending group of values is
    /// replaced and a warning names the fallback taken.
    pub fn sanitized(mut self) -> Self {
        while let Err(e) = self.validate() {
            match e {
                ConfigError::ZeroWordLimit { field } => {
                    warn!("{}; using default word limits.", e);
                    if field == "max_words_per_line" {
                        self.max_words_per_line = default_max_words_per_line();
                    } else {
                        self.max_words_per_caption = default_max_words_per_caption();
                    }
                }
                ConfigError::InvalidGapThresholds { .. } => {
                    warn!("{}; using defaults.", e);
                    self.continue_gap_ms = default_continue_gap_ms();
                    self.separate_gap_ms = default_separate_gap_ms();
                }
            }
        }
        self
    }
}

/// Entry/exit animation tuning for the styled format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnimationConfig {
    /// Length of the entry and of the exit transition
    #[serde(default = "default_entry_exit_ms")]
    pub entry_exit_ms: u32,

    /// Scale (%) the caption grows from on entry
    #[serde(default = "default_entry_scale_pct")]
    pub entry_scale_pct: u32,

    /// Scale (%) the caption grows to on exit
    #[serde(default = "default_exit_scale_pct")]
    pub exit_scale_pct: u32,

    /// Transform acceleration (1.0 is linear)
    #[serde(default = "default_accel")]
    pub accel: f32,

    /// The exit finishes this long before the caption ends
    #[serde(default = "default_preempt_ms")]
    pub preempt_ms: u32,

    /// Minimum distance between an exit and the next caption's start
    #[serde(default = "default_safety_margin_ms")]
    pub safety_margin_ms: u32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            entry_exit_ms: default_entry_exit_ms(),
            entry_scale_pct: default_entry_scale_pct(),
            exit_scale_pct: default_exit_scale_pct(),
            accel: default_accel(),
            preempt_ms: default_preempt_ms(),
            safety_margin_ms: default_safety_margin_ms(),
        }
    }
}

/// Caption styling configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StyleConfig {
    /// Font family name; resolved from `font_path` or the catalog when unset
    #[serde(default)]
    pub font_name: Option<String>,

    /// Font file to ship to the renderer
    #[serde(default)]
    pub font_path: Option<PathBuf>,

    /// Font size in pixels; derived from frame height when unset
    #[serde(default)]
    pub font_size: Option<u32>,

    /// Text colour (#RRGGBB or &HAABBGGRR)
    #[serde(default = "default_font_color")]
    pub font_color: String,

    /// Outline colour (#RRGGBB or &HAABBGGRR)
    #[serde(default = "default_outline_color")]
    pub outline_color: String,

    /// Bold text
    #[serde(default)]
    pub bold: bool,

    /// Italic text
    #[serde(default)]
    pub italic: bool,

    /// Position keyword (bottom, center, top, ...) or numpad code
    #[serde(default = "default_position")]
    pub position: String,

    /// Shadow depth in pixels
    #[serde(default = "default_shadow")]
    pub shadow: f32,

    /// Outline width in pixels
    #[serde(default = "default_outline")]
    pub outline: f32,

    /// Enables the glow layers and entry/exit animation
    #[serde(default = "default_true")]
    pub glow: bool,

    /// Replaces the built-in glow table
    #[serde(default)]
    pub glow_layers: Option<Vec<GlowLayer>>,

    /// Animation tuning
    #[serde(default)]
    pub animation: AnimationConfig,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_name: None,
            font_path: None,
            font_size: None,
            font_color: default_font_color(),
            outline_color: default_outline_color(),
            bold: false,
            italic: false,
            position: default_position(),
            shadow: default_shadow(),
            outline: default_outline(),
            glow: true,
            glow_layers: None,
            animation: AnimationConfig::default(),
        }
    }
}

impl StyleConfig {
    /// Configured font name, or the default family
    pub fn font_name_or_default(&self) -> String {
        self.font_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(default_font_name)
    }

    /// Font size for a frame of the given height
    pub fn font_size_for(&self, height: u32) -> u32 {
        self.font_size
            .filter(|size| *size > 0)
            .unwrap_or_else(|| ((height as f64 * 0.05) as u32).max(24))
    }

    /// Font file that exists on disk, if any
    pub fn resolved_font_path(&self) -> Option<&Path> {
        self.font_path.as_deref().filter(|p| p.is_file())
    }
}

/// External tool configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    /// ffmpeg binary
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// ffprobe binary
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Video encoder
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Encoder preset
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Quality factor for the first two tiers
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Quality factor for the last-resort tier
    #[serde(default = "default_fallback_crf")]
    pub fallback_crf: u8,

    /// Per-tier render timeout
    #[serde(default = "default_render_timeout_secs")]
    pub timeout_secs: u64,

    /// Resolution probe timeout
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            video_codec: default_video_codec(),
            preset: default_preset(),
            crf: default_crf(),
            fallback_crf: default_fallback_crf(),
            timeout_secs: default_render_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_max_words_per_line() -> usize {
    5
}

fn default_max_words_per_caption() -> usize {
    10
}

fn default_continue_gap_ms() -> u64 {
    200
}

fn default_separate_gap_ms() -> u64 {
    600
}

fn default_entry_exit_ms() -> u32 {
    30
}

fn default_entry_scale_pct() -> u32 {
    85
}

fn default_exit_scale_pct() -> u32 {
    105
}

fn default_accel() -> f32 {
    1.0
}

fn default_preempt_ms() -> u32 {
    40
}

fn default_safety_margin_ms() -> u32 {
    8
}

pub(crate) fn default_font_name() -> String {
    "Arial".to_string()
}

fn default_font_color() -> String {
    "#FFFFFF".to_string()
}

fn default_outline_color() -> String {
    "#000000".to_string()
}

fn default_position() -> String {
    "bottom".to_string()
}

fn default_shadow() -> f32 {
    2.0
}

fn default_outline() -> f32 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_preset() -> String {
    "fast".to_string()
}

fn default_crf() -> u8 {
    18
}

fn default_fallback_crf() -> u8 {
    20
}

fn default_render_timeout_secs() -> u64 {
    3600 // long videos re-encode slowly
}

fn default_probe_timeout_secs() -> u64 {
    60
}

impl Config {
    /// Load a configuration file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok((config, false));
        }

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok((config, true))
    }

    /// Validate the configuration for consistency and required values.
    ///
    /// Segmentation thresholds are repaired rather than rejected, see
    /// [`SegmentationConfig::sanitized`].
    pub fn validate(&self) -> Result<()> {
        if self.render.ffmpeg_path.trim().is_empty() {
            return Err(anyhow!("render.ffmpeg_path must not be empty"));
        }
        if self.render.ffprobe_path.trim().is_empty() {
            return Err(anyhow!("render.ffprobe_path must not be empty"));
        }
        if self.render.crf > 51 || self.render.fallback_crf > 51 {
            return Err(anyhow!("CRF values must be between 0 and 51"));
        }
        if self.render.timeout_secs == 0 {
            return Err(anyhow!("render.timeout_secs must be greater than zero"));
        }
        if matches!(&self.style.font_name, Some(name) if name.trim().is_empty()) {
            return Err(anyhow!("style.font_name must not be empty when set"));
        }
        Ok(())
    }
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
