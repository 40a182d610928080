/*!
 * Subtitle burn-in.
 *
 * Re-encodes a video with captions drawn into the frames. Rendering goes
 * through up to three tiers, each a full ffmpeg run, and stops at the
 * first that succeeds:
 *
 * 1. plain subtitles with a run-local fonts directory holding the chosen
 *    font file (only when a font file is available)
 * 2. the styled (ASS) script with system font lookup
 * 3. plain subtitles with default styling at a slightly lower quality
 *
 * Every run happens inside the work directory with relative file names,
 * which keeps paths with spaces, colons or quotes out of the filter graph.
 */

use async_trait::async_trait;
use chrono::Local;
use log::{debug, info, warn};
use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::{RenderConfig, StyleConfig};
use crate::errors::RenderError;
use crate::file_utils::FileManager;

// @const: Staged names inside the work directory
pub const STAGED_SRT: &str = "captions.srt";
pub const STAGED_ASS: &str = "captions.ass";
pub const FONTS_DIR: &str = "fonts";
pub const RENDER_FILE: &str = "render.mp4";

/// One rendering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTier {
    /// Plain subtitles with a bundled font
    FontsDir,
    /// Styled script, fonts resolved by the system
    StyledEvents,
    /// Plain subtitles, default style
    PlainSubtitles,
}

impl RenderTier {
    /// Tiers in the order they are tried
    pub const ALL: [RenderTier; 3] = [
        RenderTier::FontsDir,
        RenderTier::StyledEvents,
        RenderTier::PlainSubtitles,
    ];

    /// 1-based position in the fallback chain
    pub fn number(&self) -> usize {
        match self {
            RenderTier::FontsDir => 1,
            RenderTier::StyledEvents => 2,
            RenderTier::PlainSubtitles => 3,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RenderTier::FontsDir => "SRT with bundled font",
            RenderTier::StyledEvents => "styled ASS",
            RenderTier::PlainSubtitles => "plain SRT",
        }
    }
}

impl fmt::Display for RenderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tier {} ({})", self.number(), self.description())
    }
}

/// External program that performs a render
#[async_trait]
pub trait RenderTool: Send + Sync + Debug {
    /// Program name used in messages
    fn name(&self) -> &str;

    /// Run the program with `args` inside `work_dir`
    async fn run(&self, args: &[String], work_dir: &Path) -> Result<(), RenderError>;
}

/// ffmpeg with a per-run timeout
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    path: String,
    timeout: Duration,
}

impl FfmpegTool {
    pub fn new<S: Into<String>>(path: S, timeout: Duration) -> Self {
        Self {
            path: path.into(),
            timeout,
        }
    }

    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.ffmpeg_path.clone(), Duration::from_secs(config.timeout_secs))
    }
}

#[async_trait]
impl RenderTool for FfmpegTool {
    fn name(&self) -> &str {
        &self.path
    }

    async fn run(&self, args: &[String], work_dir: &Path) -> Result<(), RenderError> {
        debug!("Running {} {} in {:?}", self.path, args.join(" "), work_dir);

        let ffmpeg_future = Command::new(&self.path)
            .args(args)
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = ffmpeg_future => {
                result.map_err(|e| RenderError::Spawn {
                    tool: self.path.clone(),
                    message: e.to_string(),
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(RenderError::TimedOut {
                    tool: self.path.clone(),
                    secs: self.timeout.as_secs(),
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::ToolFailed {
                tool: self.path.clone(),
                status: output.status.code().unwrap_or(-1),
                stderr: filter_ffmpeg_stderr(&stderr),
            });
        }

        Ok(())
    }
}

/// Encoder settings shared by all tiers
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub fallback_crf: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

impl EncodeSettings {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            video_codec: config.video_codec.clone(),
            preset: config.preset.clone(),
            crf: config.crf,
            fallback_crf: config.fallback_crf,
        }
    }

    // @returns: Quality factor for a tier
    pub fn crf_for(&self, tier: RenderTier) -> u8 {
        match tier {
            RenderTier::PlainSubtitles => self.fallback_crf,
            _ => self.crf,
        }
    }
}

/// Removes per-run copies when dropped
#[derive(Debug, Default)]
pub struct StagedFiles {
    paths: Vec<PathBuf>,
}

impl StagedFiles {
    pub fn track<P: Into<PathBuf>>(&mut self, path: P) {
        self.paths.push(path.into());
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for StagedFiles {
    fn drop(&mut self) {
        for path in self.paths.iter().rev() {
            FileManager::remove_quietly(path);
        }
    }
}

/// Burns captions into a video using a [`RenderTool`]
#[derive(Debug)]
pub struct Compositor<T: RenderTool> {
    tool: T,
    settings: EncodeSettings,
}

impl Compositor<FfmpegTool> {
    /// Compositor backed by ffmpeg
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(FfmpegTool::from_config(config), EncodeSettings::from_config(config))
    }
}

impl<T: RenderTool> Compositor<T> {
    pub fn new(tool: T, settings: EncodeSettings) -> Self {
        Self { tool, settings }
    }

    pub fn tool(&self) -> &T {
        &self.tool
    }

    pub fn settings(&self) -> &EncodeSettings {
        &self.settings
    }

    /// Filter graph for a tier, using the staged relative names
    pub fn filter_for(tier: RenderTier, font_name: &str) -> String {
        match tier {
            RenderTier::FontsDir => format!(
                "subtitles={}:fontsdir={}:force_style='FontName={}'",
                STAGED_SRT,
                FONTS_DIR,
                sanitize_font_name(font_name)
            ),
            RenderTier::StyledEvents => format!("ass={}", STAGED_ASS),
            RenderTier::PlainSubtitles => format!("subtitles={}", STAGED_SRT),
        }
    }

    /// Full argument list for one tier
    pub fn tier_args(&self, tier: RenderTier, source_name: &str, font_name: &str) -> Vec<String> {
        let crf = self.settings.crf_for(tier).to_string();
        let filter = Self::filter_for(tier, font_name);
        [
            "-hide_banner",
            "-loglevel",
            "error",
            "-nostdin",
            "-i",
            source_name,
            "-vf",
            filter.as_str(),
            "-c:v",
            self.settings.video_codec.as_str(),
            "-preset",
            self.settings.preset.as_str(),
            "-crf",
            crf.as_str(),
            "-c:a",
            "copy",
            "-y",
            RENDER_FILE,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Render `video` with captions into `output_dir`.
    ///
    /// Returns the path of the new `captioned_<timestamp>.mp4`. Inputs are
    /// staged into `work_dir` first and every staged copy is removed before
    /// returning, whatever the outcome.
    pub async fn burn_in(
        &self,
        video: &Path,
        ass: &Path,
        srt: &Path,
        output_dir: &Path,
        work_dir: &Path,
        style: &StyleConfig,
    ) -> Result<PathBuf, RenderError> {
        FileManager::ensure_dir(output_dir).map_err(|e| RenderError::Staging(e.to_string()))?;
        FileManager::ensure_dir(work_dir).map_err(|e| RenderError::Staging(e.to_string()))?;

        let mut staged = StagedFiles::default();
        let source_name = stage_video(video, work_dir, &mut staged)?;
        stage_copy(srt, &work_dir.join(STAGED_SRT), &mut staged)?;
        stage_copy(ass, &work_dir.join(STAGED_ASS), &mut staged)?;
        let render_path = work_dir.join(RENDER_FILE);
        staged.track(&render_path);

        let fonts_ready = stage_font(style, work_dir, &mut staged);
        let font_name = style.font_name_or_default();

        let mut last_error = None;
        for tier in RenderTier::ALL {
            if tier == RenderTier::FontsDir && !fonts_ready {
                debug!("Skipping {}: no font file available", tier);
                continue;
            }

            let args = self.tier_args(tier, &source_name, &font_name);
            info!("Rendering with {}", tier);

            let result = match self.tool.run(&args, work_dir).await {
                Ok(()) if FileManager::file_exists(&render_path) => Ok(()),
                Ok(()) => Err(RenderError::ToolFailed {
                    tool: self.tool.name().to_string(),
                    status: 0,
                    stderr: format!("{} was not produced", RENDER_FILE),
                }),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => {
                    let output = FileManager::captioned_output_path(output_dir, Local::now());
                    FileManager::move_file(&render_path, &output)
                        .map_err(|e| RenderError::Staging(e.to_string()))?;
                    info!("Captioned video written to {:?}", output);
                    return Ok(output);
                }
                Err(e) => {
                    warn!("Render {} failed: {}", tier, e);
                    FileManager::remove_quietly(&render_path);
                    last_error = Some(e);
                }
            }
        }

        let last = last_error.unwrap_or_else(|| RenderError::Staging("no render tier ran".to_string()));
        Err(RenderError::AllTiersFailed(Box::new(last)))
    }
}

// @returns: Relative name of the staged video
fn stage_video(video: &Path, work_dir: &Path, staged: &mut StagedFiles) -> Result<String, RenderError> {
    let ext = video
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| "mp4".to_string());
    let name = format!("source.{}", ext);
    let target = work_dir.join(&name);

    // Hard link when possible, copy across filesystems
    if std::fs::hard_link(video, &target).is_err() {
        FileManager::copy_file(video, &target)
            .map_err(|e| RenderError::Staging(format!("{:#}", e)))?;
    }
    staged.track(target);
    Ok(name)
}

fn stage_copy(from: &Path, to: &Path, staged: &mut StagedFiles) -> Result<(), RenderError> {
    if is_same_file(from, to) {
        return Ok(());
    }
    FileManager::copy_file(from, to).map_err(|e| RenderError::Staging(format!("{:#}", e)))?;
    staged.track(to);
    Ok(())
}

// Copying a file onto itself truncates it
fn is_same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

// @returns: Whether the fonts directory holds the style's font file
fn stage_font(style: &StyleConfig, work_dir: &Path, staged: &mut StagedFiles) -> bool {
    let Some(font) = style.resolved_font_path() else {
        return false;
    };
    let Some(file_name) = font.file_name() else {
        return false;
    };

    let fonts_dir = work_dir.join(FONTS_DIR);
    staged.track(&fonts_dir);
    match FileManager::copy_file(font, fonts_dir.join(file_name)) {
        Ok(()) => true,
        Err(e) => {
            warn!("Could not copy font {:?} into the fonts directory: {:#}", font, e);
            false
        }
    }
}

// Quotes and commas would end the force_style value
fn sanitize_font_name(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '\'' | ',')).collect()
}

/// Drop ffmpeg's banner and stream dump, keeping the error lines
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
