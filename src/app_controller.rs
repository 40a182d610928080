use anyhow::{Result, Context};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{Config, StyleConfig};
use crate::burner::{Compositor, RenderTool};
use crate::caption_builder::{CaptionBuilder, CaptionUnit};
use crate::errors::AppError;
use crate::file_utils::{FileManager, FileType};
use crate::fonts::{FontCatalog, SystemFontCatalog};
use crate::media_probe::{MediaProbe, Resolution};
use crate::subtitle_writer::{write_subtitle_files, SubtitleArtifacts};
use crate::transcript::Transcript;

// @module: Application controller for the caption pipeline

// @const: Base name of the subtitle files inside the work directory
const WORK_BASE_NAME: &str = "captions";

/// Main application controller: transcript in, captioned video out
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Font lookup for the bundled-font tier
    catalog: Arc<dyn FontCatalog>,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self::with_catalog(config, Arc::new(SystemFontCatalog::new())))
    }

    // @method: Create a controller with an explicit font catalog
    pub fn with_catalog(config: Config, catalog: Arc<dyn FontCatalog>) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Style with the font name and font file filled in where possible.
    ///
    /// A font file without a name gets the family name it declares. A
    /// missing font file is dropped with a warning. A name without a file
    /// is looked up in the catalog so the bundled-font tier can run.
    pub fn resolve_style(&self) -> StyleConfig {
        let mut style = self.config.style.clone();

        if let Some(path) = style.font_path.clone() {
            if path.is_file() {
                if style.font_name.is_none() {
                    match self.catalog.resolve_font_name(&path) {
                        Ok(name) => {
                            debug!("Font file {:?} declares family '{}'", path, name);
                            style.font_name = Some(name);
                        }
                        Err(e) => warn!("{}; using '{}'", e, style.font_name_or_default()),
                    }
                }
            } else {
                warn!("Font file {:?} does not exist; ignoring it", path);
                style.font_path = None;
            }
        }

        if style.font_path.is_none() {
            if let Some(name) = style.font_name.clone() {
                match self.catalog.find_by_name(&name) {
                    Some(entry) => {
                        debug!("Using font file {:?} for '{}'", entry.path, name);
                        style.font_path = Some(entry.path);
                    }
                    None => debug!("No installed font file matches '{}'", name),
                }
            }
        }

        style
    }

    /// Load a transcript and group it into caption units
    pub fn build_captions<P: AsRef<Path>>(&self, transcript_path: P) -> Result<Vec<CaptionUnit>> {
        let transcript_path = transcript_path.as_ref();
        if !FileManager::file_exists(transcript_path) {
            return Err(AppError::Input(format!("Transcript not found: {:?}", transcript_path)).into());
        }

        match FileManager::detect_file_type(transcript_path)? {
            FileType::Transcript => {}
            other => {
                return Err(AppError::Input(format!(
                    "Not a transcript ({:?}): {:?}",
                    other, transcript_path
                ))
                .into());
            }
        }

        let transcript = Transcript::from_file(transcript_path)
            .map_err(|e| AppError::Input(format!("{:#}", e)))?;
        if !transcript.has_word_timestamps() {
            info!("Transcript has no word timestamps; spreading words evenly over segments");
        }

        let builder = CaptionBuilder::new(self.config.segmentation.clone());
        let units = builder.build(&transcript);
        if units.is_empty() {
            return Err(AppError::NoCaptions.into());
        }

        info!("Built {} captions from {} segments", units.len(), transcript.len());
        Ok(units)
    }

    /// Run the whole pipeline with ffmpeg
    pub async fn run(&self, video: PathBuf, transcript: PathBuf, output_dir: Option<PathBuf>) -> Result<PathBuf> {
        let compositor = Compositor::from_config(&self.config.render);
        self.run_with_compositor(video, transcript, output_dir, &compositor).await
    }

    /// Run the whole pipeline with the given compositor
    pub async fn run_with_compositor<T: RenderTool>(
        &self,
        video: PathBuf,
        transcript: PathBuf,
        output_dir: Option<PathBuf>,
        compositor: &Compositor<T>,
    ) -> Result<PathBuf> {
        let start_time = Instant::now();

        Self::check_video(&video)?;
        let units = self.build_captions(&transcript)?;

        let output_dir = output_dir.unwrap_or_else(|| FileManager::default_output_dir(&video));
        let resolution = self.probe_resolution(&video).await;
        let style = self.resolve_style();

        let work_dir = tempfile::Builder::new()
            .prefix("capburn_")
            .tempdir()
            .context("Failed to create temporary work directory")?;
        debug!("Work directory: {:?}", work_dir.path());

        let artifacts = write_subtitle_files(&units, &style, resolution, work_dir.path(), WORK_BASE_NAME)?;

        let spinner = Self::render_spinner();
        let result = compositor
            .burn_in(
                &video,
                &artifacts.ass_path,
                &artifacts.srt_path,
                &output_dir,
                work_dir.path(),
                &style,
            )
            .await;
        spinner.finish_and_clear();

        let work_path = work_dir.path().to_path_buf();
        if let Err(e) = work_dir.close() {
            warn!("Failed to remove work directory {:?}: {}", work_path, e);
        }

        let output = result.map_err(AppError::from)?;
        info!(
            "Captioning completed in {}.",
            Self::format_duration(start_time.elapsed())
        );
        Ok(output)
    }

    /// Write `<video stem>.srt` and `<video stem>.ass` without rendering
    pub async fn export_subtitles(
        &self,
        video: PathBuf,
        transcript: PathBuf,
        output_dir: Option<PathBuf>,
    ) -> Result<SubtitleArtifacts> {
        Self::check_video(&video)?;
        let units = self.build_captions(&transcript)?;

        let output_dir = output_dir.unwrap_or_else(|| FileManager::default_output_dir(&video));
        let resolution = self.probe_resolution(&video).await;
        let style = self.resolve_style();

        let stem = video
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| WORK_BASE_NAME.to_string());

        write_subtitle_files(&units, &style, resolution, &output_dir, &stem)
    }

    // @validates: Video input exists and is not a subtitle or transcript
    fn check_video(video: &Path) -> Result<()> {
        if !FileManager::file_exists(video) {
            return Err(AppError::Input(format!("Video not found: {:?}", video)).into());
        }

        match FileManager::detect_file_type(video)? {
            FileType::Video => Ok(()),
            FileType::Unknown => {
                warn!("Unrecognized video extension for {:?}; letting ffmpeg decide", video);
                Ok(())
            }
            other => Err(AppError::Input(format!("Not a video ({:?}): {:?}", other, video)).into()),
        }
    }

    async fn probe_resolution(&self, video: &Path) -> Resolution {
        let resolution = MediaProbe::from_config(&self.config.render)
            .resolution_or_default(video)
            .await;
        info!("Video resolution: {}", resolution);
        resolution
    }

    fn render_spinner() -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message("Burning captions into video");
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    /// Human-readable elapsed time
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
