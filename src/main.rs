// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use capburn::app_config::{self, Config, GapPolicy};
use capburn::fonts::{FontCatalog, SystemFontCatalog};
use capburn::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for GapPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliGapPolicy {
    Flush,
    LineBreak,
}

impl From<CliGapPolicy> for GapPolicy {
    fn from(cli_policy: CliGapPolicy) -> Self {
        match cli_policy {
            CliGapPolicy::Flush => GapPolicy::Flush,
            CliGapPolicy::LineBreak => GapPolicy::LineBreak,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Burn captions from a transcript into a video (default command)
    Burn(BurnArgs),

    /// List fonts found in the system font directories
    Fonts {
        /// Only show fonts whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },

    /// Generate shell completions for capburn
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct BurnArgs {
    /// Input video file
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Transcript JSON with segment and word timestamps
    #[arg(value_name = "TRANSCRIPT")]
    transcript: PathBuf,

    #[command(flatten)]
    options: BurnOptions,
}

/// Overrides shared by the default command and `burn`
#[derive(Args, Debug, Clone)]
struct BurnOptions {
    /// Font family name
    #[arg(long)]
    font_name: Option<String>,

    /// Font file to bundle with the render
    #[arg(long)]
    font_path: Option<PathBuf>,

    /// Font size in pixels (default: 5% of the video height)
    #[arg(long)]
    font_size: Option<u32>,

    /// Text colour (#RRGGBB or &HAABBGGRR)
    #[arg(long)]
    color: Option<String>,

    /// Outline colour (#RRGGBB or &HAABBGGRR)
    #[arg(long)]
    outline_color: Option<String>,

    /// Caption position (bottom, lower-center, center, below-center, top, or 1-9)
    #[arg(long)]
    position: Option<String>,

    /// Shadow depth in pixels
    #[arg(long)]
    shadow: Option<f32>,

    /// Disable glow layers and animation
    #[arg(long)]
    no_glow: bool,

    /// What a moderate pause or a full line does to the current caption
    #[arg(long, value_enum)]
    gap_policy: Option<CliGapPolicy>,

    /// Pauses shorter than this (ms) keep the caption going
    #[arg(long)]
    continue_gap_ms: Option<u64>,

    /// Pauses at least this long (ms) always end the caption
    #[arg(long)]
    separate_gap_ms: Option<u64>,

    /// Maximum words per caption line
    #[arg(long)]
    max_words_per_line: Option<usize>,

    /// Maximum words per caption
    #[arg(long)]
    max_words_per_caption: Option<usize>,

    /// Output directory (default: the video's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Write the SRT and ASS files next to the output instead of rendering
    #[arg(long)]
    subtitles_only: bool,
}

/// capburn - caption timing and burn-in
///
/// Turns a word-timed transcript into captions and burns them into a video.
#[derive(Parser, Debug)]
#[command(name = "capburn")]
#[command(version)]
#[command(about = "Caption timing and burn-in tool")]
#[command(long_about = "capburn groups the words of a timed transcript into short captions and burns them into a video with ffmpeg.

EXAMPLES:
    capburn clip.mp4 clip.json                       # Burn captions using default config
    capburn burn clip.mp4 clip.json --no-glow        # Plain captions without glow or animation
    capburn clip.mp4 clip.json --position center     # Centered captions
    capburn clip.mp4 clip.json --subtitles-only      # Only write clip.srt and clip.ass
    capburn fonts --filter roboto                    # Find an installed font
    capburn completions bash > capburn.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input video file
    #[arg(value_name = "VIDEO")]
    video: Option<PathBuf>,

    /// Transcript JSON with segment and word timestamps
    #[arg(value_name = "TRANSCRIPT")]
    transcript: Option<PathBuf>,

    #[command(flatten)]
    options: BurnOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => "✅ ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "capburn", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Fonts { filter }) => list_fonts(filter.as_deref()),
        Some(Commands::Burn(args)) => run_burn(args).await,
        None => {
            // Default behavior - positional arguments without the subcommand
            let video = cli
                .video
                .ok_or_else(|| anyhow!("VIDEO is required when no subcommand is specified"))?;
            let transcript = cli
                .transcript
                .ok_or_else(|| anyhow!("TRANSCRIPT is required when no subcommand is specified"))?;

            run_burn(BurnArgs {
                video,
                transcript,
                options: cli.options,
            })
            .await
        }
    }
}

// @applies: Command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &BurnOptions) {
    let style = &mut config.style;
    if let Some(name) = &options.font_name {
        style.font_name = Some(name.clone());
    }
    if let Some(path) = &options.font_path {
        style.font_path = Some(path.clone());
    }
    if let Some(size) = options.font_size {
        style.font_size = Some(size);
    }
    if let Some(color) = &options.color {
        style.font_color = color.clone();
    }
    if let Some(color) = &options.outline_color {
        style.outline_color = color.clone();
    }
    if let Some(position) = &options.position {
        style.position = position.clone();
    }
    if let Some(shadow) = options.shadow {
        style.shadow = shadow;
    }
    if options.no_glow {
        style.glow = false;
    }

    let segmentation = &mut config.segmentation;
    if let Some(policy) = &options.gap_policy {
        segmentation.gap_policy = policy.clone().into();
    }
    if let Some(ms) = options.continue_gap_ms {
        segmentation.continue_gap_ms = ms;
    }
    if let Some(ms) = options.separate_gap_ms {
        segmentation.separate_gap_ms = ms;
    }
    if let Some(words) = options.max_words_per_line {
        segmentation.max_words_per_line = words;
    }
    if let Some(words) = options.max_words_per_caption {
        segmentation.max_words_per_caption = words;
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_burn(args: BurnArgs) -> Result<()> {
    let options = &args.options;

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let (mut config, created) = Config::load_or_create(&options.config_path)?;
    if created {
        warn!("Config file not found at '{}', created default config.", options.config_path);
    }

    apply_overrides(&mut config, options);
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if options.subtitles_only {
        let artifacts = controller
            .export_subtitles(args.video, args.transcript, options.output_dir.clone())
            .await?;
        info!("Success: {:?}, {:?}", artifacts.srt_path, artifacts.ass_path);
        return Ok(());
    }

    let output = controller
        .run(args.video, args.transcript, options.output_dir.clone())
        .await?;
    info!("Success: {:?}", output);
    Ok(())
}

fn list_fonts(filter: Option<&str>) -> Result<()> {
    let catalog = SystemFontCatalog::new();
    let needle = filter.map(str::to_lowercase);

    let fonts: Vec<_> = catalog
        .list_fonts()
        .into_iter()
        .filter(|f| {
            needle
                .as_deref()
                .is_none_or(|n| f.name.to_lowercase().contains(n))
        })
        .collect();

    if fonts.is_empty() {
        warn!("No fonts found in {:?}", catalog.dirs());
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    for font in &fonts {
        writeln!(stdout, "{}\t{}", font.name, font.path.display())?;
    }
    info!("{} fonts", fonts.len());
    Ok(())
}
