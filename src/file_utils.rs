use anyhow::{Result, Context, anyhow};
use chrono::{DateTime, Local};
use log::{debug, warn};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

// @const: Containers ffmpeg reads without probing
const VIDEO_EXTENSIONS: [&str; 14] = [
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v",
    "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
];

// @const: Bytes read when guessing a file type from its contents
const SNIFF_BYTES: u64 = 8192;

// @const: Prefix of rendered output files
pub const OUTPUT_PREFIX: &str = "captioned";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Timestamped output path for a rendered video
    // @params: output_dir, now
    pub fn captioned_output_path<P: AsRef<Path>>(output_dir: P, now: DateTime<Local>) -> PathBuf {
        let filename = format!("{}_{}.mp4", OUTPUT_PREFIX, now.format("%Y%m%d_%H%M%S"));
        output_dir.as_ref().join(filename)
    }

    // @returns: Directory of the input video, or the working directory
    pub fn default_output_dir<P: AsRef<Path>>(video: P) -> PathBuf {
        video
            .as_ref()
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Copy a file from one location to another, ensuring the target directory exists
    pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if !from.exists() {
            return Err(anyhow!("Source file does not exist: {:?}", from));
        }

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        fs::copy(from, to)
            .with_context(|| format!("Failed to copy {:?} to {:?}", from, to))?;

        Ok(())
    }

    /// Move a file, copying across filesystems when a rename is not possible
    pub fn move_file<P1: AsRef<Path>, P2: AsRef<Path>>(from: P1, to: P2) -> Result<()> {
        let from = from.as_ref();
        let to = to.as_ref();

        if let Some(parent) = to.parent() {
            Self::ensure_dir(parent)?;
        }

        if let Err(e) = fs::rename(from, to) {
            debug!("Rename {:?} -> {:?} failed ({}), copying instead", from, to, e);
            Self::copy_file(from, to)?;
            Self::remove_quietly(from);
        }
        Ok(())
    }

    /// Remove a file or directory tree, logging instead of failing
    pub fn remove_quietly<P: AsRef<Path>>(path: P) {
        let path = path.as_ref();
        let result = if path.is_dir() {
            fs::remove_dir_all(path)
        } else if path.exists() {
            fs::remove_file(path)
        } else {
            return;
        };

        if let Err(e) = result {
            warn!("Failed to remove {:?}: {}", path, e);
        }
    }

    /// Detect the kind of an input file from its extension and contents
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {:?}", path));
        }

        if let Some(ext) = path.extension() {
            let ext_str = ext.to_string_lossy().to_lowercase();

            match ext_str.as_str() {
                "srt" | "ass" => return Ok(FileType::Subtitle),
                "json" => return Ok(FileType::Transcript),
                ext if VIDEO_EXTENSIONS.contains(&ext) => return Ok(FileType::Video),
                _ => {}
            }
        }

        // Fall back to examining the start of the file
        if let Some(content) = Self::read_prefix(path, SNIFF_BYTES) {
            let trimmed = content.trim_start();
            if trimmed.starts_with('{') && trimmed.contains("\"segments\"") {
                return Ok(FileType::Transcript);
            }
            if content.contains("-->") || trimmed.starts_with("[Script Info]") {
                return Ok(FileType::Subtitle);
            }
        }

        Ok(FileType::Unknown)
    }

    // @returns: Up to `limit` leading bytes as text
    fn read_prefix(path: &Path, limit: u64) -> Option<String> {
        let mut buffer = Vec::new();
        fs::File::open(path)
            .and_then(|file| file.take(limit).read_to_end(&mut buffer))
            .ok()?;
        Some(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (SRT or ASS)
    Subtitle,
    /// Transcript JSON
    Transcript,
    /// Video file supported by ffmpeg
    Video,
    /// Unknown file type
    Unknown,
}
