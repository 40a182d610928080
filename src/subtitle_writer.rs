use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

use crate::app_config::StyleConfig;
use crate::caption_builder::CaptionUnit;
use crate::file_utils::FileManager;
use crate::media_probe::Resolution;
use crate::styling::AssDocument;
use crate::subtitle_processor::SrtDocument;

// @module: Writes both subtitle formats for one caption list

/// Paths of the written subtitle files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleArtifacts {
    pub srt_path: PathBuf,
    pub ass_path: PathBuf,
}

/// Write `<base_name>.srt` and `<base_name>.ass` into `dir`
pub fn write_subtitle_files<P: AsRef<Path>>(
    units: &[CaptionUnit],
    style: &StyleConfig,
    resolution: Resolution,
    dir: P,
    base_name: &str,
) -> Result<SubtitleArtifacts> {
    let dir = dir.as_ref();
    FileManager::ensure_dir(dir)?;

    let srt_path = dir.join(format!("{}.srt", base_name));
    let ass_path = dir.join(format!("{}.ass", base_name));

    SrtDocument::from_units(units).write_to_file(&srt_path)?;
    AssDocument::new(style, resolution).write_to_file(units, &ass_path)?;

    info!("Wrote {} captions to {:?} and {:?}", units.len(), srt_path, ass_path);
    Ok(SubtitleArtifacts { srt_path, ass_path })
}
