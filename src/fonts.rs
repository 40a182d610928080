/*!
 * Font discovery.
 *
 * The first render tier ships a font file to ffmpeg and needs the family
 * name that file declares, since libass matches styles by family name.
 * This module provides:
 *
 * - [`FontCatalog`]: listing installed fonts and resolving a file's family
 * - [`SystemFontCatalog`]: scans the platform font directories
 * - [`StaticFontCatalog`]: a fixed list, used when scanning is unwanted
 *
 * Family names are read from the `name` table of TrueType, OpenType and
 * TrueType collection files. Files without a readable table fall back to
 * their file stem.
 */

use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::FontError;

// @const: Font file extensions the renderer can load
const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

// @const: name table IDs, family first
const NAME_ID_FAMILY: u16 = 1;
const NAME_ID_FULL: u16 = 4;

/// An installed font file and its family name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Source of installed fonts
pub trait FontCatalog: Send + Sync {
    /// Every font the catalog knows, sorted by name
    fn list_fonts(&self) -> Vec<FontEntry>;

    /// Family name declared by a font file
    fn resolve_font_name(&self, path: &Path) -> Result<String, FontError>;

    /// First font whose name contains `name`, ignoring case.
    /// An exact match wins over a substring match.
    fn find_by_name(&self, name: &str) -> Option<FontEntry> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let fonts = self.list_fonts();
        fonts
            .iter()
            .find(|f| f.name.to_lowercase() == needle)
            .or_else(|| fonts.iter().find(|f| f.name.to_lowercase().contains(&needle)))
            .cloned()
    }
}

/// Scans the operating system's font directories
#[derive(Debug, Clone)]
pub struct SystemFontCatalog {
    dirs: Vec<PathBuf>,
}

impl Default for SystemFontCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemFontCatalog {
    /// Catalog over the platform's standard font directories
    pub fn new() -> Self {
        Self { dirs: Self::platform_dirs() }
    }

    /// Catalog over explicit directories
    pub fn with_dirs(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn platform_dirs() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if cfg!(target_os = "macos") {
            candidates.push(PathBuf::from("/System/Library/Fonts"));
            candidates.push(PathBuf::from("/Library/Fonts"));
            if let Some(home) = dirs::home_dir() {
                candidates.push(home.join("Library/Fonts"));
            }
        } else if cfg!(target_os = "windows") {
            let windir = std::env::var_os("WINDIR").unwrap_or_else(|| "C:\\Windows".into());
            candidates.push(PathBuf::from(windir).join("Fonts"));
            if let Some(local) = dirs::data_local_dir() {
                candidates.push(local.join("Microsoft\\Windows\\Fonts"));
            }
        } else {
            candidates.push(PathBuf::from("/usr/share/fonts"));
            candidates.push(PathBuf::from("/usr/local/share/fonts"));
            if let Some(data) = dirs::data_dir() {
                candidates.push(data.join("fonts"));
            }
            if let Some(home) = dirs::home_dir() {
                candidates.push(home.join(".fonts"));
            }
        }

        candidates.retain(|d| d.is_dir());
        candidates
    }

    fn is_font_file(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.as_str()))
    }
}

impl FontCatalog for SystemFontCatalog {
    fn list_fonts(&self) -> Vec<FontEntry> {
        let mut fonts = Vec::new();

        for dir in &self.dirs {
            for entry in WalkDir::new(dir).follow_links(true) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        debug!("Skipping unreadable font directory entry: {}", e);
                        continue;
                    }
                };
                let path = entry.path();
                if !path.is_file() || !Self::is_font_file(path) {
                    continue;
                }

                let name = self
                    .resolve_font_name(path)
                    .unwrap_or_else(|_| file_stem_name(path));
                fonts.push(FontEntry { name, path: path.to_path_buf() });
            }
        }

        fonts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        fonts
    }

    fn resolve_font_name(&self, path: &Path) -> Result<String, FontError> {
        read_family_name(path)
    }
}

/// A fixed set of fonts
#[derive(Debug, Clone, Default)]
pub struct StaticFontCatalog {
    fonts: Vec<FontEntry>,
}

impl StaticFontCatalog {
    pub fn new(fonts: Vec<FontEntry>) -> Self {
        Self { fonts }
    }
}

impl FontCatalog for StaticFontCatalog {
    fn list_fonts(&self) -> Vec<FontEntry> {
        let mut fonts = self.fonts.clone();
        fonts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        fonts
    }

    fn resolve_font_name(&self, path: &Path) -> Result<String, FontError> {
        self.fonts
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.name.clone())
            .ok_or_else(|| FontError::NoName(path.display().to_string()))
    }
}

/// Family name of a font file, falling back to its file stem
pub fn read_family_name(path: &Path) -> Result<String, FontError> {
    let data = std::fs::read(path)
        .map_err(|e| FontError::Read(format!("{}: {}", path.display(), e)))?;

    match parse_family_name(&data) {
        Some(name) => Ok(name),
        None => {
            let stem = file_stem_name(path);
            if stem.is_empty() {
                return Err(FontError::NoName(path.display().to_string()));
            }
            warn!("No family name in {:?}; using file name '{}'", path, stem);
            Ok(stem)
        }
    }
}

fn file_stem_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Family name from raw font bytes.
///
/// Reads the `name` table (of the first face for collections) and prefers
/// name ID 1 over ID 4; within an ID, Windows English records come first,
/// then any Unicode record, then Macintosh Roman.
pub fn parse_family_name(data: &[u8]) -> Option<String> {
    let face_offset = if data.get(0..4)? == b"ttcf" {
        read_u32(data, 12)? as usize
    } else {
        0
    };

    let num_tables = read_u16(data, face_offset + 4)? as usize;
    let name_table = (0..num_tables)
        .map(|i| face_offset + 12 + i * 16)
        .find(|record| data.get(*record..*record + 4) == Some(b"name".as_slice()))
        .and_then(|record| read_u32(data, record + 8))? as usize;

    let count = read_u16(data, name_table + 2)? as usize;
    let storage = name_table + read_u16(data, name_table + 4)? as usize;

    // (rank, name_id_rank, text); lower is better
    let mut best: Option<(u8, u8, String)> = None;

    for i in 0..count {
        let record = name_table + 6 + i * 12;
        let platform = read_u16(data, record)?;
        let encoding = read_u16(data, record + 2)?;
        let language = read_u16(data, record + 4)?;
        let name_id = read_u16(data, record + 6)?;
        let length = read_u16(data, record + 8)? as usize;
        let offset = read_u16(data, record + 10)? as usize;

        let id_rank = match name_id {
            NAME_ID_FAMILY => 0,
            NAME_ID_FULL => 1,
            _ => continue,
        };
        let rank = match (platform, language) {
            (3, 0x0409) => 0,
            (3, _) | (0, _) => 1,
            (1, _) if encoding == 0 => 2,
            _ => continue,
        };

        if best.as_ref().is_some_and(|(r, id, _)| (*id, *r) <= (id_rank, rank)) {
            continue;
        }

        let Some(raw) = data.get(storage + offset..storage + offset + length) else {
            continue;
        };
        let text = if platform == 1 {
            raw.iter().map(|b| *b as char).collect::<String>()
        } else {
            let units: Vec<u16> = raw
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        };

        let text = text.trim().to_string();
        if !text.is_empty() {
            best = Some((rank, id_rank, text));
        }
    }

    best.map(|(_, _, name)| name)
}
