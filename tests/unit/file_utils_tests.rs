/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use chrono::{Local, TimeZone};
use std::fs;
use std::path::{Path, PathBuf};
use capburn::file_utils::{FileManager, FileType};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "exists.tmp", "test content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::file_exists(temp_dir.path()));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test the timestamped output name
#[test]
fn test_captionedOutputPath_shouldUseTimestampedName() {
    let now = Local
        .with_ymd_and_hms(2024, 3, 9, 7, 5, 2)
        .single()
        .expect("valid local time");
    let path = FileManager::captioned_output_path("/tmp/out", now);
    assert_eq!(path, Path::new("/tmp/out/captioned_20240309_070502.mp4"));
}

/// Test the default output directory
#[test]
fn test_defaultOutputDir_shouldUseVideoParentOrCurrentDir() {
    assert_eq!(FileManager::default_output_dir("/videos/clip.mp4"), PathBuf::from("/videos"));
    assert_eq!(FileManager::default_output_dir("clip.mp4"), PathBuf::from("."));
}

/// Test moving a file into a new directory
#[test]
fn test_moveFile_withMissingTargetDir_shouldCreateIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let from = common::create_test_file(temp_dir.path(), "a.txt", "payload")?;
    let to = temp_dir.path().join("sub").join("b.txt");

    FileManager::move_file(&from, &to)?;

    assert!(!from.exists());
    assert_eq!(fs::read_to_string(&to)?, "payload");
    Ok(())
}

/// Test that copying a missing file fails
#[test]
fn test_copyFile_withMissingSource_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::copy_file(temp_dir.path().join("nope"), temp_dir.path().join("x"));
    assert!(result.is_err());
    Ok(())
}

/// Test quiet removal of files, trees and missing paths
#[test]
fn test_removeQuietly_withFilesAndDirs_shouldRemoveThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_file(temp_dir.path(), "f.txt", "x")?;
    let dir = temp_dir.path().join("tree");
    FileManager::ensure_dir(dir.join("deep"))?;
    common::create_test_file(&dir.join("deep"), "g.txt", "y")?;

    FileManager::remove_quietly(&file);
    FileManager::remove_quietly(&dir);
    FileManager::remove_quietly(temp_dir.path().join("missing"));

    assert!(!file.exists());
    assert!(!dir.exists());
    Ok(())
}

/// Test file type detection
#[test]
fn test_detectFileType_withVariousFiles_shouldClassify() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();

    let video = common::create_test_file(dir, "clip.MKV", "")?;
    let srt = common::create_test_file(dir, "clip.srt", "")?;
    let json = common::create_test_file(dir, "clip.json", common::SAMPLE_TRANSCRIPT)?;
    let sniffed = common::create_test_file(dir, "words.txt", common::SAMPLE_TRANSCRIPT)?;
    let other = common::create_test_file(dir, "notes.txt", "hello")?;

    assert_eq!(FileManager::detect_file_type(&video)?, FileType::Video);
    assert_eq!(FileManager::detect_file_type(&srt)?, FileType::Subtitle);
    assert_eq!(FileManager::detect_file_type(&json)?, FileType::Transcript);
    assert_eq!(FileManager::detect_file_type(&sniffed)?, FileType::Transcript);
    assert_eq!(FileManager::detect_file_type(&other)?, FileType::Unknown);
    assert!(FileManager::detect_file_type(dir.join("missing.mp4")).is_err());
    Ok(())
}
