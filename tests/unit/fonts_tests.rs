/*!
 * Tests for font discovery
 */

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use capburn::fonts::{parse_family_name, read_family_name, FontCatalog, FontEntry, StaticFontCatalog, SystemFontCatalog};
use crate::common;

/// Test that the Windows English family name wins
#[test]
fn test_parseFamilyName_withSeveralRecords_shouldPreferWindowsFamily() {
    let bytes = common::build_font_bytes(&[
        (1, 0, 0, 1, "Mac Family"),
        (3, 1, 0x0409, 4, "Nice Sans Bold"),
        (3, 1, 0x0409, 1, "Nice Sans"),
        (3, 1, 0x0407, 1, "Schoene Sans"),
    ]);
    assert_eq!(parse_family_name(&bytes), Some("Nice Sans".to_string()));
}

/// Test the full-name fallback and Macintosh records
#[test]
fn test_parseFamilyName_withoutFamilyRecord_shouldUseFullName() {
    let bytes = common::build_font_bytes(&[(3, 1, 0x0409, 4, "Only Full Name")]);
    assert_eq!(parse_family_name(&bytes), Some("Only Full Name".to_string()));

    let bytes = common::build_font_bytes(&[(1, 0, 0, 1, "Roman Name")]);
    assert_eq!(parse_family_name(&bytes), Some("Roman Name".to_string()));
}

/// Test a collection header pointing at the first face
#[test]
fn test_parseFamilyName_withCollection_shouldReadFirstFace() {
    let face = common::build_font_bytes(&[(3, 1, 0x0409, 1, "Collected")]);
    let header_len = 16u32;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"ttcf");
    bytes.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    bytes.extend_from_slice(&1u32.to_be_bytes());
    bytes.extend_from_slice(&header_len.to_be_bytes());
    // Table offsets are absolute, so shift the face's name table offset
    let mut shifted = face.clone();
    shifted[20..24].copy_from_slice(&(28 + header_len).to_be_bytes());
    bytes.extend_from_slice(&shifted);

    assert_eq!(parse_family_name(&bytes), Some("Collected".to_string()));
}

/// Test the file stem fallback
#[test]
fn test_readFamilyName_withUnparseableFile_shouldUseStem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "Fancy-Regular.ttf", "garbage")?;

    assert_eq!(read_family_name(&path)?, "Fancy-Regular");
    assert!(read_family_name(&temp_dir.path().join("missing.ttf")).is_err());
    Ok(())
}

/// Test scanning a directory of fonts
#[test]
fn test_systemFontCatalog_withDirectory_shouldListFontsSorted() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("nested");
    fs::create_dir_all(&nested)?;
    fs::write(nested.join("b.ttf"), common::build_font_bytes(&[(3, 1, 0x0409, 1, "Zeta Sans")]))?;
    fs::write(temp_dir.path().join("a.OTF"), common::build_font_bytes(&[(3, 1, 0x0409, 1, "Alpha Serif")]))?;
    fs::write(temp_dir.path().join("readme.txt"), "not a font")?;

    let catalog = SystemFontCatalog::with_dirs(vec![temp_dir.path().to_path_buf()]);
    let fonts = catalog.list_fonts();

    let names: Vec<&str> = fonts.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha Serif", "Zeta Sans"]);

    let found = catalog.find_by_name("zeta").expect("zeta font");
    assert_eq!(found.path, nested.join("b.ttf"));
    Ok(())
}

/// Test that an exact name beats a substring match
#[test]
fn test_findByName_withExactAndPartialMatches_shouldPreferExact() {
    let catalog = StaticFontCatalog::new(vec![
        FontEntry { name: "Roboto Condensed".to_string(), path: PathBuf::from("/f/rc.ttf") },
        FontEntry { name: "Roboto".to_string(), path: PathBuf::from("/f/r.ttf") },
    ]);

    assert_eq!(catalog.find_by_name("ROBOTO").map(|f| f.path), Some(PathBuf::from("/f/r.ttf")));
    assert_eq!(catalog.find_by_name("cond").map(|f| f.path), Some(PathBuf::from("/f/rc.ttf")));
    assert!(catalog.find_by_name("  ").is_none());
    assert!(catalog.find_by_name("Lato").is_none());
}
