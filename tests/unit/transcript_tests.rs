/*!
 * Tests for the transcript model
 */

use anyhow::Result;
use capburn::transcript::Transcript;
use crate::common;

/// Test parsing a transcript with word timestamps
#[test]
fn test_fromJsonStr_withWords_shouldParseSegments() -> Result<()> {
    let transcript = Transcript::from_json_str(common::SAMPLE_TRANSCRIPT)?;

    assert_eq!(transcript.len(), 2);
    assert!(transcript.has_word_timestamps());
    let words = transcript.segments[1].words.as_ref().expect("words");
    assert_eq!(words[2].word, " captions");
    assert_eq!(words[2].end, Some(2.6));
    Ok(())
}

/// Test optional fields and extra keys
#[test]
fn test_fromJsonStr_withMissingFields_shouldDefault() -> Result<()> {
    let transcript = Transcript::from_json_str(
        r#"{"language":"en","segments":[{"text":"hi","id":0},{"start":1.0,"words":[]}]}"#,
    )?;

    assert_eq!(transcript.segments[0].start, 0.0);
    assert!(transcript.segments[0].words.is_none());
    assert!(!transcript.has_word_timestamps());
    assert!(Transcript::from_json_str("{}")?.is_empty());
    Ok(())
}

/// Test loading from disk
#[test]
fn test_fromFile_withInvalidJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let bad = common::create_test_file(temp_dir.path(), "bad.json", "[1, 2")?;
    let good = common::create_test_file(temp_dir.path(), "good.json", common::SAMPLE_TRANSCRIPT)?;

    assert!(Transcript::from_file(&bad).is_err());
    assert!(Transcript::from_file(temp_dir.path().join("missing.json")).is_err());
    assert_eq!(Transcript::from_file(&good)?.len(), 2);
    Ok(())
}
