/*!
 * Tests for caption segmentation
 */

use capburn::app_config::{GapPolicy, SegmentationConfig};
use capburn::caption_builder::{segment, CaptionBuilder, CaptionUnit, Word};
use capburn::transcript::Transcript;
use crate::common;

fn flush_builder() -> CaptionBuilder {
    CaptionBuilder::new(SegmentationConfig::default())
}

fn line_break_builder() -> CaptionBuilder {
    CaptionBuilder::new(SegmentationConfig {
        gap_policy: GapPolicy::LineBreak,
        ..SegmentationConfig::default()
    })
}

fn texts(units: &[CaptionUnit]) -> Vec<String> {
    units
        .iter()
        .flat_map(|u| u.words.iter().map(|w| w.text.clone()))
        .collect()
}

/// Test the basic sentence scenario
#[test]
fn test_group_withShortSentence_shouldYieldOneUnit() {
    let units = flush_builder().group(common::words(&[("Hello,", 0.0, 0.4), ("world.", 0.5, 0.9)]));

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].start, 0.0);
    assert_eq!(units[0].end, 0.9);
    assert_eq!(units[0].lines, vec!["Hello, world."]);
}

/// Test that a long pause always splits captions
#[test]
fn test_group_withLongPause_shouldSplitUnits() {
    for builder in [flush_builder(), line_break_builder()] {
        let units = builder.group(common::words(&[("Hi", 0.0, 0.3), ("there", 1.0, 1.3)]));
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].lines, vec!["Hi"]);
        assert_eq!(units[1].lines, vec!["there"]);
    }
}

/// Test that sentence punctuation ends the caption
#[test]
fn test_group_withSentenceEnd_shouldFlushAfterPunctuation() {
    let units = flush_builder().group(common::words(&[
        ("Stop!", 0.0, 0.2),
        ("Why?", 0.2, 0.4),
        ("Because", 0.4, 0.6),
        ("so.", 0.6, 0.8),
    ]));

    let lines: Vec<Vec<String>> = units.iter().map(|u| u.lines.clone()).collect();
    assert_eq!(lines, vec![vec!["Stop!"], vec!["Why?"], vec!["Because so."]]);
}

/// Test that a moderate pause ends the caption under the flush policy
#[test]
fn test_group_withModeratePauseAndFlushPolicy_shouldSplitUnits() {
    let units = flush_builder().group(common::words(&[("one", 0.0, 0.2), ("two", 0.5, 0.7)]));
    assert_eq!(units.len(), 2);
}

/// Test that a moderate pause breaks the line under the line-break policy
#[test]
fn test_group_withModeratePauseAndLineBreakPolicy_shouldBreakLine() {
    let units = line_break_builder().group(common::words(&[("one", 0.0, 0.2), ("two", 0.5, 0.7)]));

    assert_eq!(units.len(), 1);
    assert_eq!(units[0].lines, vec!["one", "two"]);
    assert_eq!(units[0].end, 0.7);
}

/// Test that a short pause keeps the caption together
#[test]
fn test_group_withShortPause_shouldContinueLine() {
    let units = flush_builder().group(common::words(&[("one", 0.0, 0.2), ("two", 0.35, 0.5)]));
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].lines, vec!["one two"]);
}

/// Test word limits under the flush policy: a full line ends the caption
#[test]
fn test_group_withLongRunAndFlushPolicy_shouldRespectLineLimit() {
    let units = flush_builder().group(common::word_run(12));

    let counts: Vec<usize> = units.iter().map(|u| u.word_count()).collect();
    assert_eq!(counts, vec![5, 5, 2]);
    assert!(units.iter().all(|u| u.lines.len() == 1));
}

/// Test word limits under the line-break policy: two full lines per caption
#[test]
fn test_group_withLongRunAndLineBreakPolicy_shouldRespectCaptionLimit() {
    let units = line_break_builder().group(common::word_run(12));

    assert_eq!(units.len(), 2);
    assert_eq!(units[0].lines, vec!["w1 w2 w3 w4 w5", "w6 w7 w8 w9 w10"]);
    assert_eq!(units[1].lines, vec!["w11 w12"]);
}

/// Test the structural properties over a mixed stream
#[test]
fn test_group_withMixedStream_shouldPreserveWordsAndBounds() {
    let mut input = common::word_run(7);
    input.push(Word::new("pause.", 0.75, 0.9));
    input.push(Word::new("after", 2.0, 2.2));
    input.extend(
        (0..9).map(|i| Word::new(format!("x{}", i), 2.3 + i as f64 * 0.25, 2.5 + i as f64 * 0.25)),
    );

    for builder in [flush_builder(), line_break_builder()] {
        let cfg = builder.config().clone();
        let units = builder.group(input.clone());

        let expected: Vec<String> = input.iter().map(|w| w.text.clone()).collect();
        assert_eq!(texts(&units), expected);

        for unit in &units {
            assert!(!unit.words.is_empty());
            assert_eq!(unit.start, unit.words[0].start);
            assert_eq!(unit.end, unit.words[unit.words.len() - 1].end);
            assert!(unit.word_count() <= cfg.max_words_per_caption);

            let joined: Vec<String> = unit
                .lines
                .iter()
                .flat_map(|l| l.split(' ').map(str::to_string))
                .collect();
            let unit_words: Vec<String> = unit.words.iter().map(|w| w.text.clone()).collect();
            assert_eq!(joined, unit_words);

            for line in &unit.lines {
                assert!(!line.is_empty());
                assert!(line.split(' ').count() <= cfg.max_words_per_line);
            }
        }

        // Separate gap forces a boundary between "pause." and "after"
        assert!(units.iter().any(|u| u.words[0].text == "after"));
    }
}

/// Test segmentation of an empty transcript
#[test]
fn test_segment_withEmptyTranscript_shouldReturnNoUnits() {
    let units = segment(&Transcript::default(), &SegmentationConfig::default());
    assert!(units.is_empty());
}

/// Test segmentation of the sample transcript
#[test]
fn test_segment_withSampleTranscript_shouldTrimWords() -> anyhow::Result<()> {
    let transcript = Transcript::from_json_str(common::SAMPLE_TRANSCRIPT)?;
    let units = segment(&transcript, &SegmentationConfig::default());

    assert_eq!(units.len(), 2);
    assert_eq!(units[0].lines, vec!["Hello, world."]);
    assert_eq!(units[1].lines, vec!["Burn these captions in"]);
    assert_eq!(units[1].start, 1.6);
    assert_eq!(units[1].end, 3.0);
    Ok(())
}

/// Test even word distribution for transcripts without word timestamps
#[test]
fn test_wordStream_withoutWordTimestamps_shouldDistributeEvenly() -> anyhow::Result<()> {
    let transcript = Transcript::from_json_str(
        r#"{"segments":[{"text":" a b  c d ","start":0.0,"end":2.0}]}"#,
    )?;

    let words = CaptionBuilder::word_stream(&transcript);
    let starts: Vec<f64> = words.iter().map(|w| w.start).collect();
    assert_eq!(starts, vec![0.0, 0.5, 1.0, 1.5]);
    assert_eq!(words[3].end, 2.0);

    let units = flush_builder().build(&transcript);
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].lines, vec!["a b c d"]);
    Ok(())
}

/// Test that segments without words are dropped when other segments have word timestamps
#[test]
fn test_wordStream_withMixedSegments_shouldSkipSegmentsWithoutWords() -> anyhow::Result<()> {
    let transcript = Transcript::from_json_str(
        r#"{"segments":[
            {"text":" Hello there.","start":0.0,"end":1.0,"words":[
                {"word":" Hello","start":0.0,"end":0.4},
                {"word":" there.","start":0.5,"end":1.0}
            ]},
            {"text":"[Music]","start":1.5,"end":4.0,"words":[]},
            {"text":"no word list","start":4.0,"end":5.0}
        ]}"#,
    )?;

    let texts: Vec<String> = CaptionBuilder::word_stream(&transcript)
        .into_iter()
        .map(|w| w.text)
        .collect();
    assert_eq!(texts, vec!["Hello", "there."]);

    let units = flush_builder().build(&transcript);
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].lines, vec!["Hello there."]);
    Ok(())
}

/// Test word stream cleanup of blank words and missing end times
#[test]
fn test_wordStream_withBlankWordsAndMissingEnds_shouldClean() -> anyhow::Result<()> {
    let transcript = Transcript::from_json_str(
        r#"{"segments":[{"text":"x","start":0.0,"end":1.0,"words":[
            {"word":"  ","start":0.0,"end":0.1},
            {"word":" ok","start":0.2},
            {"word":" bad","start":0.5,"end":0.4}
        ]}]}"#,
    )?;

    let words = CaptionBuilder::word_stream(&transcript);
    assert_eq!(words.len(), 2);
    assert_eq!(words[0], Word::new("ok", 0.2, 0.2));
    assert_eq!(words[1], Word::new("bad", 0.5, 0.5));
    Ok(())
}

/// Test that invalid thresholds revert to defaults
#[test]
fn test_new_withInvalidThresholds_shouldUseDefaults() {
    let builder = CaptionBuilder::new(SegmentationConfig {
        continue_gap_ms: 800,
        separate_gap_ms: 500,
        max_words_per_line: 0,
        ..SegmentationConfig::default()
    });

    let cfg = builder.config();
    assert_eq!(cfg.continue_gap_ms, 200);
    assert_eq!(cfg.separate_gap_ms, 600);
    assert_eq!(cfg.max_words_per_line, 5);
}
