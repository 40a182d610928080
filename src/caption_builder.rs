/*!
 * Caption segmentation.
 *
 * Groups a stream of timestamped words into caption units. A single pass
 * keeps one accumulation buffer and decides, word by word, whether the
 * buffer must be flushed before the word is added (long pause, full
 * caption), whether a moderate pause or a full line ends the caption or
 * breaks the line (see [`GapPolicy`]), and whether the word closes a
 * sentence.
 */

use log::debug;
use serde::{Deserialize, Serialize};

use crate::app_config::{GapPolicy, SegmentationConfig};
use crate::transcript::{Transcript, TranscriptSegment};

/// A single timed word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Word text, trimmed and non-empty
    pub text: String,
    /// Start in seconds
    pub start: f64,
    /// End in seconds
    pub end: f64,
}

impl Word {
    pub fn new<S: Into<String>>(text: S, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Whether the word closes a sentence
    pub fn ends_sentence(&self) -> bool {
        matches!(self.text.chars().last(), Some('.' | '!' | '?'))
    }
}

/// One on-screen caption interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionUnit {
    /// Start of the first word
    pub start: f64,
    /// End of the last word
    pub end: f64,
    /// Display lines, each a space-joined run of words
    pub lines: Vec<String>,
    /// The words in display order
    pub words: Vec<Word>,
}

impl CaptionUnit {
    /// Number of words in the unit
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Lines joined with the given separator
    pub fn text_with_separator(&self, separator: &str) -> String {
        self.lines.join(separator)
    }
}

// @enum: Buffered item, either a word or a soft line break
#[derive(Debug, Clone)]
enum BufferItem {
    Word(Word),
    LineBreak,
}

// @struct: In-progress caption
#[derive(Debug, Default)]
struct CaptionBuffer {
    items: Vec<BufferItem>,
    word_count: usize,
    words_on_line: usize,
}

impl CaptionBuffer {
    fn is_empty(&self) -> bool {
        self.word_count == 0
    }

    fn push_word(&mut self, word: Word) {
        self.items.push(BufferItem::Word(word));
        self.word_count += 1;
        self.words_on_line += 1;
    }

    // Never produces an empty line
    fn push_line_break(&mut self) {
        if self.words_on_line > 0 {
            self.items.push(BufferItem::LineBreak);
            self.words_on_line = 0;
        }
    }

    // @returns: Caption built from the buffer, leaving it empty
    fn take_unit(&mut self) -> Option<CaptionUnit> {
        let items = std::mem::take(&mut self.items);
        self.word_count = 0;
        self.words_on_line = 0;

        let mut lines = Vec::new();
        let mut words = Vec::new();
        let mut line: Vec<&str> = Vec::new();

        for item in &items {
            match item {
                BufferItem::Word(word) => {
                    line.push(&word.text);
                    words.push(word.clone());
                }
                BufferItem::LineBreak => {
                    if !line.is_empty() {
                        lines.push(line.join(" "));
                        line.clear();
                    }
                }
            }
        }
        if !line.is_empty() {
            lines.push(line.join(" "));
        }

        let start = words.first()?.start;
        let end = words.last()?.end;
        Some(CaptionUnit {
            start,
            end,
            lines,
            words,
        })
    }
}

/// Builds caption units from a transcript
#[derive(Debug, Clone)]
pub struct CaptionBuilder {
    config: SegmentationConfig,
}

impl CaptionBuilder {
    /// Create a builder; invalid thresholds revert to defaults
    pub fn new(config: SegmentationConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    /// The effective configuration
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Segment a whole transcript
    pub fn build(&self, transcript: &Transcript) -> Vec<CaptionUnit> {
        let words = Self::word_stream(transcript);
        debug!(
            "Segmenting {} words from {} segments",
            words.len(),
            transcript.segments.len()
        );
        self.group(words)
    }

    /// Flatten a transcript into timed words.
    ///
    /// Uses per-word timestamps when the transcript has any; segments
    /// without words then contribute nothing. Only a transcript with no
    /// word timestamps at all gets its segment text spread evenly over
    /// each segment's duration.
    pub fn word_stream(transcript: &Transcript) -> Vec<Word> {
        let per_word = transcript.has_word_timestamps();
        let mut stream = Vec::new();

        for segment in &transcript.segments {
            if !per_word {
                stream.extend(Self::distribute_evenly(segment));
                continue;
            }

            if let Some(words) = &segment.words {
                for w in words {
                    let text = w.word.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let end = w.end.unwrap_or(w.start).max(w.start);
                    stream.push(Word::new(text, w.start, end));
                }
            }
        }

        stream
    }

    // @returns: Segment words with evenly spaced timestamps
    fn distribute_evenly(segment: &TranscriptSegment) -> Vec<Word> {
        let texts: Vec<&str> = segment.text.split_whitespace().collect();
        if texts.is_empty() {
            return Vec::new();
        }

        let span = (segment.end - segment.start).max(0.0);
        let per_word = span / texts.len() as f64;

        texts
            .into_iter()
            .enumerate()
            .map(|(i, text)| {
                let start = segment.start + i as f64 * per_word;
                Word::new(text, start, start + per_word)
            })
            .collect()
    }

    /// Group an ordered word stream into caption units
    pub fn group<I: IntoIterator<Item = Word>>(&self, words: I) -> Vec<CaptionUnit> {
        let cfg = &self.config;
        let continue_ms = cfg.continue_gap_ms as i64;
        let separate_ms = cfg.separate_gap_ms as i64;

        let mut captions = Vec::new();
        let mut current = CaptionBuffer::default();
        let mut last_end: Option<f64> = None;

        for word in words {
            // Compared in whole milliseconds: 1.0 - 0.4 must equal 600 ms
            let gap_ms = last_end
                .map(|end| ((word.start - end) * 1000.0).round() as i64)
                .unwrap_or(0);
            let word_end = word.end;
            let ends_sentence = word.ends_sentence();

            if gap_ms >= separate_ms && !current.is_empty() {
                flush_into(&mut current, &mut captions);
            }
            if current.word_count >= cfg.max_words_per_caption {
                flush_into(&mut current, &mut captions);
            }
            if gap_ms >= continue_ms && gap_ms < separate_ms && !current.is_empty() {
                match cfg.gap_policy {
                    GapPolicy::Flush => flush_into(&mut current, &mut captions),
                    GapPolicy::LineBreak => current.push_line_break(),
                }
            }

            current.push_word(word);

            if current.words_on_line >= cfg.max_words_per_line
                && current.word_count < cfg.max_words_per_caption
            {
                match cfg.gap_policy {
                    GapPolicy::Flush => flush_into(&mut current, &mut captions),
                    GapPolicy::LineBreak => current.push_line_break(),
                }
            }

            if ends_sentence {
                flush_into(&mut current, &mut captions);
            }

            last_end = Some(word_end);
        }

        flush_into(&mut current, &mut captions);
        captions
    }
}

// Flushing an empty buffer is a no-op
fn flush_into(buffer: &mut CaptionBuffer, captions: &mut Vec<CaptionUnit>) {
    if let Some(unit) = buffer.take_unit() {
        captions.push(unit);
    }
}

/// Segment a transcript with the given thresholds
pub fn segment(transcript: &Transcript, config: &SegmentationConfig) -> Vec<CaptionUnit> {
    CaptionBuilder::new(config.clone()).build(transcript)
}
