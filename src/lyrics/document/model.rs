/*!
 * Core document model types for timed lyrics.
 *
 * These types are JSON-serializable with the wire names used by lyrics
 * services (`type`, `data`, `syllabus`, `chunk`, ...), and carry the timing
 * invariants the clock-driven renderer relies on.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::LyricsError;

/// Timing granularity of a lyrics document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LyricsKind {
    /// One timing per line
    #[default]
    Line,
    /// Per-syllable timing inside each line
    Word,
}

/// Complete timed lyrics document.
///
/// Lines are ordered by start time. For overlay documents (translation,
/// romanization) the line order and count mirror the base document they
/// were produced for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedLyricsDocument {
    /// Line- or word-level timing
    #[serde(rename = "type", default)]
    pub kind: LyricsKind,

    /// Ordered lyric lines
    #[serde(rename = "data", default)]
    pub lines: Vec<LyricLine>,

    /// Document metadata
    #[serde(default)]
    pub metadata: LyricsMetadata,

    /// Whether automatic ad-break suppression is disabled for this document
    #[serde(rename = "ignoreSponsorblock", default)]
    pub ignore_ad_breaks: bool,
}

impl TimedLyricsDocument {
    /// Create a new document from lines.
    pub fn new(kind: LyricsKind, lines: Vec<LyricLine>) -> Self {
        Self {
            kind,
            lines,
            metadata: LyricsMetadata::default(),
            ignore_ad_breaks: false,
        }
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Index of the line active at `time` seconds.
    ///
    /// This is the last line whose start time is not after `time`; `None`
    /// before the first line starts.
    pub fn active_line_index(&self, time: f64) -> Option<usize> {
        let count = self.lines.partition_point(|line| line.start_time <= time);
        count.checked_sub(1)
    }

    /// Start time of the line at `index`.
    pub fn line_start(&self, index: usize) -> Option<f64> {
        self.lines.get(index).map(|line| line.start_time)
    }

    /// Check the timing and shape invariants.
    pub fn validate(&self) -> Result<(), LyricsError> {
        let mut previous_start = 0.0_f64;

        for (index, line) in self.lines.iter().enumerate() {
            line.validate_timing()
                .map_err(|reason| LyricsError::MalformedDocument(format!("line {}: {}", index, reason)))?;

            if line.start_time < previous_start {
                return Err(LyricsError::MalformedDocument(format!(
                    "line {} starts at {:.3}s, before the previous line ({:.3}s)",
                    index, line.start_time, previous_start
                )));
            }
            previous_start = line.start_time;

            if self.kind == LyricsKind::Line && !line.syllables.is_empty() {
                return Err(LyricsError::MalformedDocument(format!(
                    "line {} carries syllables in a line-level document",
                    index
                )));
            }

            let mut previous_syllable_start = f64::MIN;
            for syllable in &line.syllables {
                if syllable.end_time < syllable.start_time || syllable.start_time < previous_syllable_start {
                    return Err(LyricsError::MalformedDocument(format!(
                        "line {} has non-monotonic syllable timing at '{}'",
                        index, syllable.text
                    )));
                }
                previous_syllable_start = syllable.start_time;
            }
        }

        Ok(())
    }
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LyricsMetadata {
    /// Language code of the lyric text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Where the lyrics came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Title reported by the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A single lyric line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricLine {
    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Primary text
    #[serde(default)]
    pub text: String,

    /// Translated text (translation overlay)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_text: Option<String>,

    /// Romanized text (line-level romanization overlay)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romanized_text: Option<String>,

    /// Syllables, only for word-level documents
    #[serde(rename = "syllabus", alias = "chunk", default, skip_serializing_if = "Vec::is_empty")]
    pub syllables: Vec<Syllable>,
}

impl LyricLine {
    /// Create a line without syllables.
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
            ..Default::default()
        }
    }

    /// Attach syllables to the line.
    pub fn with_syllables(mut self, syllables: Vec<Syllable>) -> Self {
        self.syllables = syllables;
        self
    }

    /// Set the translated text.
    pub fn with_translation(mut self, translated_text: impl Into<String>) -> Self {
        self.translated_text = Some(translated_text.into());
        self
    }

    fn validate_timing(&self) -> Result<(), String> {
        if self.start_time < 0.0 || self.end_time < 0.0 {
            return Err("negative timestamp".to_string());
        }
        if self.end_time < self.start_time {
            return Err(format!("ends ({:.3}s) before it starts ({:.3}s)", self.end_time, self.start_time));
        }
        Ok(())
    }
}

/// A timed syllable inside a word-level line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Syllable {
    /// Start time in seconds
    pub start_time: f64,

    /// End time in seconds
    pub end_time: f64,

    /// Source text
    #[serde(default)]
    pub text: String,

    /// Romanized text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub romanized_text: Option<String>,
}

impl Syllable {
    /// Create a syllable without romanization.
    pub fn new(start_time: f64, end_time: f64, text: impl Into<String>) -> Self {
        Self {
            start_time,
            end_time,
            text: text.into(),
            romanized_text: None,
        }
    }
}

/// Metadata of the song lyrics are requested for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    /// Track title
    pub title: String,

    /// Track artist
    pub artist: String,

    /// Album name (empty when unknown)
    #[serde(default)]
    pub album: String,

    /// Duration in seconds (0 when unknown)
    #[serde(default)]
    pub duration: f64,

    /// Media identifier reported by the host player
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,

    /// Which host reported the song
    #[serde(default)]
    pub source: String,
}

impl SongInfo {
    /// Create song info from the host's track fields.
    pub fn new(title: &str, artist: &str, album: Option<&str>, duration: Option<f64>) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.unwrap_or_default().to_string(),
            duration: duration.unwrap_or(0.0),
            media_id: None,
            source: String::new(),
        }
    }

    /// Set the host media identifier.
    pub fn with_media_id(mut self, media_id: &str) -> Self {
        self.media_id = Some(media_id.to_string());
        self
    }

    /// Set the reporting host.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    /// Identity used for de-duplication and staleness checks.
    pub fn identity(&self) -> SongIdentity {
        SongIdentity::new(&self.title, &self.artist, &self.album)
    }
}

/// Immutable identity of a song.
///
/// Two songs with the same title, artist and album are the same song.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SongIdentity {
    title: String,
    artist: String,
    album: String,
}

impl SongIdentity {
    /// Create a new identity.
    pub fn new(title: &str, artist: &str, album: &str) -> Self {
        Self {
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
        }
    }

    /// Track title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Track artist.
    pub fn artist(&self) -> &str {
        &self.artist
    }

    /// Album name.
    pub fn album(&self) -> &str {
        &self.album
    }
}

impl fmt::Display for SongIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.album.is_empty() {
            write!(f, "{} - {}", self.title, self.artist)
        } else {
            write!(f, "{} - {} - {}", self.title, self.artist, self.album)
        }
    }
}
