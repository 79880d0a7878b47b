/*!
 * Tests for merging overlays and resolving display modes
 */

use lyricsync::lyrics::{
    DisplayMode, LyricLine, LyricsKind, TimedLyricsDocument, collapse_to_lines, merge_lyrics, resolve_mode,
};
use crate::common;

/// Every base line gets its overlay fields when overlays are complete
#[test]
fn test_mergeLyrics_withCompleteOverlays_shouldFillEveryLine() {
    let base = common::line_document(&["uno", "dos", "tres"]);
    let translation = common::translation_document(&base, &["one", "two", "three"]);
    let romanization = TimedLyricsDocument::new(
        LyricsKind::Line,
        base.lines.iter().map(|l| LyricLine::new(l.start_time, l.end_time, l.text.to_uppercase())).collect(),
    );

    let merged = merge_lyrics(&base, Some(&translation), Some(&romanization));

    assert_eq!(merged.len(), base.len());
    for (merged_line, base_line) in merged.lines.iter().zip(&base.lines) {
        assert_eq!(merged_line.text, base_line.text);
        assert_eq!(merged_line.start_time, base_line.start_time);
        assert!(merged_line.translated_text.is_some());
        assert_eq!(merged_line.romanized_text.as_deref(), Some(base_line.text.to_uppercase().as_str()));
    }
}

/// Merging does not touch the base document
#[test]
fn test_mergeLyrics_shouldNotMutateBase() {
    let base = common::word_document(&[&["ha", "ru"], &["na", "tsu"]]);
    let snapshot = base.clone();
    let romanization = common::word_document(&[&["HA", "RU"]]);

    let _ = merge_lyrics(&base, None, Some(&romanization));

    assert_eq!(base, snapshot);
}

/// Merging the same inputs twice gives the same document
#[test]
fn test_mergeLyrics_repeated_shouldBeIdempotent() {
    let base = common::line_document(&["a", "b"]);
    let translation = common::translation_document(&base, &["A", "B"]);

    let first = merge_lyrics(&base, Some(&translation), None);
    let second = merge_lyrics(&base, Some(&translation), None);

    assert_eq!(first, second);
}

/// Longer overlays are tolerated
#[test]
fn test_mergeLyrics_withLongerOverlay_shouldIgnoreExtraLines() {
    let base = common::line_document(&["a"]);
    let longer = common::line_document(&["x", "y", "z"]);
    let translation = common::translation_document(&longer, &["X", "Y", "Z"]);

    let merged = merge_lyrics(&base, Some(&translation), None);

    assert_eq!(merged.len(), 1);
    assert_eq!(merged.lines[0].translated_text.as_deref(), Some("X"));
}

/// Word-level romanization lands on syllables, not the line
#[test]
fn test_mergeLyrics_withWordRomanization_shouldSetSyllables() {
    let base = common::word_document(&[&["사", "랑"]]);
    let romanization = common::word_document(&[&["sa", "rang"]]);

    let merged = merge_lyrics(&base, None, Some(&romanization));
    let syllables = &merged.lines[0].syllables;

    assert_eq!(syllables[0].romanized_text.as_deref(), Some("sa"));
    assert_eq!(syllables[1].romanized_text.as_deref(), Some("rang"));
    assert_eq!(merged.lines[0].romanized_text, None);
}

/// Line-level romanization on a word document without chunks uses line text
#[test]
fn test_mergeLyrics_withLineRomanizationOnWordBase_shouldSetLineText() {
    let base = common::word_document(&[&["사", "랑"]]);
    let romanization = common::line_document(&["sarang"]);

    let merged = merge_lyrics(&base, None, Some(&romanization));

    assert_eq!(merged.lines[0].romanized_text.as_deref(), Some("sarang"));
    assert!(merged.lines[0].syllables.iter().all(|s| s.romanized_text.is_none()));
}

/// Collapsing a line document changes nothing
#[test]
fn test_collapseToLines_withLineDocument_shouldBeUnchanged() {
    let base = common::line_document(&["a", "b"]);
    assert_eq!(collapse_to_lines(base.clone()), base);
}

/// Resolved modes never claim missing data
#[test]
fn test_resolveMode_shouldNeverClaimMissingOverlay() {
    let modes = [DisplayMode::None, DisplayMode::Translate, DisplayMode::Romanize, DisplayMode::Both];

    for intended in modes {
        for has_translation in [false, true] {
            for has_romanization in [false, true] {
                let effective = resolve_mode(intended, has_translation, has_romanization);
                assert!(!effective.needs_translation() || has_translation);
                assert!(!effective.needs_romanization() || has_romanization);
            }
        }
    }
}

/// Both degrades to the overlay that arrived
#[test]
fn test_resolveMode_withBothAndOneOverlay_shouldDegrade() {
    assert_eq!(resolve_mode(DisplayMode::Both, false, true), DisplayMode::Romanize);
    assert_eq!(resolve_mode(DisplayMode::Both, true, false), DisplayMode::Translate);
    assert_eq!(resolve_mode(DisplayMode::Translate, false, true), DisplayMode::None);
}
