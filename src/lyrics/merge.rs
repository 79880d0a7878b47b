/*!
 * Merging of base lyrics with translation and romanization overlays.
 *
 * Overlays are aligned with the base strictly by line index (and, for
 * word-level lyrics, by syllable index). Overlays shorter or longer than the
 * base are tolerated: unmatched indices are simply left alone.
 */

use log::debug;

use super::document::{LyricLine, LyricsKind, TimedLyricsDocument};

/// Combine a base document with optional overlays into one document.
///
/// The base is never modified; the result is a deep copy with overlay
/// fields filled in.
pub fn merge_lyrics(
    base: &TimedLyricsDocument,
    translation: Option<&TimedLyricsDocument>,
    romanization: Option<&TimedLyricsDocument>,
) -> TimedLyricsDocument {
    log_cardinality_mismatch("translation", base, translation);
    log_cardinality_mismatch("romanization", base, romanization);

    let mut merged = base.clone();
    let word_level = base.kind == LyricsKind::Word;

    for (index, line) in merged.lines.iter_mut().enumerate() {
        if let Some(translated) = translation
            .and_then(|doc| doc.lines.get(index))
            .and_then(|overlay| non_empty(overlay.translated_text.as_deref()))
        {
            line.translated_text = Some(translated.to_string());
        }

        if let Some(romanized) = romanization.and_then(|doc| doc.lines.get(index)) {
            apply_romanization(line, romanized, word_level);
        }
    }

    merged
}

fn apply_romanization(line: &mut LyricLine, romanized: &LyricLine, word_level: bool) {
    if word_level && !romanized.syllables.is_empty() && !line.syllables.is_empty() {
        for (index, syllable) in line.syllables.iter_mut().enumerate() {
            let text = romanized
                .syllables
                .get(index)
                .and_then(|chunk| non_empty(Some(chunk.text.as_str())))
                .unwrap_or(syllable.text.as_str());
            syllable.romanized_text = Some(text.to_string());
        }
    } else if let Some(text) = non_empty(Some(romanized.text.as_str())) {
        line.romanized_text = Some(text.to_string());
    }
}

/// Collapse word-level timing to line-level timing.
///
/// Syllables are dropped. A line whose romanization only existed per
/// syllable keeps it as line-level text so romanized display is not lost.
pub fn collapse_to_lines(document: TimedLyricsDocument) -> TimedLyricsDocument {
    if document.kind != LyricsKind::Word {
        return document;
    }

    let mut collapsed = document;
    collapsed.kind = LyricsKind::Line;

    for line in &mut collapsed.lines {
        if line.romanized_text.is_none() && line.syllables.iter().any(|s| s.romanized_text.is_some()) {
            let joined: String = line
                .syllables
                .iter()
                .map(|s| s.romanized_text.as_deref().unwrap_or(s.text.as_str()))
                .collect();
            line.romanized_text = Some(joined);
        }
        line.syllables.clear();
    }

    collapsed
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|t| !t.is_empty())
}

fn log_cardinality_mismatch(kind: &str, base: &TimedLyricsDocument, overlay: Option<&TimedLyricsDocument>) {
    if let Some(overlay) = overlay {
        if overlay.len() != base.len() {
            debug!(
                "{} overlay has {} lines, base has {}; merging the common prefix",
                kind,
                overlay.len(),
                base.len()
            );
        }
    }
}
