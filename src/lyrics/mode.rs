/*!
 * Display mode resolution.
 *
 * The intended mode comes from settings or the user; the effective mode is
 * what the fetched overlays can actually support.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which overlays are shown next to the base lyrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Base lyrics only
    #[default]
    None,
    /// Base lyrics with translation
    Translate,
    /// Base lyrics with romanization
    Romanize,
    /// Base lyrics with translation and romanization
    Both,
}

impl DisplayMode {
    /// Intended mode derived from the translation/romanization settings
    pub fn from_flags(translation_enabled: bool, romanization_enabled: bool) -> Self {
        match (translation_enabled, romanization_enabled) {
            (true, true) => Self::Both,
            (true, false) => Self::Translate,
            (false, true) => Self::Romanize,
            (false, false) => Self::None,
        }
    }

    /// Whether a translation overlay is required
    pub fn needs_translation(self) -> bool {
        matches!(self, Self::Translate | Self::Both)
    }

    /// Whether a romanization overlay is required
    pub fn needs_romanization(self) -> bool {
        matches!(self, Self::Romanize | Self::Both)
    }

    /// Lowercase identifier
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Translate => "translate",
            Self::Romanize => "romanize",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DisplayMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "translate" => Ok(Self::Translate),
            "romanize" => Ok(Self::Romanize),
            "both" => Ok(Self::Both),
            _ => Err(anyhow::anyhow!("Invalid display mode: {}", s)),
        }
    }
}

/// Reconcile the intended mode with the overlays that arrived.
///
/// Never claims a mode the data cannot support: `Both` degrades to whichever
/// overlay is present, and a single-overlay mode without its overlay becomes
/// `None`.
pub fn resolve_mode(intended: DisplayMode, has_translation: bool, has_romanization: bool) -> DisplayMode {
    match intended {
        DisplayMode::Both if has_translation && has_romanization => DisplayMode::Both,
        DisplayMode::Both if has_translation => DisplayMode::Translate,
        DisplayMode::Both if has_romanization => DisplayMode::Romanize,
        DisplayMode::Translate if has_translation => DisplayMode::Translate,
        DisplayMode::Romanize if has_romanization => DisplayMode::Romanize,
        _ => DisplayMode::None,
    }
}
