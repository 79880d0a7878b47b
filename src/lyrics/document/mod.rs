/*!
 * Document model for timed lyrics.
 */

mod model;

pub use model::{
    LyricLine, LyricsKind, LyricsMetadata, SongIdentity, SongInfo, Syllable, TimedLyricsDocument,
};
