//! Genre labels
//!
//! The classifier works over a closed set of ten music genres. Labels travel
//! over the wire in lowercase (`"hiphop"`, not `"HipHop"`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the ten genres the classifier can predict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenreLabel {
    Blues,
    Classical,
    Country,
    Disco,
    HipHop,
    Jazz,
    Metal,
    Pop,
    Reggae,
    Rock,
}

impl GenreLabel {
    /// All labels in canonical order
    pub const ALL: [GenreLabel; 10] = [
        GenreLabel::Blues,
        GenreLabel::Classical,
        GenreLabel::Country,
        GenreLabel::Disco,
        GenreLabel::HipHop,
        GenreLabel::Jazz,
        GenreLabel::Metal,
        GenreLabel::Pop,
        GenreLabel::Reggae,
        GenreLabel::Rock,
    ];

    /// Lowercase wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            GenreLabel::Blues => "blues",
            GenreLabel::Classical => "classical",
            GenreLabel::Country => "country",
            GenreLabel::Disco => "disco",
            GenreLabel::HipHop => "hiphop",
            GenreLabel::Jazz => "jazz",
            GenreLabel::Metal => "metal",
            GenreLabel::Pop => "pop",
            GenreLabel::Reggae => "reggae",
            GenreLabel::Rock => "rock",
        }
    }

    /// Parse a label, ignoring case and surrounding whitespace
    pub fn parse(value: &str) -> Option<GenreLabel> {
        let value = value.trim();
        GenreLabel::ALL
            .into_iter()
            .find(|genre| genre.as_str().eq_ignore_ascii_case(value))
    }

    /// Short human-readable description, shown next to results
    pub fn description(&self) -> &'static str {
        match self {
            GenreLabel::Blues => "Blues originated in the Deep South of the United States around the 1860s and is characterized by specific chord progressions and blue notes.",
            GenreLabel::Classical => "Classical music is art music rooted in the traditions of Western culture, typically characterized by complex composition and an emphasis on technique.",
            GenreLabel::Country => "Country music originated in the rural Southern United States in the 1920s, often featuring stringed instruments like guitars, banjos, and fiddles.",
            GenreLabel::Disco => "Disco is dance music that emerged in the 1970s, characterized by four-on-the-floor beats, syncopated basslines, and lush orchestral arrangements.",
            GenreLabel::HipHop => "Hip hop emerged in the United States in the 1970s and is characterized by rhythmic music that commonly accompanies rapping.",
            GenreLabel::Jazz => "Jazz originated in the African-American communities of New Orleans in the late 19th and early 20th centuries, known for swing, complex chords, and improvisation.",
            GenreLabel::Metal => "Metal developed from rock in the late 1960s and early 1970s, with distorted guitars, emphatic rhythms, and dense sound.",
            GenreLabel::Pop => "Pop music took its modern form in the mid-1950s and is characterized by catchy melodies, simple structure, and prominent vocals.",
            GenreLabel::Reggae => "Reggae originated in Jamaica in the late 1960s, characterized by a distinctive rhythm with regular chops on the off-beat.",
            GenreLabel::Rock => "Rock originated as rock and roll in the United States in the late 1940s and early 1950s, typically with a strong backbeat and electric guitars, bass, and drums.",
        }
    }
}

impl fmt::Display for GenreLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the ten labels
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid genre: {0}")]
pub struct UnknownGenre(pub String);

impl FromStr for GenreLabel {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GenreLabel::parse(s).ok_or_else(|| UnknownGenre(s.to_string()))
    }
}
