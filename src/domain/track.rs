use serde::{Deserialize, Serialize};

/// Characters that cannot appear in a file name on at least one common filesystem
const FORBIDDEN_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Describes one remote track to acquire.
///
/// Obtained from the catalog (or a local batch file) and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackDescriptor {
    pub artist: String,
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_year")]
    pub year: Option<i32>,
    pub audio_url: String,
    #[serde(default)]
    pub artwork_url: String,
}

impl TrackDescriptor {
    pub fn new(
        artist: impl Into<String>,
        title: impl Into<String>,
        year: Option<i32>,
        audio_url: impl Into<String>,
        artwork_url: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            year: year.filter(|y| *y > 0),
            audio_url: audio_url.into(),
            artwork_url: artwork_url.into(),
        }
    }

    /// Display name, e.g. `Artist - Title`
    pub fn fullname(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    /// Name of the audio file inside the download folder
    pub fn filename(&self) -> String {
        let base = self
            .fullname()
            .chars()
            .map(|c| {
                if FORBIDDEN_FILENAME_CHARS.contains(&c) || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect::<String>();
        format!("{}.mp3", base.trim())
    }
}

/// a year of 0 means "unknown" in catalog data
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let year = Option::<i32>::deserialize(deserializer)?;
    Ok(year.filter(|y| *y > 0))
}
