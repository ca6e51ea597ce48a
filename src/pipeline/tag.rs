//! Embeds ID3 metadata and cover art into downloaded tracks

use std::path::Path;

use id3::frame::{Picture, PictureType};
use id3::{Tag, TagLike, Version};
use log::{debug, warn};

use crate::pipeline::error::TagError;

const COVER_MIME: &str = "image/jpeg";

/// Text fields written into every track
#[derive(Debug, Clone, Copy)]
pub struct TagFields<'a> {
    pub artist: &'a str,
    pub title: &'a str,
    pub year: Option<i32>,
}

pub trait TagWriter {
    /// Writes `fields` and, if `artwork` points to a non-empty file, a front cover.
    ///
    /// Missing or empty artwork is not an error by itself, the track is just tagged without a picture.
    fn tag(
        &self,
        audio: &Path,
        fields: &TagFields<'_>,
        artwork: Option<&Path>,
    ) -> Result<(), TagError>;
}

/// Writes ID3v2.3 tags, replacing whatever tag the file had before
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3TagWriter;

impl TagWriter for Id3TagWriter {
    fn tag(
        &self,
        audio: &Path,
        fields: &TagFields<'_>,
        artwork: Option<&Path>,
    ) -> Result<(), TagError> {
        // existing frames are not parsed, a fresh tag overwrites them
        let mut tag = Tag::new();
        tag.set_artist(fields.artist);
        tag.set_title(fields.title);
        if let Some(year) = fields.year {
            tag.set_year(year);
        }

        let mut result = Ok(());

        let artwork_bytes = match artwork.map(std::fs::read).transpose() {
            Ok(bytes) => bytes.unwrap_or_default(),
            Err(e) => {
                warn!("artwork for {} is unreadable: {e}", audio.to_string_lossy());
                result = Err(TagError::ReadArtwork(e));
                Vec::new()
            }
        };

        if !artwork_bytes.is_empty() {
            debug!("attaching {} bytes of cover art", artwork_bytes.len());
            tag.add_frame(Picture {
                mime_type: COVER_MIME.to_string(),
                picture_type: PictureType::CoverFront,
                description: String::new(),
                data: artwork_bytes,
            });
        }

        tag.write_to_path(audio, Version::Id3v23)?;

        result
    }
}
