//! JSON shapes returned by the catalog API

use serde::Deserialize;
use serde_json::Value;

use crate::{catalog::error::CatalogError, domain::track::TrackDescriptor};

const ARTWORK_SMALL: &str = "-large.";
const ARTWORK_BIG: &str = "-t500x500.";

#[derive(Debug, Deserialize)]
pub(crate) struct RawTrack {
    pub title: String,
    pub user: RawUser,
    pub artwork_url: Option<String>,
    pub stream_url: Option<String>,
    pub streamable: Option<bool>,
    pub release_year: Option<i32>,
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawUser {
    pub username: String,
    pub avatar_url: Option<String>,
}

impl RawTrack {
    /// `None` if the track can't be streamed
    pub fn into_descriptor(self, client_id: &str) -> Option<TrackDescriptor> {
        if self.streamable == Some(false) {
            return None;
        }
        let stream_url = self.stream_url.filter(|u| !u.is_empty())?;

        // uploaders often put "Artist - Title" into the title
        let (artist, title) = match self.title.split_once(" - ") {
            Some((artist, title)) if !artist.trim().is_empty() && !title.trim().is_empty() => {
                (artist.trim().to_string(), title.trim().to_string())
            }
            _ => (self.user.username.clone(), self.title.trim().to_string()),
        };

        let year = self.release_year.filter(|y| *y > 0).or_else(|| {
            self.created_at
                .as_deref()
                .and_then(|date| date.get(..4))
                .and_then(|y| y.parse().ok())
        });

        let artwork_url = self
            .artwork_url
            .or(self.user.avatar_url)
            .map(|url| bigger_artwork(&url))
            .unwrap_or_default();

        let separator = if stream_url.contains('?') { '&' } else { '?' };
        let audio_url = format!(
            "{stream_url}{separator}client_id={}",
            urlencoding::encode(client_id)
        );

        Some(TrackDescriptor::new(
            artist,
            title,
            year,
            audio_url,
            artwork_url,
        ))
    }
}

/// Asks for the 500x500 variant, only the file name carries the size token
fn bigger_artwork(url: &str) -> String {
    match url.rsplit_once('/') {
        Some((base, file)) => format!("{base}/{}", file.replacen(ARTWORK_SMALL, ARTWORK_BIG, 1)),
        None => url.to_string(),
    }
}

/// Track objects of a response body.
///
/// Accepts a single track, a playlist, a plain array or a paginated `collection`.
pub(crate) fn raw_tracks(body: &str) -> Result<Vec<RawTrack>, CatalogError> {
    let value: Value = serde_json::from_str(body)?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut object) => {
            if let Some(Value::Array(items)) = object.remove("collection") {
                items
            } else {
                let kind = object
                    .get("kind")
                    .and_then(Value::as_str)
                    .unwrap_or("track")
                    .to_string();
                match kind.as_str() {
                    "track" => vec![Value::Object(object)],
                    "playlist" => match object.remove("tracks") {
                        Some(Value::Array(items)) => items,
                        _ => Vec::new(),
                    },
                    _ => return Err(CatalogError::UnexpectedKind(kind)),
                }
            }
        }
        other => return Err(CatalogError::UnexpectedKind(other.to_string())),
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(CatalogError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{bigger_artwork, raw_tracks};
    use crate::catalog::error::CatalogError;

    const TRACK: &str = r#"{
        "kind": "track",
        "title": "Artist X - Song Y",
        "user": {"username": "uploader", "avatar_url": "https://i1/avatar-large.jpg"},
        "artwork_url": "https://i1/artworks-000-large.jpg",
        "stream_url": "https://api/tracks/1/stream",
        "streamable": true,
        "release_year": null,
        "created_at": "2016/03/04 10:00:00 +0000"
    }"#;

    #[test]
    fn single_track_becomes_descriptor() -> anyhow::Result<()> {
        let mut tracks = raw_tracks(TRACK)?;
        assert_eq!(tracks.len(), 1);

        let track = tracks.remove(0).into_descriptor("cid").unwrap();
        assert_eq!(track.artist, "Artist X");
        assert_eq!(track.title, "Song Y");
        assert_eq!(track.year, Some(2016));
        assert_eq!(track.artwork_url, "https://i1/artworks-000-t500x500.jpg");
        assert_eq!(track.audio_url, "https://api/tracks/1/stream?client_id=cid");
        Ok(())
    }

    #[test]
    fn plain_title_uses_uploader_and_avatar() -> anyhow::Result<()> {
        let body = r#"[{
            "title": "Untitled",
            "user": {"username": "uploader", "avatar_url": "https://i1/avatar-large.jpg"},
            "stream_url": "https://api/tracks/2/stream?secret=1",
            "release_year": 1999
        }]"#;

        let track = raw_tracks(body)?.remove(0).into_descriptor("cid").unwrap();
        assert_eq!(track.artist, "uploader");
        assert_eq!(track.title, "Untitled");
        assert_eq!(track.year, Some(1999));
        assert_eq!(track.artwork_url, "https://i1/avatar-t500x500.jpg");
        assert_eq!(
            track.audio_url,
            "https://api/tracks/2/stream?secret=1&client_id=cid"
        );
        Ok(())
    }

    #[test]
    fn non_streamable_tracks_are_dropped() -> anyhow::Result<()> {
        let body = r#"{"collection": [
            {"title": "a", "user": {"username": "u"}, "streamable": false, "stream_url": "https://s"},
            {"title": "b", "user": {"username": "u"}}
        ]}"#;

        let tracks = raw_tracks(body)?;
        assert_eq!(tracks.len(), 2);
        assert!(
            tracks
                .into_iter()
                .all(|t| t.into_descriptor("cid").is_none())
        );
        Ok(())
    }

    #[test]
    fn playlist_yields_its_tracks() -> anyhow::Result<()> {
        let body = format!(r#"{{"kind": "playlist", "tracks": [{TRACK}, {TRACK}]}}"#);
        assert_eq!(raw_tracks(&body)?.len(), 2);
        Ok(())
    }

    #[test]
    fn artwork_size_is_changed_in_file_name_only() {
        assert_eq!(
            bigger_artwork("https://large.cdn/large/artworks-large-000-large.jpg"),
            "https://large.cdn/large/artworks-large-000-t500x500.jpg"
        );
        assert_eq!(
            bigger_artwork("https://i1/avatar-original.png"),
            "https://i1/avatar-original.png"
        );
    }

    #[test]
    fn user_is_rejected() {
        let body = r#"{"kind": "user", "username": "u"}"#;
        assert!(matches!(
            raw_tracks(body),
            Err(CatalogError::UnexpectedKind(kind)) if kind == "user"
        ));
    }
}
