use std::process::ExitStatus;

use thiserror::Error;

use crate::playlist::PlaylistError;

/// Failure of a single remote transfer
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url '{0}'")]
    InvalidUrl(String),

    #[error("couldn't run {program}: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("transfer {0}")]
    Status(ExitStatus),

    #[error("request failed: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("couldn't write downloaded data: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum TagError {
    #[error("couldn't read artwork file: {0}")]
    ReadArtwork(#[source] std::io::Error),

    #[error("couldn't save tag: {0}")]
    Save(#[from] id3::Error),
}

/// Why processing of a track failed, one variant per stage
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("couldn't create track file: {0}")]
    CreateFile(#[source] std::io::Error),

    #[error("couldn't download track: {0}")]
    Download(#[source] FetchError),

    #[error("couldn't create artwork file: {0}")]
    CreateArtwork(#[source] std::io::Error),

    #[error("couldn't download artwork file: {0}")]
    DownloadArtwork(#[source] FetchError),

    #[error("there was an error while tagging track: {0}")]
    Tag(#[from] TagError),

    #[error("couldn't add track to playlist: {0}")]
    Playlist(#[from] PlaylistError),
}

impl TrackError {
    /// true if the error stopped processing before the audio was obtained
    pub fn is_fatal(&self) -> bool {
        matches!(self, TrackError::CreateFile(_) | TrackError::Download(_))
    }
}
