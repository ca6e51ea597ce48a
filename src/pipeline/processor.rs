use std::{
    fs::File,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};

use crate::{
    domain::track::TrackDescriptor,
    error::AppError,
    pipeline::{
        error::TrackError,
        fetch::Fetcher,
        scratch::ScratchArtwork,
        tag::{TagFields, TagWriter},
    },
    playlist::PlaylistIntegrator,
    ui::Reporter,
};

/// What happened to a whole batch
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub processed: usize,
    /// "fullname: cause" for every failed track, in processing order
    pub failures: Vec<String>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Downloads, tags and optionally registers tracks, one after another
pub struct TracksProcessor<'a> {
    /// In this folder tracks will be downloaded
    download_folder: PathBuf,
    /// In this playlist tracks will be added, empty means "skip"
    itunes_playlist: String,
    scratch_dir: Option<PathBuf>,
    fetcher: &'a dyn Fetcher,
    tagger: &'a dyn TagWriter,
    playlist: &'a dyn PlaylistIntegrator,
    reporter: &'a dyn Reporter,
}

impl<'a> TracksProcessor<'a> {
    pub fn new(
        download_folder: impl Into<PathBuf>,
        fetcher: &'a dyn Fetcher,
        tagger: &'a dyn TagWriter,
        playlist: &'a dyn PlaylistIntegrator,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            download_folder: download_folder.into(),
            itunes_playlist: String::new(),
            scratch_dir: None,
            fetcher,
            tagger,
            playlist,
            reporter,
        }
    }

    pub fn with_itunes_playlist(mut self, playlist: impl Into<String>) -> Self {
        self.itunes_playlist = playlist.into();
        self
    }

    pub fn with_scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    pub fn track_path(&self, track: &TrackDescriptor) -> PathBuf {
        self.download_folder.join(track.filename())
    }

    /// Processes all tracks starting with the last one.
    ///
    /// A failed track never stops the batch, its cause ends up in [`BatchReport::failures`].
    pub fn process_all(&self, tracks: &[TrackDescriptor]) -> Result<BatchReport, AppError> {
        if tracks.is_empty() {
            return Err(AppError::NothingToDo);
        }
        info!("processing {} tracks", tracks.len());

        let mut failures = Vec::new();
        for track in tracks.iter().rev() {
            if let Err(e) = self.process(track) {
                if e.is_fatal() {
                    warn!("{} was not downloaded", track.fullname());
                }
                self.reporter.error(
                    &format!("there was an error while downloading {}", track.fullname()),
                    &e,
                );
                failures.push(format!("{}: {}", track.fullname(), e));
            }
            self.reporter.println("");
        }

        if !failures.is_empty() {
            warn!("{} of {} tracks failed", failures.len(), tracks.len());
            self.reporter
                .failure("There were errors while downloading tracks:");
            for failure in &failures {
                self.reporter.failure(&format!("  {failure}"));
            }
            self.reporter.println("");
        }

        self.reporter.success("Done!");
        Ok(BatchReport {
            processed: tracks.len(),
            failures,
        })
    }

    /// Downloads, tags and adds one track to the playlist.
    ///
    /// Only failures before the audio is on disk stop processing. Later stages
    /// run regardless and the most recent failure among them is returned.
    pub fn process(&self, track: &TrackDescriptor) -> Result<(), TrackError> {
        self.reporter
            .println(&format!("Downloading {}", track.fullname()));

        let track_path = self.track_path(track);
        File::create(&track_path).map_err(TrackError::CreateFile)?;
        self.fetcher
            .fetch(&track.audio_url, &track_path)
            .map_err(TrackError::Download)?;
        debug!("audio of {} is at {}", track.fullname(), track_path.to_string_lossy());

        let mut last_error = None;

        // removed when dropped at the end of this function
        let artwork = if track.artwork_url.trim().is_empty() {
            debug!("{} has no artwork", track.fullname());
            None
        } else {
            match ScratchArtwork::create(self.scratch_dir.as_deref()) {
                Ok(artwork) => Some(artwork),
                Err(e) => {
                    warn!("no artwork for {}: {e}", track.fullname());
                    last_error = Some(TrackError::CreateArtwork(e));
                    None
                }
            }
        };

        let artwork_path = match &artwork {
            Some(artwork) => self.download_artwork(track, artwork.path(), &mut last_error),
            None => None,
        };

        let fields = TagFields {
            artist: &track.artist,
            title: &track.title,
            year: track.year,
        };
        if let Err(e) = self.tagger.tag(&track_path, &fields, artwork_path) {
            warn!("tagging {} failed: {e}", track_path.to_string_lossy());
            last_error = Some(e.into());
        }

        if !self.itunes_playlist.is_empty() {
            self.reporter.println("Adding to iTunes");
            if let Err(e) = self
                .playlist
                .add_track_to_playlist(&track_path, &self.itunes_playlist)
            {
                last_error = Some(e.into());
            }
        }

        drop(artwork);

        match last_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// returns the artwork path only if the download succeeded
    fn download_artwork<'p>(
        &self,
        track: &TrackDescriptor,
        path: &'p Path,
        last_error: &mut Option<TrackError>,
    ) -> Option<&'p Path> {
        self.reporter.println("Downloading artwork");
        match self.fetcher.fetch(&track.artwork_url, path) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!("artwork of {} not downloaded: {e}", track.fullname());
                *last_error = Some(TrackError::DownloadArtwork(e));
                None
            }
        }
    }
}
