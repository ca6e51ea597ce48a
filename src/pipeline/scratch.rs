//! Scratch files that live only while one track is processed

use std::path::Path;

use tempfile::NamedTempFile;

const SCRATCH_PREFIX: &str = "trackgrab";
const ARTWORK_SUFFIX: &str = ".jpg";

/// Temporary file holding downloaded artwork.
///
/// The file is removed when the value is dropped, whichever way processing ends.
#[derive(Debug)]
pub struct ScratchArtwork {
    file: NamedTempFile,
}

impl ScratchArtwork {
    /// Creates an empty scratch file in `dir`, or in the system temp dir if `dir` is `None`
    pub fn create(dir: Option<&Path>) -> std::io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX).suffix(ARTWORK_SUFFIX);
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
