//! Registers downloaded tracks in the iTunes / Music app library

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("couldn't run osascript: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("osascript failed: {0}")]
    Script(String),

    #[error("adding to playlists is only supported on macOS")]
    Unsupported,
}

pub trait PlaylistIntegrator {
    fn add_track_to_playlist(&self, track: &Path, playlist: &str) -> Result<(), PlaylistError>;
}

/// Talks to the Music app through AppleScript
#[derive(Debug, Default, Clone, Copy)]
pub struct AppleScriptIntegrator;

/// AppleScript string literal with quotes and backslashes escaped
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub fn add_to_playlist_script(track: &Path, playlist: &str) -> String {
    format!(
        "tell application \"Music\"\n\
         \tset theTrack to add POSIX file {}\n\
         \tduplicate theTrack to playlist {}\n\
         end tell",
        quote(&track.to_string_lossy()),
        quote(playlist)
    )
}

impl PlaylistIntegrator for AppleScriptIntegrator {
    #[cfg(target_os = "macos")]
    fn add_track_to_playlist(&self, track: &Path, playlist: &str) -> Result<(), PlaylistError> {
        let script = add_to_playlist_script(track, playlist);
        log::debug!("osascript:\n{script}");

        let output = std::process::Command::new("osascript")
            .arg("-e")
            .arg(script)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PlaylistError::Script(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }

    #[cfg(not(target_os = "macos"))]
    fn add_track_to_playlist(&self, _track: &Path, _playlist: &str) -> Result<(), PlaylistError> {
        Err(PlaylistError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::add_to_playlist_script;

    #[test]
    fn script_names_file_and_playlist() {
        let script = add_to_playlist_script(Path::new("/music/A - T1.mp3"), "nehm");

        assert!(script.contains("add POSIX file \"/music/A - T1.mp3\""));
        assert!(script.contains("to playlist \"nehm\""));
    }

    #[test]
    fn script_escapes_quotes() {
        let script = add_to_playlist_script(Path::new("/music/say \"hi\".mp3"), "my \\ list");

        assert!(script.contains(r#""/music/say \"hi\".mp3""#));
        assert!(script.contains(r#""my \\ list""#));
    }
}
