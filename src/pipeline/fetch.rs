//! Blocking transfer of remote content into local files

use std::{
    fs::File,
    io::{self, Read, Write},
    path::Path,
    process::{Command, Stdio},
};

use log::debug;

use crate::pipeline::error::FetchError;

const SUPPORTED_SCHEMES: &[&str] = &["http://", "https://", "file://"];
/// ureq knows nothing about `file://`
const HTTP_SCHEMES: &[&str] = &["http://", "https://"];

/// Progress is redrawn every time this many bytes arrived
const PROGRESS_STEP: u64 = 64 * 1024;

/// Downloads the content behind `url` into `dest`, overwriting it.
///
/// One attempt only, a failure is returned to the caller as is.
pub trait Fetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}

pub fn validate_url(url: &str) -> Result<(), FetchError> {
    validate_url_for(url, SUPPORTED_SCHEMES)
}

fn validate_url_for(url: &str, schemes: &[&str]) -> Result<(), FetchError> {
    let lower = url.trim().to_ascii_lowercase();
    if schemes
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
    {
        Ok(())
    } else {
        Err(FetchError::InvalidUrl(url.to_string()))
    }
}

/// Runs `curl`, which draws its progress bar straight into the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct CurlFetcher;

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        validate_url(url)?;
        debug!("curl {} -> {}", url, dest.to_string_lossy());

        let status = Command::new("curl")
            .arg("-#")
            .arg("--fail")
            .arg("-o")
            .arg(dest)
            .arg("-L")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| FetchError::Spawn {
                program: "curl",
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(FetchError::Status(status))
        }
    }
}

/// Streams the response body with an in-process client, redirects are followed
#[derive(Debug)]
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().redirects(8).build(),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        validate_url_for(url, HTTP_SCHEMES)?;
        debug!("GET {} -> {}", url, dest.to_string_lossy());

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        let total = response
            .header("Content-Length")
            .and_then(|len| len.trim().parse().ok());
        let mut reader = ProgressReader::new(response.into_reader(), total, io::stderr());
        let mut file = File::create(dest)?;
        let written = io::copy(&mut reader, &mut file)?;
        reader.finish()?;
        file.sync_all()?;

        debug!("{written} bytes written to {}", dest.to_string_lossy());
        Ok(())
    }
}

/// Counts bytes read through it and draws a one-line progress indicator
struct ProgressReader<R, W: Write> {
    inner: R,
    out: W,
    total: Option<u64>,
    read: u64,
    drawn_at: u64,
}

impl<R: Read, W: Write> ProgressReader<R, W> {
    fn new(inner: R, total: Option<u64>, out: W) -> Self {
        Self {
            inner,
            out,
            total,
            read: 0,
            drawn_at: 0,
        }
    }

    fn draw(&mut self) -> io::Result<()> {
        let kib = self.read / 1024;
        match self.total {
            Some(total) if total > 0 => {
                let percent = (self.read.min(total) * 100) / total;
                write!(self.out, "\r{kib} / {} KiB {percent:>3}%", total / 1024)?;
            }
            _ => write!(self.out, "\r{kib} KiB")?,
        }
        self.drawn_at = self.read;
        self.out.flush()
    }

    /// final state followed by a newline
    fn finish(&mut self) -> io::Result<()> {
        self.draw()?;
        writeln!(self.out)
    }
}

impl<R: Read, W: Write> Read for ProgressReader<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        if self.read - self.drawn_at >= PROGRESS_STEP {
            self.draw()?;
        }
        Ok(n)
    }
}
