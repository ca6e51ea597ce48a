use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::catalog::client::CatalogClient;
use crate::config::{self, FetchBackend};
use crate::domain::track::TrackDescriptor;
use crate::error::AppError;
use crate::pipeline::fetch::{CurlFetcher, Fetcher, HttpFetcher};
use crate::pipeline::processor::{BatchReport, TracksProcessor};
use crate::pipeline::tag::Id3TagWriter;
use crate::playlist::AppleScriptIntegrator;
use crate::ui::{Reporter, TerminalReporter};

const EXIT_OK: u8 = 0;
/// configuration, catalog or input problems
const EXIT_ERROR: u8 = 1;
/// Exit code of `--strict` runs in which some tracks failed
const EXIT_TRACKS_FAILED: u8 = 2;

#[derive(Parser)]
#[command(name = "trackgrab")]
#[command(version = "0.1")]
#[command(about = "Downloads tracks, tags them and adds them to your iTunes playlist")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Download folder, overrides the config
    #[arg(short = 'f', long)]
    pub dl_folder: Option<PathBuf>,

    /// iTunes playlist to add tracks to, overrides the config
    #[arg(short = 'i', long)]
    pub playlist: Option<String>,

    /// Exit with a non-zero code if any track failed
    #[arg(long)]
    pub strict: bool,

    /// More log output, repeat for even more
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download the track or playlist behind a URL
    Get { url: String },
    /// Search tracks and download the results
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Download tracks liked by a user
    Favorites {
        user_id: String,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
        #[arg(short, long, default_value_t = 0)]
        offset: u32,
    },
    /// Download tracks listed in a JSON file
    Batch { file: PathBuf },
}

/// Entrypoint for CLI, the only place that decides the exit code
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let reporter = TerminalReporter;
    let result = execute(&cli, &reporter);
    match &result {
        Ok(report) => log::info!(
            "{} tracks processed, {} failed",
            report.processed,
            report.failures.len()
        ),
        Err(e) => {
            log::debug!("{e:?}");
            reporter.failure(&e.to_string());
        }
    }
    ExitCode::from(exit_code(cli.strict, &result))
}

/// A finished batch is a success even if tracks failed, unless `strict` is set
fn exit_code(strict: bool, result: &Result<BatchReport, AppError>) -> u8 {
    match result {
        Ok(report) if strict && report.has_failures() => EXIT_TRACKS_FAILED,
        Ok(_) => EXIT_OK,
        Err(_) => EXIT_ERROR,
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(cli: &Cli) -> anyhow::Result<config::Config> {
    let mut cfg = match &cli.dl_folder {
        // flags alone are enough when there is no config file
        Some(folder) if !cli.config.exists() => config::Config::new(folder.clone()),
        _ => config::Config::load(&cli.config)?,
    };
    if let Some(folder) = &cli.dl_folder {
        cfg.download_folder = folder.clone();
    }
    if let Some(playlist) = &cli.playlist {
        cfg.itunes_playlist = playlist.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_batch(path: &Path) -> anyhow::Result<Vec<TrackDescriptor>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.to_string_lossy()))?;
    serde_json::from_str(&contents).with_context(|| "Failed to parse track list JSON")
}

fn execute(cli: &Cli, reporter: &dyn Reporter) -> Result<BatchReport, AppError> {
    let cfg = load_config(cli).map_err(AppError::Config)?;

    let tracks = match &cli.command {
        Commands::Batch { file } => load_batch(file).map_err(AppError::BatchFile)?,
        Commands::Get { url } => CatalogClient::new(&cfg.catalog, reporter).resolve(url)?,
        Commands::Search { query, limit } => {
            CatalogClient::new(&cfg.catalog, reporter).search(&query.join(" "), *limit)?
        }
        Commands::Favorites {
            user_id,
            limit,
            offset,
        } => CatalogClient::new(&cfg.catalog, reporter).favorites_of(user_id, *limit, *offset)?,
    };

    let curl = CurlFetcher;
    let http = HttpFetcher::new();
    let fetcher: &dyn Fetcher = match cfg.fetch.backend {
        FetchBackend::Curl => &curl,
        FetchBackend::Http => &http,
    };
    let tagger = Id3TagWriter;
    let playlist = AppleScriptIntegrator;

    TracksProcessor::new(cfg.download_folder, fetcher, &tagger, &playlist, reporter)
        .with_itunes_playlist(cfg.itunes_playlist)
        .with_scratch_dir(cfg.fetch.scratch_dir)
        .process_all(&tracks)
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use tempfile::TempDir;

    use super::{Cli, Commands, exit_code, execute, load_batch, load_config};
    use crate::{
        error::AppError, pipeline::processor::BatchReport, ui::testing::RecordingReporter,
    };

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_search_with_options() {
        let cli = Cli::try_parse_from([
            "trackgrab", "--strict", "-vv", "-i", "nehm", "search", "deep", "house", "-l", "3",
        ])
        .unwrap();

        assert!(cli.strict);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.playlist.as_deref(), Some("nehm"));
        match cli.command {
            Commands::Search { query, limit } => {
                assert_eq!(query, vec!["deep", "house"]);
                assert_eq!(limit, 3);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn flags_replace_missing_config_file() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let folder = tmp.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from([
            "trackgrab",
            "--config",
            "/no/such/config.toml",
            "--dl-folder",
            &folder,
            "get",
            "https://soundcloud.com/a/b",
        ])?;

        let cfg = load_config(&cli)?;

        assert_eq!(cfg.download_folder, tmp.path());
        assert_eq!(cfg.itunes_playlist, "");
        Ok(())
    }

    #[test]
    fn loads_batch_file() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("tracks.json");
        std::fs::write(
            &path,
            r#"[
                {"artist": "A", "title": "T1", "year": 2020, "audio_url": "https://a/1", "artwork_url": "https://a/1.jpg"},
                {"artist": "B", "title": "T2", "year": 0, "audio_url": "https://a/2"}
            ]"#,
        )?;

        let tracks = load_batch(&path)?;

        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].year, Some(2020));
        assert_eq!(tracks[1].year, None);
        Ok(())
    }

    #[test]
    fn empty_batch_ends_with_nothing_to_do() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let batch = tmp.path().join("tracks.json");
        std::fs::write(&batch, "[]")?;
        let folder = tmp.path().to_string_lossy().to_string();
        let batch_arg = batch.to_string_lossy().to_string();
        let cli = Cli::try_parse_from([
            "trackgrab",
            "--config",
            "/no/such/config.toml",
            "-f",
            &folder,
            "batch",
            &batch_arg,
        ])?;
        let reporter = RecordingReporter::default();

        let result = execute(&cli, &reporter);

        assert!(matches!(result, Err(AppError::NothingToDo)));
        assert!(!reporter.contains("Done!"));
        Ok(())
    }

    #[test]
    fn missing_config_is_a_config_error() {
        let cli = Cli::try_parse_from([
            "trackgrab",
            "--config",
            "/no/such/config.toml",
            "batch",
            "tracks.json",
        ])
        .unwrap();
        let reporter = RecordingReporter::default();

        assert!(matches!(
            execute(&cli, &reporter),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn failed_tracks_only_change_exit_code_when_strict() {
        let with_failures = Ok(BatchReport {
            processed: 3,
            failures: vec!["B - T2: couldn't download track: transfer exit status: 22".to_string()],
        });
        let clean = Ok(BatchReport {
            processed: 3,
            failures: Vec::new(),
        });

        assert_eq!(exit_code(false, &with_failures), 0);
        assert_eq!(exit_code(true, &with_failures), 2);
        assert_eq!(exit_code(true, &clean), 0);
    }

    #[test]
    fn app_errors_exit_with_one() {
        assert_eq!(exit_code(false, &Err(AppError::NothingToDo)), 1);
        assert_eq!(exit_code(true, &Err(AppError::NothingToDo)), 1);
    }
}
