use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.soundcloud.com";
pub const DEFAULT_CLIENT_ID: &str = "11a37feb6ccc034d5975f3f803928a32";

#[derive(Debug, Deserialize)]
pub struct Config {
    /// In this folder tracks will be downloaded
    pub download_folder: PathBuf,
    /// In this playlist tracks will be added, empty means "don't add"
    #[serde(default)]
    pub itunes_playlist: String,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Defaults for everything except the download folder
    pub fn new(download_folder: PathBuf) -> Config {
        Config {
            download_folder,
            itunes_playlist: String::new(),
            catalog: CatalogConfig::default(),
            fetch: FetchConfig::default(),
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.to_string_lossy()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config TOML")
    }

    /// checks what can't be checked by deserialization alone
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.download_folder.as_os_str().is_empty() {
            bail!("download folder is not set");
        }
        if !self.download_folder.is_dir() {
            bail!(
                "download folder {} doesn't exist or is not a directory",
                self.download_folder.to_string_lossy()
            );
        }
        if let Some(dir) = &self.fetch.scratch_dir {
            if !dir.is_dir() {
                bail!(
                    "scratch directory {} doesn't exist or is not a directory",
                    dir.to_string_lossy()
                );
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            client_id: default_client_id(),
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_client_id() -> String {
    DEFAULT_CLIENT_ID.to_string()
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    /// external `curl` process with a progress bar
    #[default]
    Curl,
    /// in-process HTTP client
    Http,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FetchConfig {
    #[serde(default)]
    pub backend: FetchBackend,
    /// where scratch artwork files are created, system temp dir if not set
    pub scratch_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config_toml() -> anyhow::Result<()> {
        let toml_str = r#"
download_folder = "/home/user/Music"
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert_eq!(cfg.download_folder, PathBuf::from("/home/user/Music"));
        assert_eq!(cfg.itunes_playlist, "");
        assert_eq!(cfg.catalog.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.catalog.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(cfg.fetch.backend, FetchBackend::Curl);
        assert!(cfg.fetch.scratch_dir.is_none());

        Ok(())
    }

    #[test]
    fn test_parse_full_config_toml() -> anyhow::Result<()> {
        let toml_str = r#"
download_folder = "/home/user/Music"
itunes_playlist = "nehm"

[catalog]
api_url = "http://localhost:9000"
client_id = "abc"

[fetch]
backend = "http"
scratch_dir = "/tmp/artwork"
"#;

        let cfg: Config = toml::from_str(toml_str)?;

        assert_eq!(cfg.itunes_playlist, "nehm");
        assert_eq!(cfg.catalog.api_url, "http://localhost:9000");
        assert_eq!(cfg.catalog.client_id, "abc");
        assert_eq!(cfg.fetch.backend, FetchBackend::Http);
        assert_eq!(cfg.fetch.scratch_dir, Some(PathBuf::from("/tmp/artwork")));

        Ok(())
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let toml_str = r#"
download_folder = "/music"

[fetch]
backend = "wget"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_load_and_validate_from_file() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("config.toml");
        std::fs::write(
            &path,
            format!("download_folder = {:?}\n", tmp.path().to_string_lossy()),
        )?;

        let cfg = Config::load(&path)?;
        cfg.validate()?;
        Ok(())
    }

    #[test]
    fn test_validate_rejects_missing_download_folder() -> anyhow::Result<()> {
        let tmp = TempDir::new()?;
        let cfg: Config = toml::from_str(&format!(
            "download_folder = {:?}\n",
            tmp.path().join("missing").to_string_lossy()
        ))?;

        assert!(cfg.validate().is_err());
        Ok(())
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(Config::load(Path::new("/definitely/not/here.toml")).is_err());
    }
}
