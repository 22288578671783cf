use crate::error::{Result, ResultExt};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_PATH: &str = "data/config.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub server: ServerConfig,
  #[serde(default)]
  pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  pub bind_addr: String,
  pub db_path: PathBuf,
  #[serde(default = "default_pool_size")]
  pub pool_size: u32,
  /// how long a call waits for a pooled connection
  #[serde(default = "default_connection_timeout_ms")]
  pub connection_timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
  #[serde(default = "default_static_dir")]
  pub static_dir: PathBuf,
  #[serde(default = "default_title")]
  pub title: String,
}

impl Default for WebConfig {
  fn default() -> Self {
    WebConfig {
      static_dir: default_static_dir(),
      title: default_title(),
    }
  }
}

fn default_pool_size() -> u32 {
  4
}

fn default_connection_timeout_ms() -> u64 {
  5000
}

fn default_static_dir() -> PathBuf {
  PathBuf::from("data/static")
}

fn default_title() -> String {
  "Surf Companion".to_string()
}

#[cfg(test)]
impl Config {
  /// Config pointing at an explicit data file, everything else defaulted.
  pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
    Config {
      server: ServerConfig {
        bind_addr: "127.0.0.1:8080".to_string(),
        db_path: db_path.into(),
        pool_size: default_pool_size(),
        connection_timeout_ms: default_connection_timeout_ms(),
      },
      web: WebConfig::default(),
    }
  }
}

pub fn parse(text: &str) -> Result<Config> {
  Ok(toml::from_str(text)?)
}

pub fn load(path: &Path) -> Result<Config> {
  let text = std::fs::read_to_string(path)
    .chain_err(|| format!("Unable to load \"{}\"", path.display()))?;
  parse(&text).chain_err(|| format!("Unable to parse \"{}\"", path.display()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_minimal() {
    let config = parse(
      r#"
        [server]
        bind_addr = "0.0.0.0:8000"
        db_path = "data/surf.db"
      "#,
    )
    .unwrap();
    assert_eq!(config.server.bind_addr, "0.0.0.0:8000");
    assert_eq!(config.server.db_path, PathBuf::from("data/surf.db"));
    assert_eq!(config.server.pool_size, 4);
    assert_eq!(config.server.connection_timeout_ms, 5000);
    assert_eq!(config.web.static_dir, PathBuf::from("data/static"));
    assert_eq!(config.web.title, "Surf Companion");
  }

  #[test]
  fn parse_full() {
    let config = parse(
      r#"
        [server]
        bind_addr = "unix:/run/surflog.sock"
        db_path = "/data/surf.db"
        pool_size = 1

        [web]
        static_dir = "/srv/static"
        title = "Surf log"
      "#,
    )
    .unwrap();
    assert_eq!(config.server.pool_size, 1);
    assert_eq!(config.web.static_dir, PathBuf::from("/srv/static"));
    assert_eq!(config.web.title, "Surf log");
  }

  #[test]
  fn missing_db_path_is_an_error() {
    assert!(parse("[server]\nbind_addr = \"127.0.0.1:1\"\n").is_err());
  }

  #[test]
  fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load(&dir.path().join("nope.toml")).is_err());
  }
}
