use anyhow::{Context, Result};
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

const CONFIG_FILE: &str = "colorbet_config.json";
const CONFIG_ENV: &str = "COLORBET_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub starting_balance: i64,
    pub spin_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_balance: 1000,
            spin_delay_ms: 1000,
        }
    }
}

impl GameConfig {
    /// Reads the file named by `COLORBET_CONFIG`, or `colorbet_config.json`.
    pub async fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .await
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
        } else {
            info!("{} not found, using default game settings", path.display());
            Ok(GameConfig::default())
        }
    }

    pub fn spin_delay(&self) -> Duration {
        Duration::from_millis(self.spin_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("colorbet-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let config = GameConfig::load_from(&temp_path("absent.json")).await.unwrap();
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.starting_balance, 1000);
        assert_eq!(config.spin_delay(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn partial_file_fills_in_defaults() {
        let path = temp_path("partial.json");
        fs::write(&path, r#"{ "spin_delay_ms": 250 }"#).await.unwrap();

        let config = GameConfig::load_from(&path).await.unwrap();
        fs::remove_file(&path).await.unwrap();

        assert_eq!(config.starting_balance, 1000);
        assert_eq!(config.spin_delay(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let path = temp_path("broken.json");
        fs::write(&path, "{ starting_balance: ").await.unwrap();

        let err = GameConfig::load_from(&path).await.unwrap_err();
        fs::remove_file(&path).await.unwrap();

        assert!(err.to_string().contains("parsing"));
    }
}
