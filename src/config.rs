use crate::error::{Result, VisionShopError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use vision_shop_common::detection::{DEFAULT_ENDPOINT, DETECT_TIMEOUT_MS};

/// 検出サーバーのURLを上書きする環境変数
pub const ENDPOINT_ENV: &str = "VISION_SHOP_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 検出サーバーのベースURL（`/detect` は付けない）
    pub endpoint: String,
    pub timeout_seconds: u64,
    /// 自己署名証明書を許可する（検出サーバーはアドホック証明書で動く）
    pub accept_invalid_certs: bool,

    /// コマンドライン指定（保存しない）
    #[serde(skip)]
    pub endpoint_override: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.into(),
            timeout_seconds: DETECT_TIMEOUT_MS / 1000,
            accept_invalid_certs: true,
            endpoint_override: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| VisionShopError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("vision-shop").join("config.json"))
    }

    /// 検出エンドポイントURL（コマンドライン > 環境変数 > 設定ファイル）
    pub fn detect_url(&self) -> Result<String> {
        let base = match (&self.endpoint_override, std::env::var(ENDPOINT_ENV)) {
            (Some(url), _) => url.clone(),
            (None, Ok(url)) if !url.trim().is_empty() => url,
            _ => self.endpoint.clone(),
        };
        Ok(vision_shop_common::detect_url(&base)?)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }

    pub fn set_endpoint(&mut self, endpoint: String) -> Result<()> {
        // 保存前に形式を確認する
        vision_shop_common::detect_url(&endpoint)?;
        self.endpoint = endpoint;
        self.save()
    }

    pub fn set_timeout(&mut self, seconds: u64) -> Result<()> {
        if seconds == 0 {
            return Err(VisionShopError::Config("タイムアウトは1秒以上にしてください".into()));
        }
        self.timeout_seconds = seconds;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.endpoint, "https://192.168.1.111:5000");
        assert_eq!(config.timeout_seconds, 5);
        assert!(config.accept_invalid_certs);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            endpoint: "http://localhost:5000".to_string(),
            timeout_seconds: 3,
            accept_invalid_certs: false,
            endpoint_override: None,
        };
        config.save_to(&path).expect("設定保存失敗");

        let loaded = Config::load_from(&path).expect("設定読込失敗");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = tempdir().expect("Failed to create temp dir");
        let loaded = Config::load_from(&dir.path().join("none.json")).expect("設定読込失敗");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"endpoint": "http://10.0.0.2:5000"}"#).unwrap();

        let loaded = Config::load_from(&path).expect("設定読込失敗");
        assert_eq!(loaded.endpoint, "http://10.0.0.2:5000");
        assert_eq!(loaded.timeout_seconds, 5);
    }

    #[test]
    fn test_endpoint_override_wins() {
        let config = Config {
            endpoint_override: Some("http://127.0.0.1:8080/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.detect_url().unwrap(), "http://127.0.0.1:8080/detect");

        let json = serde_json::to_string(&config).expect("シリアライズ失敗");
        assert!(!json.contains("endpoint_override"));
    }

    #[test]
    fn test_timeout_never_zero() {
        let config = Config {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }
}
