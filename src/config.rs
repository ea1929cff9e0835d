//! TEMU API 接続設定ファイルの管理
//!
//! アプリケーションディレクトリの temu.config.json から接続情報を読み込む。
//! ファイルが無い場合はサンプルを書き出し、利用者に記入を促す。
//!
//! # セキュリティガイドライン
//! - ClientSecret は絶対にログに出力しないこと

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "temu.config.json";
pub const SAMPLE_CONFIG_FILENAME: &str = "temu.config.sample.json";

pub const DEFAULT_BASE_URL: &str = "https://api.partner.temu.com";
pub const DEFAULT_LABEL_FORMAT: &str = "PDF";

/// TEMU API 接続設定
///
/// JSON のキーは PascalCase（BaseUrl, ClientId, ...）。
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct TemuSettings {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub shop_id: String,
    pub label_format: String,
}

impl Default for TemuSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            shop_id: String::new(),
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
        }
    }
}

// セキュリティ: Debug 出力でも ClientSecret を伏せる
impl fmt::Debug for TemuSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemuSettings")
            .field("base_url", &self.base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("shop_id", &self.shop_id)
            .field("label_format", &self.label_format)
            .finish()
    }
}

impl TemuSettings {
    /// サンプルファイル用の設定（プレースホルダ入り）
    pub fn sample() -> Self {
        Self {
            client_id: "ENTER_CLIENT_ID_FROM_CONTRACT".to_string(),
            client_secret: "ENTER_CLIENT_SECRET_FROM_CONTRACT".to_string(),
            shop_id: "ENTER_SHOP_ID".to_string(),
            ..Self::default()
        }
    }

    /// 必須項目の検証
    pub fn validate(&self) -> Result<(), String> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err("TEMU configuration must contain ClientId and ClientSecret".to_string());
        }
        if self.shop_id.trim().is_empty() {
            return Err("TEMU configuration must contain the shop identifier ShopId".to_string());
        }
        Ok(())
    }
}

/// BaseUrl の末尾をスラッシュ1つに揃える
pub fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim().trim_end_matches('/'))
}

/// BaseUrl が http/https の絶対URLであることを確認
fn validate_base_url(base_url: &str) -> Result<(), String> {
    let parsed =
        url::Url::parse(base_url).map_err(|e| format!("Invalid BaseUrl '{base_url}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "Invalid BaseUrl '{base_url}': unsupported scheme '{other}'"
        )),
    }
}

/// 設定を読み込む。
///
/// ファイルが存在しない場合はサンプルファイルを作成（既にあれば上書きしない）し、エラーを返す。
pub fn load(app_dir: &Path) -> Result<TemuSettings, String> {
    let path = app_dir.join(CONFIG_FILENAME);

    if !path.exists() {
        let sample_path = app_dir.join(SAMPLE_CONFIG_FILENAME);
        if !sample_path.exists() {
            match write_sample(&sample_path) {
                Ok(()) => log::info!("Sample config written to {}", sample_path.display()),
                Err(e) => log::warn!("{e}"),
            }
        }

        return Err(format!(
            "Missing config file {CONFIG_FILENAME} with TEMU API credentials ({}). \
            Fill in the configuration based on {SAMPLE_CONFIG_FILENAME}.",
            path.display()
        ));
    }

    let contents =
        fs::read_to_string(&path).map_err(|e| format!("Failed to read config file: {e}"))?;
    let mut settings: TemuSettings =
        serde_json::from_str(&contents).map_err(|e| format!("Invalid config JSON: {e}"))?;

    settings.validate()?;

    settings.base_url = normalize_base_url(&settings.base_url);
    validate_base_url(&settings.base_url)?;

    if settings.label_format.trim().is_empty() {
        settings.label_format = DEFAULT_LABEL_FORMAT.to_string();
    }

    // セキュリティ: 認証情報はログに出力しない
    log::info!("TEMU configuration loaded for shop {}", settings.shop_id);
    Ok(settings)
}

fn write_sample(sample_path: &Path) -> Result<(), String> {
    let contents = serde_json::to_string_pretty(&TemuSettings::sample())
        .map_err(|e| format!("Failed to serialize sample config: {e}"))?;
    fs::write(sample_path, contents).map_err(|e| format!("Failed to write sample config: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, json: &str) {
        fs::write(dir.join(CONFIG_FILENAME), json).unwrap();
    }

    #[test]
    fn test_load_valid_config_normalizes_base_url() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            r#"{
                "BaseUrl": "https://api.example.com/v1//",
                "ClientId": "id",
                "ClientSecret": "secret",
                "ShopId": "shop-1",
                "LabelFormat": "ZPL"
            }"#,
        );

        let settings = load(dir.path()).unwrap();
        assert_eq!(settings.base_url, "https://api.example.com/v1/");
        assert_eq!(settings.client_id, "id");
        assert_eq!(settings.client_secret, "secret");
        assert_eq!(settings.shop_id, "shop-1");
        assert_eq!(settings.label_format, "ZPL");
    }

    #[test]
    fn test_load_applies_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            r#"{"ClientId": "id", "ClientSecret": "secret", "ShopId": "shop-1"}"#,
        );

        let settings = load(dir.path()).unwrap();
        assert_eq!(settings.base_url, "https://api.partner.temu.com/");
        assert_eq!(settings.label_format, "PDF");
    }

    #[test]
    fn test_load_missing_config_creates_sample() {
        let dir = TempDir::new().unwrap();

        let result = load(dir.path());
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.contains("Missing config"));
        assert!(err.contains(SAMPLE_CONFIG_FILENAME));

        let sample_path = dir.path().join(SAMPLE_CONFIG_FILENAME);
        assert!(sample_path.exists());
        let sample: TemuSettings =
            serde_json::from_str(&fs::read_to_string(&sample_path).unwrap()).unwrap();
        assert_eq!(sample.base_url, DEFAULT_BASE_URL);
        assert_eq!(sample.label_format, DEFAULT_LABEL_FORMAT);
        assert!(!sample.shop_id.is_empty());
    }

    #[test]
    fn test_load_missing_config_keeps_existing_sample() {
        let dir = TempDir::new().unwrap();
        let sample_path = dir.path().join(SAMPLE_CONFIG_FILENAME);
        fs::write(&sample_path, "edited by user").unwrap();

        assert!(load(dir.path()).is_err());
        assert_eq!(fs::read_to_string(&sample_path).unwrap(), "edited by user");
    }

    #[test]
    fn test_load_missing_credentials_returns_error() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), r#"{"ClientId": "id", "ShopId": "shop-1"}"#);

        let err = load(dir.path()).unwrap_err();
        assert!(err.contains("ClientId"));
        assert!(err.contains("ClientSecret"));
    }

    #[test]
    fn test_load_blank_shop_id_returns_error() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            r#"{"ClientId": "id", "ClientSecret": "secret", "ShopId": "   "}"#,
        );

        let err = load(dir.path()).unwrap_err();
        assert!(err.contains("ShopId"));
    }

    #[test]
    fn test_load_invalid_json_returns_error() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), "invalid json");

        let result = load(dir.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid config"));
    }

    #[test]
    fn test_load_rejects_non_http_base_url() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            r#"{"BaseUrl": "ftp://example.com", "ClientId": "id", "ClientSecret": "secret", "ShopId": "s"}"#,
        );

        let err = load(dir.path()).unwrap_err();
        assert!(err.contains("BaseUrl"));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("https://a.com"), "https://a.com/");
        assert_eq!(normalize_base_url("https://a.com/"), "https://a.com/");
        assert_eq!(normalize_base_url("https://a.com///"), "https://a.com/");
    }

    #[test]
    fn test_debug_masks_client_secret() {
        let settings = TemuSettings {
            client_secret: "super-secret".to_string(),
            ..TemuSettings::sample()
        };
        let debug = format!("{settings:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }
}
