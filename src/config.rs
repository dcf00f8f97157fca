use crate::error::{ImageHeadlineError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATASET: &str = "diffusers/pokemon-gpt4-captions";
pub const DEFAULT_CAPTION_MODEL: &str = "Salesforce/blip-image-captioning-large";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4";
pub const DEFAULT_SYSTEM_PROMPT: &str = "Guess the Pokemon based on this description.";

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const HF_TOKEN_ENV: &str = "HF_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub hf_token: Option<String>,
    pub chat_model: String,
    pub caption_model: String,
    pub system_prompt: String,
    pub dataset: String,
    pub dataset_config: String,
    pub split: String,
    pub num_samples: usize,
    pub max_image_size: u32,
    pub timeout_seconds: u64,
    pub openai_base_url: String,
    pub inference_base_url: String,
    pub datasets_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            hf_token: None,
            chat_model: DEFAULT_CHAT_MODEL.into(),
            caption_model: DEFAULT_CAPTION_MODEL.into(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            dataset: DEFAULT_DATASET.into(),
            dataset_config: "default".into(),
            split: "train".into(),
            num_samples: 10,
            max_image_size: 1024,
            timeout_seconds: 120,
            openai_base_url: "https://api.openai.com/v1".into(),
            inference_base_url: "https://router.huggingface.co/hf-inference/models".into(),
            datasets_base_url: "https://datasets-server.huggingface.co".into(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数で上書きする
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// 指定パスから読み込み（存在しなければデフォルト）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ImageHeadlineError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("image-headline").join("config.json"))
    }

    /// 環境変数を優先（空文字は未設定扱い）
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(OPENAI_API_KEY_ENV) {
            self.openai_api_key = Some(key);
        }
        if let Some(token) = non_empty(HF_TOKEN_ENV) {
            self.hf_token = Some(token);
        }
        if let Some(url) = non_empty(OPENAI_BASE_URL_ENV) {
            self.openai_base_url = url;
        }
    }

    pub fn get_api_key(&self) -> Result<String> {
        self.openai_api_key.clone().ok_or(ImageHeadlineError::MissingApiKey)
    }

    /// 実行前に知らせるべき認証情報の不足
    ///
    /// どちらも致命的ではない。APIキーがなければ見出しが、HFトークンがなければ
    /// キャプションが項目ごとに失敗する。
    pub fn credential_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if let Err(e) = self.get_api_key() {
            warnings.push(format!("{} (見出しはすべてエラー扱いになります)", e));
        }

        if self.hf_token.is_none() && self.inference_base_url.contains("huggingface.co") {
            warnings.push(format!(
                "Hugging Face トークンが未設定です。{} を設定するか、`image-headline config --set-hf-token` で設定してください (キャプション生成が認証エラーで失敗します)",
                HF_TOKEN_ENV
            ));
        }

        warnings
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.openai_api_key = Some(key);
        self.save()
    }

    pub fn set_hf_token(&mut self, token: String) -> Result<()> {
        self.hf_token = Some(token);
        self.save()
    }
}

/// `.env` を読み込む。ログ初期化前に呼ぶため結果は呼び出し側で記録する
pub fn load_dotenv(path: Option<&Path>) -> std::result::Result<PathBuf, dotenvy::Error> {
    match path {
        Some(p) => dotenvy::from_path(p).map(|_| p.to_path_buf()),
        None => dotenvy::dotenv(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.dataset, "diffusers/pokemon-gpt4-captions");
        assert_eq!(config.caption_model, "Salesforce/blip-image-captioning-large");
        assert_eq!(config.chat_model, "gpt-4");
        assert_eq!(config.num_samples, 10);
        assert_eq!(config.split, "train");
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config {
            openai_api_key: Some("from-file".into()),
            ..Default::default()
        };
        config.apply_env(env_of(&[
            ("OPENAI_API_KEY", "from-env"),
            ("HF_TOKEN", "hf_abc"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
        ]));

        assert_eq!(config.openai_api_key.as_deref(), Some("from-env"));
        assert_eq!(config.hf_token.as_deref(), Some("hf_abc"));
        assert_eq!(config.openai_base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = Config {
            openai_api_key: Some("from-file".into()),
            ..Default::default()
        };
        config.apply_env(env_of(&[("OPENAI_API_KEY", "  ")]));
        assert_eq!(config.openai_api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_missing_api_key() {
        let config = Config::default();
        assert!(matches!(config.get_api_key(), Err(ImageHeadlineError::MissingApiKey)));
    }

    #[test]
    fn test_credential_warnings_when_unset() {
        let warnings = Config::default().credential_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("OPENAI_API_KEY"));
        assert!(warnings[1].contains("HF_TOKEN"));
    }

    #[test]
    fn test_no_credential_warnings_when_set() {
        let mut config = Config::default();
        config.apply_env(env_of(&[("OPENAI_API_KEY", "sk-test"), ("HF_TOKEN", "hf_abc")]));
        assert!(config.credential_warnings().is_empty());
    }

    #[test]
    fn test_hf_token_not_required_for_other_hosts() {
        let config = Config {
            openai_api_key: Some("sk-test".into()),
            inference_base_url: "http://localhost:8080/models".into(),
            ..Default::default()
        };
        assert!(config.credential_warnings().is_empty());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"num_samples": 3, "chat_model": "gpt-4o-mini"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.num_samples, 3);
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.dataset, DEFAULT_DATASET);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            hf_token: Some("hf_token".into()),
            max_image_size: 512,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.hf_token.as_deref(), Some("hf_token"));
        assert_eq!(loaded.max_image_size, 512);
    }
}
