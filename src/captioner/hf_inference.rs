use super::{prepare_image, Captioner};
use crate::error::{ImageHeadlineError, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde_json::Value;

/// Hugging Face Inference API の image-to-text 呼び出し
pub struct HfInferenceCaptioner {
    client: Client,
    base_url: String,
    model: String,
    token: Option<String>,
    max_image_size: u32,
}

impl HfInferenceCaptioner {
    pub fn new(client: Client, base_url: &str, model: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: None,
            max_image_size: 0,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn with_max_image_size(mut self, max_image_size: u32) -> Self {
        self.max_image_size = max_image_size;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url, self.model)
    }
}

#[async_trait]
impl Captioner for HfInferenceCaptioner {
    fn model(&self) -> &str {
        &self.model
    }

    fn cache_namespace(&self) -> String {
        // 縮小サイズが違えば送信する画像も違う
        format!("{}@{}px", self.model, self.max_image_size)
    }

    async fn caption(&self, image: &[u8]) -> Result<String> {
        let prepared = prepare_image(image, self.max_image_size)?;
        let url = self.endpoint();

        tracing::debug!(url = %url, bytes = prepared.bytes.len(), "キャプション生成リクエスト");

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, prepared.mime_type)
            .body(prepared.bytes);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| ImageHeadlineError::ApiCall(format!("{} に接続できません: {}", url, e)))?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(ImageHeadlineError::ApiCall(format!(
                "Inference API がエラーを返しました ({}): {}",
                status, text
            )));
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| ImageHeadlineError::ApiParse(format!("キャプション応答: {}", e)))?;

        parse_caption_response(&json)
    }
}

/// `[{"generated_text": "..."}]` から先頭のキャプションを取り出す
pub(crate) fn parse_caption_response(json: &Value) -> Result<String> {
    if let Some(error) = json.get("error").and_then(|v| v.as_str()) {
        return Err(ImageHeadlineError::ApiCall(error.to_string()));
    }

    let first = match json {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(json),
        _ => None,
    };

    let caption = first
        .and_then(|item| item.get("generated_text"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| ImageHeadlineError::ApiParse("generated_text がありません".into()))?;

    if caption.is_empty() {
        return Err(ImageHeadlineError::ApiParse("キャプションが空です".into()));
    }

    Ok(caption)
}
