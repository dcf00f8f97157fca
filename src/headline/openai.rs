//! OpenAI互換 Chat Completions クライアント

use super::HeadlineGenerator;
use crate::error::{ImageHeadlineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiHeadliner {
    client: Client,
    base_url: String,
    model: String,
    system_prompt: String,
    api_key: Option<String>,
}

impl OpenAiHeadliner {
    pub fn new(client: Client, base_url: &str, model: &str, system_prompt: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn build_request<'a>(&'a self, description: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system", content: &self.system_prompt },
                ChatMessage { role: "user", content: description },
            ],
        }
    }
}

#[async_trait]
impl HeadlineGenerator for OpenAiHeadliner {
    async fn generate(&self, description: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(ImageHeadlineError::MissingApiKey)?;
        let url = self.endpoint();

        tracing::debug!(url = %url, model = %self.model, "見出し生成リクエスト");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_request(description))
            .send()
            .await
            .map_err(|e| ImageHeadlineError::ApiCall(format!("{} に接続できません: {}", url, e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ImageHeadlineError::ApiCall(format!(
                "Chat API がエラーを返しました ({}): {}",
                status, text
            )));
        }

        let body = resp.text().await?;
        parse_chat_response(&body)
    }
}

/// `choices[0].message.content` を取り出す
fn parse_chat_response(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ImageHeadlineError::ApiParse(format!("Chat応答: {}", e)))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ImageHeadlineError::ApiParse("choices[0].message.content がありません".into()))
}
