//! Hugging Face datasets-server クライアント
//!
//! `/size` で件数を、`/rows` で行（画像URL + テキスト）をページ単位で取得する。

use super::{DatasetItem, DatasetSource, ImageRef};
use crate::error::{ImageHeadlineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::future::Future;

/// `/rows` の1リクエストあたり最大行数
const MAX_ROWS_PER_PAGE: usize = 100;

#[derive(Debug, Clone)]
pub struct HubDatasetOptions {
    pub base_url: String,
    pub dataset: String,
    pub config: String,
    pub split: String,
    pub image_column: String,
    pub text_column: String,
    pub token: Option<String>,
}

impl HubDatasetOptions {
    pub fn new(base_url: &str, dataset: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            dataset: dataset.to_string(),
            config: "default".into(),
            split: "train".into(),
            image_column: "image".into(),
            text_column: "text".into(),
            token: None,
        }
    }
}

pub struct HubDataset {
    client: Client,
    options: HubDatasetOptions,
}

#[derive(Deserialize)]
struct SizeResponse {
    size: SizeBody,
}

#[derive(Deserialize)]
struct SizeBody {
    #[serde(default)]
    splits: Vec<SplitSize>,
}

#[derive(Deserialize)]
struct SplitSize {
    config: String,
    split: String,
    num_rows: usize,
}

#[derive(Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
}

#[derive(Deserialize)]
struct RowEntry {
    row_idx: usize,
    row: Value,
}

impl HubDataset {
    pub fn new(client: Client, options: HubDatasetOptions) -> Self {
        Self { client, options }
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!(url, ?query, "datasets-server リクエスト");

        let mut request = self.client.get(url).query(query);
        if let Some(token) = &self.options.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| ImageHeadlineError::Dataset(format!("{} に接続できません: {}", url, e)))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ImageHeadlineError::Dataset(format!(
                "datasets-server がエラーを返しました ({}): {}",
                status, text
            )));
        }

        Ok(resp.json().await?)
    }

    async fn fetch_page(&self, url: &str, offset: usize, length: usize) -> Result<Vec<DatasetItem>> {
        let json = self
            .get_json(
                url,
                &[
                    ("dataset", self.options.dataset.clone()),
                    ("config", self.options.config.clone()),
                    ("split", self.options.split.clone()),
                    ("offset", offset.to_string()),
                    ("length", length.to_string()),
                ],
            )
            .await?;

        parse_rows(json, &self.options.image_column, &self.options.text_column)
    }
}

/// `count` 件に達するまで最大 `MAX_ROWS_PER_PAGE` 行ずつ取得する
///
/// 次の offset は受け取った件数から決まるため、短いページの後も欠けなく続く。
/// 空ページが返ったら打ち切る。
async fn fetch_pages<F, Fut>(count: usize, mut fetch: F) -> Result<Vec<DatasetItem>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<DatasetItem>>>,
{
    let mut items = Vec::with_capacity(count);

    while items.len() < count {
        let offset = items.len();
        let length = (count - offset).min(MAX_ROWS_PER_PAGE);

        let page = fetch(offset, length).await?;
        if page.is_empty() {
            break;
        }
        items.extend(page);
    }

    items.truncate(count);
    Ok(items)
}

#[async_trait]
impl DatasetSource for HubDataset {
    fn name(&self) -> &str {
        &self.options.dataset
    }

    async fn len(&self) -> Result<usize> {
        let url = format!("{}/size", self.options.base_url);
        let json = self
            .get_json(&url, &[("dataset", self.options.dataset.clone())])
            .await?;

        parse_split_size(json, &self.options.config, &self.options.split)
    }

    async fn items(&self, count: usize) -> Result<Vec<DatasetItem>> {
        let url = format!("{}/rows", self.options.base_url);
        fetch_pages(count, |offset, length| self.fetch_page(&url, offset, length)).await
    }

    async fn fetch_image(&self, item: &DatasetItem) -> Result<Vec<u8>> {
        let url = match &item.image {
            ImageRef::Url(url) => url,
            ImageRef::Path(path) => {
                return Err(ImageHeadlineError::Dataset(format!(
                    "Hubデータセットにローカル画像は含まれません: {}",
                    path.display()
                )))
            }
            ImageRef::Missing => {
                return Err(ImageHeadlineError::ImageLoad(format!(
                    "行 {} に画像がありません",
                    item.index
                )))
            }
        };

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ImageHeadlineError::ImageLoad(format!("{}: {}", url, e)))?;

        if !resp.status().is_success() {
            return Err(ImageHeadlineError::ImageLoad(format!(
                "{}: HTTP {}",
                url,
                resp.status()
            )));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

/// `/size` レスポンスから指定 config/split の行数を取り出す
fn parse_split_size(json: Value, config: &str, split: &str) -> Result<usize> {
    let response: SizeResponse = serde_json::from_value(json)
        .map_err(|e| ImageHeadlineError::ApiParse(format!("/size: {}", e)))?;

    response
        .size
        .splits
        .iter()
        .find(|s| s.config == config && s.split == split)
        .map(|s| s.num_rows)
        .ok_or_else(|| {
            ImageHeadlineError::Dataset(format!("split が見つかりません: {}/{}", config, split))
        })
}

/// `/rows` レスポンスを DatasetItem に変換する
fn parse_rows(json: Value, image_column: &str, text_column: &str) -> Result<Vec<DatasetItem>> {
    let response: RowsResponse = serde_json::from_value(json)
        .map_err(|e| ImageHeadlineError::ApiParse(format!("/rows: {}", e)))?;

    let items = response
        .rows
        .into_iter()
        .map(|entry| {
            let image = match entry
                .row
                .get(image_column)
                .and_then(|img| img.get("src"))
                .and_then(|v| v.as_str())
            {
                Some(src) => ImageRef::Url(src.to_string()),
                None => {
                    tracing::warn!(row = entry.row_idx, "画像列 '{}' が空です", image_column);
                    ImageRef::Missing
                }
            };

            let text = entry
                .row
                .get(text_column)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();

            DatasetItem {
                index: entry.row_idx,
                text,
                image,
            }
        })
        .collect();

    Ok(items)
}
