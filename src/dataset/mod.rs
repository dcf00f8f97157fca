//! データセット読み込み
//!
//! - Hub: Hugging Face datasets-server から行を取得
//! - Local: ローカルフォルダの画像とサイドカー .txt

mod hub;
mod local;

pub use hub::{HubDataset, HubDatasetOptions};
pub use local::{scan_folder, LocalDataset};

use crate::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// 画像の参照先
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Url(String),
    Path(PathBuf),
    /// 画像セルが空（取得時にエラーとなり、その項目はスキップされる）
    Missing,
}

/// データセットの1件
#[derive(Debug, Clone)]
pub struct DatasetItem {
    pub index: usize,
    pub text: String,
    pub image: ImageRef,
}

#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// 表示用の名前
    fn name(&self) -> &str;

    /// 全件数
    async fn len(&self) -> Result<usize>;

    /// 先頭から `count` 件を取得
    async fn items(&self, count: usize) -> Result<Vec<DatasetItem>>;

    /// 画像バイト列を取得
    async fn fetch_image(&self, item: &DatasetItem) -> Result<Vec<u8>>;
}
