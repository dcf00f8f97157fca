use serde::{Deserialize, Serialize};

/// 1画像分の処理結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub original_text: String,   // データセットのキャプション
    pub caption: String,         // 生成キャプション
    pub headline: String,        // 生成見出し（失敗時は HEADLINE_ERROR）
}

/// スキップした項目
#[derive(Debug, Clone)]
pub struct ItemFailure {
    pub index: usize,
    pub message: String,
}

/// 1回の実行結果
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// 実際に処理対象とした件数（min(サンプル数, データセット件数)）
    pub requested: usize,
    pub results: Vec<ResultRecord>,
    pub failures: Vec<ItemFailure>,
    pub headline_errors: usize,
    pub cache_hits: usize,
}
