mod openai;

pub use openai::OpenAiHeadliner;

use crate::error::Result;
use async_trait::async_trait;

/// 見出し生成に失敗したときに記録する固定文字列
pub const HEADLINE_ERROR: &str = "Error generating headline";

#[async_trait]
pub trait HeadlineGenerator: Send + Sync {
    /// キャプションから見出し（被写体の推定）を生成
    async fn generate(&self, description: &str) -> Result<String>;
}
