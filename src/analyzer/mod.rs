pub mod cache;
mod types;

pub use cache::CacheFile;
pub use types::{ItemFailure, ResultRecord, RunReport};

use crate::captioner::Captioner;
use crate::dataset::{DatasetItem, DatasetSource};
use crate::error::Result;
use crate::headline::{HeadlineGenerator, HEADLINE_ERROR};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// 処理する最大件数
    pub num_samples: usize,
    /// キャプションキャッシュの保存先（None で無効）
    pub cache_dir: Option<PathBuf>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            num_samples: 10,
            cache_dir: None,
        }
    }
}

/// データセット先頭から順に キャプション生成 → 見出し生成 を行う
///
/// - キャプション失敗（画像取得含む）: 警告を出してその項目をスキップ
/// - 見出し失敗: `HEADLINE_ERROR` で置き換えて記録
/// - データセット自体の取得失敗はエラーとして返す
pub async fn process_images(
    source: &dyn DatasetSource,
    captioner: &dyn Captioner,
    headliner: &dyn HeadlineGenerator,
    options: &ProcessOptions,
) -> Result<RunReport> {
    let dataset_len = source.len().await?;
    let total = options.num_samples.min(dataset_len);
    println!("{}枚の画像を処理します... ({})", total, source.name());

    let items = source.items(total).await?;

    let mut cache = options.cache_dir.as_deref().map(CacheFile::load);
    let mut report = RunReport {
        requested: total,
        ..Default::default()
    };

    for (i, item) in items.iter().take(total).enumerate() {
        let (caption, cached) = match caption_item(source, captioner, item, cache.as_mut()).await {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(index = item.index, "画像 {} の処理に失敗: {}", i, e);
                report.failures.push(ItemFailure {
                    index: item.index,
                    message: e.to_string(),
                });
                continue;
            }
        };
        if cached {
            report.cache_hits += 1;
        }

        let headline = match headliner.generate(&caption).await {
            Ok(h) => h,
            Err(e) => {
                tracing::warn!(index = item.index, "見出し生成エラー: {}", e);
                report.headline_errors += 1;
                HEADLINE_ERROR.to_string()
            }
        };

        report.results.push(ResultRecord {
            original_text: item.text.clone(),
            caption,
            headline,
        });
        println!("✔ 画像 {}/{} を処理しました", i + 1, total);
    }

    if let (Some(cache), Some(dir)) = (&cache, options.cache_dir.as_deref()) {
        if let Err(e) = cache.save(dir) {
            tracing::warn!("キャッシュを保存できません: {}", e);
        }
    }

    Ok(report)
}

/// キャプションを取得。戻り値の bool はキャッシュヒットかどうか
async fn caption_item(
    source: &dyn DatasetSource,
    captioner: &dyn Captioner,
    item: &DatasetItem,
    cache: Option<&mut CacheFile>,
) -> Result<(String, bool)> {
    let image = source.fetch_image(item).await?;

    let Some(cache) = cache else {
        return Ok((captioner.caption(&image).await?, false));
    };

    let namespace = captioner.cache_namespace();
    let key = cache::cache_key(&namespace, &image);
    if let Some(caption) = cache.get(&key) {
        tracing::debug!(index = item.index, "キャッシュヒット");
        return Ok((caption.to_string(), true));
    }

    let caption = captioner.caption(&image).await?;
    cache.insert(key, &namespace, caption.clone());
    Ok((caption, false))
}
