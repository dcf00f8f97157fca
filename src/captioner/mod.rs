//! 画像キャプション生成
//!
//! 画像は送信前にデコード検証し、大きすぎる場合は縮小してPNGで再エンコードする。

mod hf_inference;

pub use hf_inference::HfInferenceCaptioner;

use crate::error::{ImageHeadlineError, Result};
use async_trait::async_trait;
use image::{GenericImageView, ImageFormat};
use std::io::Cursor;

#[async_trait]
pub trait Captioner: Send + Sync {
    /// モデル名
    fn model(&self) -> &str;

    /// キャッシュキーの接頭辞。出力に影響する前処理設定があれば含める
    fn cache_namespace(&self) -> String {
        self.model().to_string()
    }

    async fn caption(&self, image: &[u8]) -> Result<String>;
}

/// 送信用に整形した画像
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

/// 画像をデコードし、長辺が `max_size` を超える場合は縮小する
pub fn prepare_image(bytes: &[u8], max_size: u32) -> Result<PreparedImage> {
    let format = image::guess_format(bytes)
        .map_err(|e| ImageHeadlineError::ImageLoad(format!("画像形式を判定できません: {}", e)))?;
    let img = image::load_from_memory_with_format(bytes, format)?;

    let (width, height) = img.dimensions();
    if max_size == 0 || width.max(height) <= max_size {
        return Ok(PreparedImage {
            bytes: bytes.to_vec(),
            mime_type: mime_type_for(format),
        });
    }

    tracing::debug!(width, height, max_size, "画像を縮小します");
    let resized = img.thumbnail(max_size, max_size);

    let mut buffer = Cursor::new(Vec::new());
    resized.write_to(&mut buffer, ImageFormat::Png)?;

    Ok(PreparedImage {
        bytes: buffer.into_inner(),
        mime_type: "image/png",
    })
}

fn mime_type_for(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        _ => "application/octet-stream",
    }
}
