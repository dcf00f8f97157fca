use super::{DatasetItem, DatasetSource, ImageRef};
use crate::error::{ImageHeadlineError, Result};
use async_trait::async_trait;
use std::path::Path;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// ローカルフォルダをデータセットとして扱う
///
/// `foo.png` のデータセットキャプションは `foo.txt` から読む（なければ空文字）。
#[derive(Debug, Clone)]
pub struct LocalDataset {
    name: String,
    items: Vec<DatasetItem>,
}

impl LocalDataset {
    pub fn open(folder: &Path) -> Result<Self> {
        let items = scan_folder(folder)?;
        Ok(Self {
            name: folder.display().to_string(),
            items,
        })
    }
}

#[async_trait]
impl DatasetSource for LocalDataset {
    fn name(&self) -> &str {
        &self.name
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.items.len())
    }

    async fn items(&self, count: usize) -> Result<Vec<DatasetItem>> {
        Ok(self.items.iter().take(count).cloned().collect())
    }

    async fn fetch_image(&self, item: &DatasetItem) -> Result<Vec<u8>> {
        match &item.image {
            ImageRef::Path(path) => std::fs::read(path)
                .map_err(|e| ImageHeadlineError::ImageLoad(format!("{}: {}", path.display(), e))),
            ImageRef::Url(url) => Err(ImageHeadlineError::Dataset(format!(
                "ローカルデータセットにURL画像は含まれません: {}",
                url
            ))),
            ImageRef::Missing => Err(ImageHeadlineError::ImageLoad(format!(
                "行 {} に画像がありません",
                item.index
            ))),
        }
    }
}

pub fn scan_folder(folder: &Path) -> Result<Vec<DatasetItem>> {
    if !folder.is_dir() {
        return Err(ImageHeadlineError::FolderNotFound(folder.display().to_string()));
    }

    let mut paths = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let is_image = path
            .extension()
            .map(|ext| is_image_extension(&ext.to_string_lossy()))
            .unwrap_or(false);

        if is_image {
            paths.push(path.to_path_buf());
        }
    }

    // ファイル名でソート
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let items = paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| DatasetItem {
            index,
            text: read_sidecar_text(&path),
            image: ImageRef::Path(path),
        })
        .collect();

    Ok(items)
}

fn is_image_extension(ext: &str) -> bool {
    let lower = ext.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&lower.as_str())
}

fn read_sidecar_text(image_path: &Path) -> String {
    let sidecar = image_path.with_extension("txt");
    std::fs::read_to_string(sidecar)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
