//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use image_headline_rust::dataset::{self, DatasetSource, LocalDataset};
use image_headline_rust::error::ImageHeadlineError;
use std::path::Path;
use tempfile::tempdir;

/// 存在しないフォルダをデータセットとして開いた場合
#[test]
fn test_open_nonexistent_folder() {
    let result = LocalDataset::open(Path::new("/nonexistent/path/12345"));
    assert!(matches!(result, Err(ImageHeadlineError::FolderNotFound(_))));
}

/// 画像のないフォルダは空のデータセット
#[tokio::test]
async fn test_folder_without_images() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("test.txt"), "hello").unwrap();
    std::fs::write(dir.path().join("data.json"), "{}").unwrap();

    let dataset = LocalDataset::open(dir.path()).unwrap();
    assert_eq!(dataset.len().await.unwrap(), 0);
    assert!(dataset::scan_folder(dir.path()).unwrap().is_empty());
}

/// 取得時に画像ファイルが消えていた場合
#[tokio::test]
async fn test_fetch_missing_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::write(dir.path().join("a.png"), b"x").unwrap();

    let dataset = LocalDataset::open(dir.path()).unwrap();
    let items = dataset.items(1).await.unwrap();
    std::fs::remove_file(dir.path().join("a.png")).unwrap();

    let err = dataset.fetch_image(&items[0]).await.unwrap_err();
    assert!(matches!(err, ImageHeadlineError::ImageLoad(_)));
}

/// 存在しない結果ファイル
#[test]
fn test_load_missing_results() {
    let err = image_headline_rust::export::load_results(Path::new("/nonexistent/results.json"))
        .unwrap_err();
    assert!(matches!(err, ImageHeadlineError::FileNotFound(_)));
}

/// Display実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        ImageHeadlineError::Config("テスト設定エラー".to_string()),
        ImageHeadlineError::FileNotFound("results.json".to_string()),
        ImageHeadlineError::FolderNotFound("/path/to/folder".to_string()),
        ImageHeadlineError::Dataset("split が見つかりません".to_string()),
        ImageHeadlineError::ImageLoad("broken.png".to_string()),
        ImageHeadlineError::ApiCall("API呼び出し失敗".to_string()),
        ImageHeadlineError::ApiParse("不正な応答".to_string()),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// MissingApiKeyエラーのメッセージ確認
#[test]
fn test_missing_api_key_message() {
    let display = format!("{}", ImageHeadlineError::MissingApiKey);

    assert!(display.contains("OPENAI_API_KEY"));
    assert!(display.contains("image-headline config"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: ImageHeadlineError = io_err.into();

    assert!(matches!(err, ImageHeadlineError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: ImageHeadlineError = json_err.into();

    assert!(matches!(err, ImageHeadlineError::JsonParse(_)));
}

/// 画像デコードエラーからの変換
#[test]
fn test_image_error_conversion() {
    let image_err = image::load_from_memory(b"not an image").unwrap_err();
    let err: ImageHeadlineError = image_err.into();

    assert!(matches!(err, ImageHeadlineError::ImageDecode(_)));
}
