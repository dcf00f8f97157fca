//! 結果JSON出力の統合テスト

use image_headline_rust::analyzer::ResultRecord;
use image_headline_rust::export::{load_results, save_results, summarize};
use image_headline_rust::headline::HEADLINE_ERROR;
use tempfile::tempdir;

fn create_test_record(index: usize) -> ResultRecord {
    ResultRecord {
        original_text: format!("A small \"electric\" creature #{}\nwith red cheeks", index),
        caption: format!("a cartoon picture of a yellow mouse {}", index),
        headline: "ピカチュウ (Pikachu)".to_string(),
    }
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("image_analysis_results.json");

    let mut results: Vec<ResultRecord> = (1..=3).map(create_test_record).collect();
    results.push(ResultRecord {
        headline: HEADLINE_ERROR.to_string(),
        ..create_test_record(4)
    });

    save_results(&path, &results).expect("保存失敗");
    let loaded = load_results(&path).expect("読み込み失敗");

    assert_eq!(loaded, results);

    // 再シリアライズしても同じ内容
    let first = std::fs::read_to_string(&path).unwrap();
    save_results(&path, &loaded).unwrap();
    let second = std::fs::read_to_string(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_saved_file_is_json_array() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("out.json");

    save_results(&path, &[create_test_record(1)]).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let array = value.as_array().expect("配列ではない");
    assert_eq!(array.len(), 1);
    assert_eq!(array[0]["headline"], "ピカチュウ (Pikachu)");
}

#[test]
fn test_load_rejects_malformed_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "[{\"original_text\": \"a\"").unwrap();

    assert!(load_results(&path).is_err());
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    assert!(load_results(&dir.path().join("missing.json")).is_err());
}

#[test]
fn test_summary_of_saved_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("out.json");

    let results = vec![
        create_test_record(1),
        ResultRecord { headline: HEADLINE_ERROR.to_string(), ..create_test_record(2) },
    ];
    save_results(&path, &results).unwrap();

    let summary = summarize(&load_results(&path).unwrap());
    assert_eq!(summary.total, 2);
    assert_eq!(summary.headline_errors, 1);
}
