//! データセット画像にキャプションを付け、Chat API で見出しを推定するバッチツール

pub mod analyzer;
pub mod captioner;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod logging;
pub mod headline;
