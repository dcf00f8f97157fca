//! 結果JSONの保存・読み込み

use crate::analyzer::ResultRecord;
use crate::error::{ImageHeadlineError, Result};
use crate::headline::HEADLINE_ERROR;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub const DEFAULT_OUTPUT_FILE: &str = "image_analysis_results.json";

/// 結果ファイルの集計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultSummary {
    pub total: usize,
    pub headline_errors: usize,
}

/// 4スペースインデントのJSON配列として書き出す
pub fn save_results(path: &Path, results: &[ResultRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    write_results(&mut writer, results)?;
    writer.flush()?;
    Ok(())
}

pub fn write_results<W: Write>(writer: &mut W, results: &[ResultRecord]) -> Result<()> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut *writer, formatter);
    results.serialize(&mut serializer)?;
    writer.write_all(b"\n")?;
    Ok(())
}

pub fn load_results(path: &Path) -> Result<Vec<ResultRecord>> {
    if !path.exists() {
        return Err(ImageHeadlineError::FileNotFound(path.display().to_string()));
    }

    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

pub fn summarize(results: &[ResultRecord]) -> ResultSummary {
    ResultSummary {
        total: results.len(),
        headline_errors: results.iter().filter(|r| r.headline == HEADLINE_ERROR).count(),
    }
}
