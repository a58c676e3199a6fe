//! Ranking export to a tabular CSV file (rank as the leading column) and a JSON
//! array of records, plus the matching loaders.

use crate::error::{Result, ScreenerError};
use crate::models::RankingRow;
use crate::storage_utils::write_atomic;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "csv" => Some(ExportFormat::Csv),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

pub fn ranking_to_csv(rows: &[RankingRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ScreenerError::Io(e.into_error()))
}

/// One record per row. The rank is only written when `include_rank` is set.
pub fn ranking_to_json(rows: &[RankingRow], include_rank: bool) -> Result<Vec<u8>> {
    let records = rows
        .iter()
        .map(|row| -> Result<Value> {
            let mut record = serde_json::to_value(row)?;
            if !include_rank {
                if let Value::Object(map) = &mut record {
                    map.remove("rank");
                }
            }
            Ok(record)
        })
        .collect::<Result<Vec<Value>>>()?;
    Ok(serde_json::to_vec_pretty(&records)?)
}

pub fn ranking_from_csv(bytes: &[u8]) -> Result<Vec<RankingRow>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let rows = reader.deserialize().collect::<std::result::Result<Vec<RankingRow>, _>>()?;
    Ok(rows)
}

/// Records without a `rank` field are ranked by their position.
pub fn ranking_from_json(bytes: &[u8]) -> Result<Vec<RankingRow>> {
    let records: Vec<Value> = serde_json::from_slice(bytes)?;
    records
        .into_iter()
        .enumerate()
        .map(|(i, mut record)| -> Result<RankingRow> {
            if let Value::Object(map) = &mut record {
                map.entry("rank").or_insert_with(|| Value::from(i + 1));
            }
            Ok(serde_json::from_value(record)?)
        })
        .collect()
}

pub async fn export_results(
    rows: &[RankingRow],
    format: ExportFormat,
    path: &Path,
) -> Result<PathBuf> {
    let bytes = match format {
        ExportFormat::Csv => ranking_to_csv(rows)?,
        ExportFormat::Json => ranking_to_json(rows, false)?,
    };
    write_atomic(path, &bytes).await?;
    info!("Exported {} rows to {:?}", rows.len(), path);
    Ok(path.to_path_buf())
}

/// Loads an exported ranking, choosing the format from the file extension.
pub async fn load_results(path: &Path) -> Result<Vec<RankingRow>> {
    let format = ExportFormat::from_path(path).ok_or_else(|| {
        ScreenerError::InvalidArgument(format!("unsupported results file {:?}", path))
    })?;
    let bytes = tokio::fs::read(path).await?;
    match format {
        ExportFormat::Csv => ranking_from_csv(&bytes),
        ExportFormat::Json => ranking_from_json(&bytes),
    }
}
