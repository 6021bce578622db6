use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

/// For tables whose columns are only known at runtime (the month matrix).
pub fn write_csv_records(path: &Path, records: &[Vec<String>]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .flexible(false)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for r in records {
        wtr.write_record(r)?;
    }
    wtr.flush()?;
    log::info!("wrote {} rows to {}", records.len().saturating_sub(1), path.display());
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s).with_context(|| format!("writing {}", path.display()))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RankingRow;

    #[test]
    fn csv_uses_renamed_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.csv");
        let rows = vec![RankingRow {
            rank: 1,
            region: "California".into(),
            total: "54,124".into(),
        }];
        write_csv(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Rank,Region,Total\n1,California,\"54,124\"\n");
    }
}
