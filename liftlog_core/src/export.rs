//! CSV export of logged sets.

use crate::{HistoryEntry, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    session: usize,
    ex_id: &'a str,
    ts: i64,
    kg: f64,
    reps: u32,
    rest: Option<u32>,
    difficulty: Option<String>,
    duration: Option<u32>,
}

/// Write every set of `history` to a CSV file at `path`
///
/// Sessions are numbered from 1 in log order; sets of the open session get
/// the next number. An existing file is replaced. Returns the number of rows.
pub fn export_sets_csv(history: &[HistoryEntry], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    let mut session = 1;
    let mut in_session = false;
    let mut count = 0;

    for entry in history {
        match entry {
            HistoryEntry::Set(set) => {
                in_session = true;
                writer.serialize(CsvRow {
                    session,
                    ex_id: &set.ex_id,
                    ts: set.ts,
                    kg: set.kg,
                    reps: set.reps,
                    rest: set.rest,
                    difficulty: set.difficulty.map(|d| d.to_string()),
                    duration: set.duration,
                })?;
                count += 1;
            }
            HistoryEntry::SessionEnd(_) => {
                if in_session {
                    session += 1;
                    in_session = false;
                }
            }
        }
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} sets to {:?}", count, path);
    Ok(count)
}
