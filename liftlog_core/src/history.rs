//! Append-only history log.
//!
//! History entries are appended to a JSONL (JSON Lines) file with file
//! locking so that several `liftlog` invocations can share one log.

use crate::{HistoryEntry, Result, SessionEndMarker, SetEntry};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Path of the history log inside a data directory
pub fn history_path(data_dir: &Path) -> PathBuf {
    data_dir.join("history.jsonl")
}

/// JSONL-backed history log with file locking
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    /// Create a history log for the given path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure the parent directory exists
    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append one entry
    pub fn append(&mut self, entry: &HistoryEntry) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        write_entry(&file, entry)?;
        file.unlock()?;

        tracing::debug!("Appended entry at {} to {:?}", entry.timestamp(), self.path);
        Ok(())
    }

    /// Append a logged set
    pub fn log_set(&mut self, set: SetEntry) -> Result<()> {
        tracing::info!("Logging {} {}kg x {}", set.ex_id, set.kg, set.reps);
        self.append(&HistoryEntry::Set(set))
    }

    /// Close the current session
    ///
    /// Returns `false` without writing when the current session is empty,
    /// so markers never stack up. The check and the append share one
    /// exclusive lock.
    pub fn end_session(&mut self, ts: i64) -> Result<bool> {
        if !self.path.exists() {
            tracing::info!("Current session is empty, not ending it");
            return Ok(false);
        }

        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)?;
        file.lock_exclusive()?;

        let history = parse_entries(&file)?;
        let ended = !crate::get_current_session_sets(&history).is_empty();
        if ended {
            write_entry(&file, &HistoryEntry::SessionEnd(SessionEndMarker { ts }))?;
        }

        file.unlock()?;

        if ended {
            tracing::info!("Ended session at {}", ts);
        } else {
            tracing::info!("Current session is empty, not ending it");
        }
        Ok(ended)
    }

    /// Read the whole log
    pub fn read(&self) -> Result<Vec<HistoryEntry>> {
        read_history(&self.path)
    }
}

/// Read all entries from a history log file
///
/// A missing file is an empty history. Lines that fail to parse are logged
/// and skipped.
pub fn read_history(path: &Path) -> Result<Vec<HistoryEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;
    let entries = parse_entries(&file)?;
    file.unlock()?;

    tracing::debug!("Read {} history entries from {:?}", entries.len(), path);
    Ok(entries)
}

/// Parse every line of an already locked log file
fn parse_entries(file: &File) -> Result<Vec<HistoryEntry>> {
    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<HistoryEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Failed to parse history entry at line {}: {}", line_num + 1, e);
            }
        }
    }

    Ok(entries)
}

/// Write one entry as a single line to an already locked log file
fn write_entry(file: &File, entry: &HistoryEntry) -> Result<()> {
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');

    let mut writer = std::io::BufWriter::new(file);
    writer.write_all(line.as_bytes())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SetDifficulty;

    #[test]
    fn test_append_and_read_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let set = SetEntry::new("bench", 1_000, 100.0, 5)
            .with_rest(120)
            .with_difficulty(SetDifficulty::Hard);

        let mut log = HistoryLog::new(&path);
        log.log_set(set.clone()).unwrap();
        assert!(log.end_session(2_000).unwrap());

        let history = log.read().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], HistoryEntry::Set(set));
        assert_eq!(
            history[1],
            HistoryEntry::SessionEnd(SessionEndMarker { ts: 2_000 })
        );
    }

    #[test]
    fn test_end_session_refuses_empty_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let mut log = HistoryLog::new(&path);
        assert!(!log.end_session(1).unwrap());

        log.log_set(SetEntry::new("bench", 2, 100.0, 5)).unwrap();
        assert!(log.end_session(3).unwrap());
        assert!(!log.end_session(4).unwrap());

        assert_eq!(log.read().unwrap().len(), 2);
    }

    #[test]
    fn test_wire_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        let mut log = HistoryLog::new(&path);
        log.log_set(SetEntry::new("bench", 5, 60.0, 12)).unwrap();
        log.end_session(6).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], r#"{"exId":"bench","ts":5,"kg":60.0,"reps":12}"#);
        assert_eq!(lines[1], r#"{"ts":6}"#);
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");

        std::fs::write(
            &path,
            "{\"exId\":\"bench\",\"ts\":1,\"kg\":100,\"reps\":5}\n\
             { invalid json }\n\
             \n\
             {\"exId\":\"bench\",\"ts\":2,\"kg\":100}\n\
             {\"ts\":3}\n",
        )
        .unwrap();

        let history = read_history(&path).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].as_set().is_some());
        assert!(history[1].is_session_end());
    }

    #[test]
    fn test_concurrent_end_writes_one_marker() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("history.jsonl");
        HistoryLog::new(&path)
            .log_set(SetEntry::new("bench", 1, 100.0, 5))
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || HistoryLog::new(path).end_session(10 + i).unwrap())
            })
            .collect();
        let ended = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|ended| *ended)
            .count();

        assert_eq!(ended, 1);
        let history = read_history(&path).unwrap();
        assert_eq!(history.iter().filter(|e| e.is_session_end()).count(), 1);
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let temp_dir = tempfile::tempdir().unwrap();
        let history = read_history(&temp_dir.path().join("nope.jsonl")).unwrap();
        assert!(history.is_empty());
    }
}
