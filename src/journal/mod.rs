//! # Journal Module
//!
//! Tick journaling to JSONL files with rotation.
//!
//! This module handles:
//! - Capturing one record per tick (frames, calibration state, actuations)
//! - Formatting as JSONL (JSON Lines)
//! - Writing to rotating log files
//! - Managing file rotation (max N records per file)
//! - Retaining only last M files

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::Result;

/// One journaled tick.
#[derive(Debug, Serialize)]
pub struct TickRecord<'a> {
    /// Wall-clock time the tick completed, RFC 3339.
    pub timestamp: String,
    /// Outbound frame, newline included.
    pub frame: &'a str,
    /// Inbound frame processed this tick, if any.
    pub inbound: Option<&'a str>,
    /// Whether calibration was updating ranges this tick.
    pub calibrating: bool,
    /// Number of actuation requests the inbound frame produced.
    pub actuations: usize,
}

impl<'a> TickRecord<'a> {
    /// Builds a record stamped with the current time.
    #[must_use]
    pub fn now(
        frame: &'a str,
        inbound: Option<&'a str>,
        calibrating: bool,
        actuations: usize,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            frame,
            inbound,
            calibrating,
            actuations,
        }
    }
}

/// Rotating JSONL journal of glove ticks.
#[derive(Debug)]
pub struct FrameJournal {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    /// Disambiguates files created within the same second.
    sequence: u64,
}

impl FrameJournal {
    /// Creates a journal writing under `log_dir`, creating it if needed.
    ///
    /// # Arguments
    ///
    /// * `log_dir` - Directory the JSONL files land in
    /// * `max_records_per_file` - Records written before rotating
    /// * `max_files_to_keep` - Old files retained after rotation
    pub fn new(
        log_dir: impl Into<PathBuf>,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir)?;
        Ok(Self {
            log_dir,
            max_records_per_file,
            max_files_to_keep,
            writer: None,
            records_in_file: 0,
            sequence: 0,
        })
    }

    /// Appends one record, rotating first if the current file is full.
    pub fn write(&mut self, record: &TickRecord<'_>) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        // rotate() always installs a writer
        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, record)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.records_in_file += 1;
        }
        Ok(())
    }

    /// Opens a fresh file and prunes old ones.
    fn rotate(&mut self) -> Result<()> {
        self.sequence += 1;
        let name = format!(
            "glove-{}-{:04}.jsonl",
            Utc::now().format("%Y%m%d-%H%M%S"),
            self.sequence
        );
        let path = self.log_dir.join(name);
        debug!("Rotating journal to {}", path.display());

        self.writer = Some(BufWriter::new(File::create(&path)?));
        self.records_in_file = 0;
        self.prune()?;
        Ok(())
    }

    /// Removes the oldest journal files beyond the retention count.
    fn prune(&self) -> Result<()> {
        let mut files = journal_files(&self.log_dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Names sort chronologically (timestamp plus sequence).
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            debug!("Pruning journal file {}", path.display());
            if let Err(e) = fs::remove_file(&path) {
                warn!("Failed to prune {}: {}", path.display(), e);
            }
        }
        Ok(())
    }
}

/// Lists the journal's JSONL files in `dir`.
fn journal_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_journal = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("glove-") && n.ends_with(".jsonl"));
        if is_journal {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(frame: &str) -> TickRecord<'_> {
        TickRecord::now(frame, None, false, 0)
    }

    // ==================== Writing Tests ====================

    #[test]
    fn test_writes_one_json_line_per_record() {
        let dir = tempdir().unwrap();
        let mut journal = FrameJournal::new(dir.path(), 100, 5).unwrap();

        journal
            .write(&TickRecord::now("A2047\n", Some("A500\n"), true, 1))
            .unwrap();
        journal.write(&record("A0\n")).unwrap();

        let files = journal_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);

        let content = fs::read_to_string(&files[0]).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["frame"], "A2047\n");
        assert_eq!(first["inbound"], "A500\n");
        assert_eq!(first["calibrating"], true);
        assert_eq!(first["actuations"], 1);
        assert!(first["timestamp"].is_string());
    }

    // ==================== Rotation Tests ====================

    #[test]
    fn test_rotates_after_max_records() {
        let dir = tempdir().unwrap();
        let mut journal = FrameJournal::new(dir.path(), 2, 10).unwrap();

        for _ in 0..5 {
            journal.write(&record("A0\n")).unwrap();
        }

        // 2 + 2 + 1 records across three files
        let files = journal_files(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_prunes_oldest_files() {
        let dir = tempdir().unwrap();
        let mut journal = FrameJournal::new(dir.path(), 1, 2).unwrap();

        for _ in 0..5 {
            journal.write(&record("A0\n")).unwrap();
        }

        let mut files = journal_files(dir.path()).unwrap();
        files.sort();
        assert_eq!(files.len(), 2);

        // The survivors are the newest (highest sequence numbers).
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert!(names[0].contains("-0004"));
        assert!(names[1].contains("-0005"));
    }

    #[test]
    fn test_ignores_foreign_files_when_pruning() {
        let dir = tempdir().unwrap();
        let foreign = dir.path().join("notes.txt");
        fs::write(&foreign, "keep me").unwrap();

        let mut journal = FrameJournal::new(dir.path(), 1, 1).unwrap();
        for _ in 0..3 {
            journal.write(&record("A0\n")).unwrap();
        }

        assert!(foreign.exists());
        assert_eq!(journal_files(dir.path()).unwrap().len(), 1);
    }
}
