use crate::model::{AnalysisRecord, DailySummary, StorageError};
use crate::utils::compact_timestamp;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Timestamped JSON documents on disk. Raw dumps and daily summaries live
/// in `ranks/`, analysis records in `analyses/`. Documents are write-once:
/// the tracker writes, the report and plot tools only read.
pub struct SnapshotStore {
    ranks_dir: PathBuf,
    analyses_dir: PathBuf,
}

impl SnapshotStore {
    /// Opens the store under `base`, creating the document directories.
    pub fn open(base: impl AsRef<Path>) -> Result<Self, StorageError> {
        let base = base.as_ref();
        let ranks_dir = base.join("ranks");
        let analyses_dir = base.join("analyses");
        fs::create_dir_all(&ranks_dir)?;
        fs::create_dir_all(&analyses_dir)?;
        Ok(Self {
            ranks_dir,
            analyses_dir,
        })
    }

    /// Persists the raw upstream response verbatim.
    pub fn save_ranks(
        &self,
        data: &serde_json::Value,
        query: &str,
        sort: &str,
        stamp: DateTime<Local>,
    ) -> Result<PathBuf, StorageError> {
        self.write_document(&self.ranks_dir, "ranks", query, sort, stamp, data)
    }

    pub fn save_analysis(
        &self,
        record: &AnalysisRecord,
        query: &str,
        sort: &str,
        stamp: DateTime<Local>,
    ) -> Result<PathBuf, StorageError> {
        self.write_document(&self.analyses_dir, "analysis", query, sort, stamp, record)
    }

    /// Summaries sit next to the raw dumps.
    pub fn save_summary(
        &self,
        summary: &DailySummary,
        query: &str,
        sort: &str,
        stamp: DateTime<Local>,
    ) -> Result<PathBuf, StorageError> {
        self.write_document(&self.ranks_dir, "summary", query, sort, stamp, summary)
    }

    fn write_document<T: Serialize>(
        &self,
        dir: &Path,
        kind: &str,
        query: &str,
        sort: &str,
        stamp: DateTime<Local>,
        value: &T,
    ) -> Result<PathBuf, StorageError> {
        let path = dir.join(document_name(kind, query, sort, &stamp));
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(path)
    }

    /// Earliest- and latest-created analysis documents whose filename
    /// carries the date tag. File creation time decides, not the embedded
    /// timestamp; file systems without creation time fall back to mtime.
    /// `None` when the day has no documents yet.
    pub fn first_and_latest_analyses(
        &self,
        date_tag: &str,
    ) -> Result<Option<(AnalysisRecord, AnalysisRecord)>, StorageError> {
        let mut matches: Vec<(SystemTime, PathBuf)> = Vec::new();
        for entry in fs::read_dir(&self.analyses_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_analysis_for(&name, date_tag) {
                continue;
            }
            let meta = entry.metadata()?;
            let created = meta.created().or_else(|_| meta.modified())?;
            matches.push((created, entry.path()));
        }

        if matches.is_empty() {
            return Ok(None);
        }
        matches.sort_by_key(|(created, _)| *created);

        let first = load_analysis(&matches[0].1)?;
        let latest = load_analysis(&matches[matches.len() - 1].1)?;
        Ok(Some((first, latest)))
    }

    /// Every analysis document ever written, in ascending filename order.
    pub fn load_all_analyses(&self) -> Result<Vec<AnalysisRecord>, StorageError> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(&self.analyses_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with("analysis-") && name.ends_with(".json") {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut records = Vec::with_capacity(paths.len());
        for path in &paths {
            records.push(load_analysis(path)?);
        }
        Ok(records)
    }
}

fn load_analysis(path: &Path) -> Result<AnalysisRecord, StorageError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// `{kind}-{query}-{sort}-{YYYYMMDD_HHMMSS}.json`. The report tool's
/// date-based selection depends on this layout.
pub fn document_name(kind: &str, query: &str, sort: &str, stamp: &DateTime<Local>) -> String {
    format!("{}-{}-{}-{}.json", kind, query, sort, compact_timestamp(stamp))
}

fn is_analysis_for(name: &str, date_tag: &str) -> bool {
    name.starts_with("analysis-") && name.ends_with(".json") && name.contains(date_tag)
}
