//! Week-over-week history files
//!
//! One JSON array per series at `{dir}/{series}_cache.json`. Entries are kept
//! as raw JSON so that fields this version doesn't know survive a rewrite.
//! A file holding a single object is read as a one-entry history.

use eyre::{eyre, Result, WrapErr};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::records::CacheRecord;
use super::week::WeekStamp;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    dir: PathBuf,
}

fn entry_stamp(entry: &Value) -> Option<WeekStamp> {
    let week = entry.get("week")?.as_u64()?;
    let year = entry.get("year")?.as_i64()?;
    Some(WeekStamp::new(u32::try_from(week).ok()?, i32::try_from(year).ok()?))
}

impl HistoryStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self, series: &str) -> PathBuf {
        self.dir.join(format!("{}_cache.json", series))
    }

    /// Raw entries in file order; a missing file is an empty history
    pub fn load_history(&self, series: &str) -> Result<Vec<Value>> {
        let path = self.path(series);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let parsed: Value = serde_json::from_str(&content)
            .wrap_err_with(|| format!("Corrupt history file {}", path.display()))?;

        match parsed {
            Value::Array(entries) => Ok(entries),
            entry @ Value::Object(_) => Ok(vec![entry]),
            other => Err(eyre!(
                "Unexpected JSON {} in {}",
                other,
                path.display()
            )),
        }
    }

    /// Replace any entry with the same (week, year), then append
    pub fn save<T: CacheRecord>(&self, series: &str, record: &T) -> Result<()> {
        self.stage(series, record)?.commit()
    }

    /// Write the updated series next to the live file without replacing it.
    ///
    /// Nothing visible changes until [`StagedWrite::commit`]; dropping the
    /// staged write removes the temp file.
    pub fn stage<T: CacheRecord>(&self, series: &str, record: &T) -> Result<StagedWrite> {
        let stamp = record.stamp();
        let mut history = self.load_history(series)?;
        history.retain(|entry| entry_stamp(entry) != Some(stamp));
        history.push(serde_json::to_value(record)?);

        fs::create_dir_all(&self.dir)
            .wrap_err_with(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path(series);
        let staged = StagedWrite {
            tmp: path.with_extension("json.tmp"),
            path,
            committed: false,
        };
        fs::write(&staged.tmp, serde_json::to_string_pretty(&history)?)
            .wrap_err_with(|| format!("Failed to write {}", staged.tmp.display()))?;

        debug!("Staged {} ({}) -> {} entries", series, stamp, history.len());
        Ok(staged)
    }

    /// Record for the week before `current`.
    ///
    /// Week 1 looks at the previous year and takes its highest week.
    pub fn load_previous<T: CacheRecord>(&self, series: &str, current: WeekStamp) -> Result<Option<T>> {
        let history = self.load_history(series)?;

        let wanted = |stamp: &WeekStamp| {
            if current.week > 1 {
                stamp.year == current.year && stamp.week == current.week - 1
            } else {
                stamp.year == current.year - 1
            }
        };

        let best = history
            .into_iter()
            .filter_map(|entry| entry_stamp(&entry).filter(wanted).map(|stamp| (stamp, entry)))
            .max_by_key(|(stamp, _)| stamp.week);

        match best {
            Some((stamp, entry)) => {
                let record = serde_json::from_value(entry)
                    .wrap_err_with(|| format!("Malformed {} entry for {}", series, stamp))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}

/// A series rewrite waiting in its temp file
#[derive(Debug)]
pub struct StagedWrite {
    tmp: PathBuf,
    path: PathBuf,
    committed: bool,
}

impl StagedWrite {
    pub fn commit(mut self) -> Result<()> {
        fs::rename(&self.tmp, &self.path)
            .wrap_err_with(|| format!("Failed to write {}", self.path.display()))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagedWrite {
    fn drop(&mut self) {
        if !self.committed {
            let _ = fs::remove_file(&self.tmp);
        }
    }
}
