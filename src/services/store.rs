//! Filesystem persistence for archives, the market summary and the issuer
//! directory.
//!
//! Layout under the data directory:
//!
//! ```text
//! data/
//!   stocks/{CODE}.json     one archive per instrument
//!   market_summary.json    per-instrument snapshot rows
//!   issuers.json           issuer directory
//! ```
//!
//! Every write goes through a temp file in the same directory followed by a
//! rename, so a crash mid-write leaves the previous version intact. A
//! `*.tmp` file on disk is always garbage from an interrupted run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::constants::{ISSUERS_FILE, MARKET_SUMMARY_FILE, STOCKS_SUBDIR};
use crate::error::{AppError, Result};
use crate::models::{Issuer, StockArchive, SummaryRow};
use crate::utils::get_data_dir;

#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the directory named by `MSE_DATA_DIR`
    pub fn from_env() -> Self {
        Self::new(get_data_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stocks_dir(&self) -> PathBuf {
        self.root.join(STOCKS_SUBDIR)
    }

    pub fn archive_path(&self, code: &str) -> PathBuf {
        self.stocks_dir().join(format!("{}.json", code))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join(MARKET_SUMMARY_FILE)
    }

    pub fn issuers_path(&self) -> PathBuf {
        self.root.join(ISSUERS_FILE)
    }

    /// Load one instrument's archive. A missing file is `None`; a file that
    /// exists but does not parse is an error.
    pub fn load_archive(&self, code: &str) -> Result<Option<StockArchive>> {
        read_json(&self.archive_path(code))
    }

    pub fn save_archive(&self, archive: &StockArchive) -> Result<()> {
        let path = self.archive_path(&archive.company_code);
        write_json_atomic(&path, archive)?;
        debug!(
            code = %archive.company_code,
            records = archive.history.len(),
            "archive saved"
        );
        Ok(())
    }

    /// Instrument codes with an archive on disk, sorted. A missing stocks
    /// directory just means nothing has been backfilled yet.
    pub fn list_archive_codes(&self) -> Result<Vec<String>> {
        let dir = self.stocks_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AppError::Io(format!("{}: {}", dir.display(), e))),
        };

        let mut codes = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| AppError::Io(format!("{}: {}", dir.display(), e)))?
                .path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    codes.push(stem.to_string());
                }
            }
        }
        codes.sort();
        Ok(codes)
    }

    /// Load the market summary; a missing file reads as empty since the
    /// summary is rebuilt from the archives anyway.
    pub fn load_summary(&self) -> Result<Vec<SummaryRow>> {
        Ok(read_json(&self.summary_path())?.unwrap_or_default())
    }

    pub fn save_summary(&self, rows: &[SummaryRow]) -> Result<()> {
        write_json_atomic(&self.summary_path(), &rows)
    }

    /// Load the issuer directory, `None` when it was never scraped.
    pub fn load_issuers(&self) -> Result<Option<Vec<Issuer>>> {
        read_json(&self.issuers_path())
    }

    pub fn save_issuers(&self, issuers: &[Issuer]) -> Result<()> {
        write_json_atomic(&self.issuers_path(), &issuers)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AppError::Io(format!("{}: {}", path.display(), e))),
    };
    let value = serde_json::from_str(&text)
        .map_err(|e| AppError::Parse(format!("{}: {}", path.display(), e)))?;
    Ok(Some(value))
}

fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json.as_bytes())?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
