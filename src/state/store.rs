//! Persistent export state.
//!
//! [`ExportState`] is the single durable record of what previous exports
//! produced. It is loaded once per command, mutated in memory, and flushed
//! with [`ExportState::save`] after every page so an interrupted run keeps
//! all completed work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CmeError, Result};

use super::ScopeEntry;

/// File name of the state file inside the output directory.
pub const STATE_FILENAME: &str = ".cme-state.json";

/// Root persisted object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportState {
    /// Schema version for migration.
    pub schema_version: u32,

    /// The Confluence instance this state belongs to.
    #[serde(rename = "confluence_url")]
    pub source_identity: String,

    /// Export requests that define what this state may contain.
    #[serde(default)]
    pub scopes: Vec<ScopeEntry>,

    /// Pages exported before this instant are stale (set by `--force`).
    #[serde(default)]
    pub min_export_timestamp: Option<DateTime<Utc>>,

    /// Tracked pages keyed by Confluence page id.
    #[serde(default)]
    pub pages: BTreeMap<String, PageRecord>,
}

/// Export record for a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Confluence version number at the time of export.
    pub version: u64,

    /// When this page's output was last written.
    pub last_exported: DateTime<Utc>,

    /// Output file, relative to the output directory.
    pub output_path: String,

    /// Whether the page is still present upstream.
    pub status: PageStatus,
}

/// Lifecycle of a tracked page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    Active,
    Deleted,
}

/// Counts shown by the status command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSummary {
    pub total: usize,
    pub active: usize,
    pub deleted: usize,
    pub last_exported: Option<DateTime<Utc>>,
}

impl PageRecord {
    /// Whether the record still has a live artifact on disk.
    pub fn is_active(&self) -> bool {
        self.status == PageStatus::Active
    }
}

impl ExportState {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Create an empty state bound to a Confluence instance.
    pub fn new(source_identity: impl Into<String>) -> Self {
        Self {
            schema_version: Self::CURRENT_VERSION,
            source_identity: source_identity.into(),
            scopes: Vec::new(),
            min_export_timestamp: None,
            pages: BTreeMap::new(),
        }
    }

    /// Get the state file path for an output directory.
    pub fn state_file(output_dir: &Path) -> PathBuf {
        output_dir.join(STATE_FILENAME)
    }

    /// Whether a state file exists in the output directory.
    pub fn exists(output_dir: &Path) -> bool {
        Self::state_file(output_dir).is_file()
    }

    /// Load state from an output directory.
    ///
    /// Returns `Ok(None)` when no state file exists.
    pub fn load(output_dir: &Path) -> Result<Option<Self>> {
        let path = Self::state_file(output_dir);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CmeError::Io(e)),
        };

        // Check the version before the full parse so a future layout fails
        // with a clear message instead of a field error.
        let raw: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| CmeError::StateParse {
                path: path.clone(),
                message: e.to_string(),
            })?;
        let found = raw
            .get("schema_version")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| CmeError::StateParse {
                path: path.clone(),
                message: "missing or invalid schema_version".to_string(),
            })?;
        if found != u64::from(Self::CURRENT_VERSION) {
            return Err(CmeError::UnsupportedSchema {
                path,
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: Self::CURRENT_VERSION,
            });
        }

        let state: Self = serde_json::from_value(raw).map_err(|e| CmeError::StateParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Some(state))
    }

    /// Load state, failing with [`CmeError::MissingState`] if there is none.
    pub fn load_required(output_dir: &Path) -> Result<Self> {
        Self::load(output_dir)?.ok_or_else(|| CmeError::MissingState {
            path: output_dir.to_path_buf(),
        })
    }

    /// Save state to disk using atomic write.
    ///
    /// Every call writes a complete snapshot to a temp file in the same
    /// directory and renames it over the state file, so a reader never sees
    /// a partially written file.
    pub fn save(&self, output_dir: &Path) -> Result<()> {
        let path = Self::state_file(output_dir);
        let persist_err = |source| CmeError::Persist {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(output_dir).map_err(persist_err)?;

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| persist_err(std::io::Error::other(e)))?;

        let temp_path = path.with_extension("json.tmp");
        let written = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.write_all(b"\n")?;
            file.sync_all()?;
            fs::rename(&temp_path, &path)
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(persist_err(e));
        }

        tracing::debug!("Saved state with {} pages to {}", self.pages.len(), path.display());
        Ok(())
    }

    /// Check that this state belongs to the given Confluence instance.
    ///
    /// Trailing slashes are ignored on both sides.
    pub fn validate_identity(&self, current: &str) -> Result<()> {
        if normalize_identity(&self.source_identity) == normalize_identity(current) {
            Ok(())
        } else {
            Err(CmeError::IdentityMismatch {
                stored: self.source_identity.clone(),
                current: current.to_string(),
            })
        }
    }

    /// Get a tracked page.
    pub fn page(&self, page_id: &str) -> Option<&PageRecord> {
        self.pages.get(page_id)
    }

    /// Whether an active page other than `page_id` is recorded at `output_path`.
    pub fn path_claimed_by_other(&self, output_path: &str, page_id: &str) -> bool {
        self.pages.iter().any(|(id, record)| {
            id != page_id && record.is_active() && record.output_path == output_path
        })
    }

    /// Record a successful export of a page.
    pub fn upsert_page(&mut self, page_id: &str, version: u64, output_path: impl Into<String>) {
        self.pages.insert(
            page_id.to_string(),
            PageRecord {
                version,
                last_exported: Utc::now(),
                output_path: output_path.into(),
                status: PageStatus::Active,
            },
        );
    }

    /// Flip a page to deleted, keeping its record.
    ///
    /// Returns `false` if the page is not tracked.
    pub fn mark_deleted(&mut self, page_id: &str) -> bool {
        match self.pages.get_mut(page_id) {
            Some(record) => {
                record.status = PageStatus::Deleted;
                true
            }
            None => false,
        }
    }

    /// Mark every page exported before now as stale.
    pub fn force_stale(&mut self) {
        self.min_export_timestamp = Some(Utc::now());
    }

    /// Get a summary for the status command.
    pub fn status_summary(&self) -> StatusSummary {
        let active = self.pages.values().filter(|p| p.is_active()).count();
        StatusSummary {
            total: self.pages.len(),
            active,
            deleted: self.pages.len() - active,
            last_exported: self.pages.values().map(|p| p.last_exported).max(),
        }
    }
}

fn normalize_identity(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn path_claimed_by_other_ignores_self_and_deleted() {
        let mut state = ExportState::new("https://wiki.example.com");
        state.upsert_page("1", 1, "Docs/One.md");
        state.upsert_page("2", 1, "Docs/Two.md");
        state.upsert_page("3", 1, "Docs/Old.md");
        state.mark_deleted("3");

        assert!(!state.path_claimed_by_other("Docs/One.md", "1"));
        assert!(state.path_claimed_by_other("Docs/One.md", "4"));
        assert!(!state.path_claimed_by_other("Docs/Old.md", "4"));
        assert!(!state.path_claimed_by_other("Docs/None.md", "1"));
    }

    fn sample_state() -> ExportState {
        let mut state = ExportState::new("https://wiki.example.com");
        state.scopes.push(ScopeEntry::new("spaces", ["DOCS"]));
        state.pages.insert(
            "12345".to_string(),
            PageRecord {
                version: 3,
                last_exported: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
                output_path: "Docs/Home.md".to_string(),
                status: PageStatus::Active,
            },
        );
        state
    }

    #[test]
    fn new_state_is_empty() {
        let state = ExportState::new("https://wiki.example.com");
        assert_eq!(state.schema_version, ExportState::CURRENT_VERSION);
        assert!(state.scopes.is_empty());
        assert!(state.pages.is_empty());
        assert!(state.min_export_timestamp.is_none());
    }

    #[test]
    fn load_missing_returns_none() {
        let temp = TempDir::new().unwrap();
        assert!(ExportState::load(temp.path()).unwrap().is_none());
    }

    #[test]
    fn load_required_missing_is_missing_state() {
        let temp = TempDir::new().unwrap();
        let err = ExportState::load_required(temp.path()).unwrap_err();
        assert!(matches!(err, CmeError::MissingState { .. }));
    }

    #[test]
    fn save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let state = sample_state();

        state.save(temp.path()).unwrap();
        let loaded = ExportState::load(temp.path()).unwrap().unwrap();

        assert_eq!(loaded, state);
    }

    #[test]
    fn save_creates_output_directory() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested").join("out");

        sample_state().save(&out).unwrap();

        assert!(ExportState::exists(&out));
    }

    #[test]
    fn save_uses_atomic_write() {
        let temp = TempDir::new().unwrap();
        sample_state().save(temp.path()).unwrap();

        let temp_path = ExportState::state_file(temp.path()).with_extension("json.tmp");
        assert!(
            !temp_path.exists(),
            "Temp file should not exist after successful save"
        );
    }

    #[test]
    fn serialized_layout_matches_file_format() {
        let temp = TempDir::new().unwrap();
        sample_state().save(temp.path()).unwrap();

        let content = fs::read_to_string(ExportState::state_file(temp.path())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value["schema_version"], 1);
        assert_eq!(value["confluence_url"], "https://wiki.example.com");
        assert_eq!(value["scopes"][0]["command"], "spaces");
        assert_eq!(value["scopes"][0]["args"][0], "DOCS");
        assert!(value["min_export_timestamp"].is_null());
        assert_eq!(value["pages"]["12345"]["version"], 3);
        assert_eq!(value["pages"]["12345"]["status"], "active");
        assert_eq!(value["pages"]["12345"]["output_path"], "Docs/Home.md");
        assert_eq!(
            value["pages"]["12345"]["last_exported"],
            "2025-01-02T03:04:05Z"
        );
        assert!(content.contains("\n  \"schema_version\""), "indented JSON");
    }

    #[test]
    fn load_accepts_offset_timestamps() {
        let temp = TempDir::new().unwrap();
        let json = r#"{
  "schema_version": 1,
  "confluence_url": "https://wiki.example.com/",
  "scopes": [{"command": "pages", "args": ["1"]}],
  "min_export_timestamp": "2025-06-01T12:00:00+00:00",
  "pages": {
    "1": {"version": 2, "last_exported": "2025-05-01T00:00:00.123456+00:00",
          "output_path": "A/B.md", "status": "deleted"}
  }
}"#;
        fs::write(ExportState::state_file(temp.path()), json).unwrap();

        let state = ExportState::load(temp.path()).unwrap().unwrap();
        assert!(state.min_export_timestamp.is_some());
        assert_eq!(state.pages["1"].status, PageStatus::Deleted);
    }

    #[test]
    fn load_rejects_unknown_schema_version() {
        let temp = TempDir::new().unwrap();
        fs::write(
            ExportState::state_file(temp.path()),
            r#"{"schema_version": 2, "confluence_url": "x", "scopes": [], "pages": {}}"#,
        )
        .unwrap();

        let err = ExportState::load(temp.path()).unwrap_err();
        assert!(matches!(
            err,
            CmeError::UnsupportedSchema {
                found: 2,
                expected: 1,
                ..
            }
        ));
    }

    #[test]
    fn load_rejects_invalid_status() {
        let temp = TempDir::new().unwrap();
        let json = r#"{"schema_version": 1, "confluence_url": "x", "scopes": [],
            "pages": {"1": {"version": 1, "last_exported": "2025-01-01T00:00:00Z",
                            "output_path": "a.md", "status": "archived"}}}"#;
        fs::write(ExportState::state_file(temp.path()), json).unwrap();

        let err = ExportState::load(temp.path()).unwrap_err();
        assert!(matches!(err, CmeError::StateParse { .. }));
    }

    #[test]
    fn load_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        fs::write(ExportState::state_file(temp.path()), "not json").unwrap();

        let err = ExportState::load(temp.path()).unwrap_err();
        assert!(matches!(err, CmeError::StateParse { .. }));
    }

    #[test]
    fn validate_identity_ignores_trailing_slash() {
        let state = ExportState::new("https://wiki.example.com/");
        assert!(state.validate_identity("https://wiki.example.com").is_ok());
    }

    #[test]
    fn validate_identity_mismatch() {
        let state = ExportState::new("https://wiki.example.com");
        let err = state.validate_identity("https://other.example.com").unwrap_err();
        assert!(matches!(err, CmeError::IdentityMismatch { .. }));
    }

    #[test]
    fn upsert_page_sets_active_and_timestamp() {
        let mut state = ExportState::new("https://wiki.example.com");
        let before = Utc::now();

        state.upsert_page("42", 5, "Space/Page.md");

        let record = state.page("42").unwrap();
        assert_eq!(record.version, 5);
        assert_eq!(record.output_path, "Space/Page.md");
        assert!(record.is_active());
        assert!(record.last_exported >= before);
    }

    #[test]
    fn upsert_page_reactivates_deleted() {
        let mut state = sample_state();
        state.mark_deleted("12345");

        state.upsert_page("12345", 4, "Docs/Home.md");

        assert!(state.page("12345").unwrap().is_active());
        assert_eq!(state.pages.len(), 1);
    }

    #[test]
    fn mark_deleted_keeps_record() {
        let mut state = sample_state();

        assert!(state.mark_deleted("12345"));

        let record = state.page("12345").unwrap();
        assert_eq!(record.status, PageStatus::Deleted);
        assert_eq!(record.version, 3);
    }

    #[test]
    fn mark_deleted_unknown_page() {
        let mut state = sample_state();
        assert!(!state.mark_deleted("999"));
    }

    #[test]
    fn status_summary_counts() {
        let mut state = sample_state();
        state.upsert_page("2", 1, "Docs/Two.md");
        state.upsert_page("3", 1, "Docs/Three.md");
        state.mark_deleted("3");

        let summary = state.status_summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.deleted, 1);
        assert!(summary.last_exported.is_some());
    }
}
