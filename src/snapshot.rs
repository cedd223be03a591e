//! Snapshot persistence.
//!
//! Every derived document goes through [`write_json_atomic`]: pretty JSON
//! rendered to a temp file, then renamed over the target, so an aborted
//! run never leaves a truncated file for the next stage to choke on.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::model::Snapshot;

/// Wall-clock time in the ISO form the document metadata carries.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Read one JSON document into its typed form.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("file not found: {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Pretty-print `value` to `path`, creating parent directories as needed.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serializing document")?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("replacing {}", path.display()))?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    read_json(path)
}

pub fn save_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    write_json_atomic(path, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotMetadata;
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("eldermyth_{}_{}", std::process::id(), name))
    }

    #[test]
    fn snapshot_round_trips() {
        let path = scratch_path("roundtrip.json");
        let mut snapshot = Snapshot::default();
        snapshot.metadata = SnapshotMetadata {
            source: "https://eldermyth.fandom.com".to_string(),
            scraped_at: now_iso(),
            version: "1.0".to_string(),
            total_pages: 0,
            stats: Default::default(),
        };
        save_snapshot(&path, &snapshot).expect("save should succeed");
        let loaded = load_snapshot(&path).expect("load should succeed");
        assert_eq!(loaded.metadata.source, "https://eldermyth.fandom.com");
        assert_eq!(loaded.metadata.version, "1.0");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_error_names_the_path() {
        let err = load_snapshot(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("file not found"), "got: {err}");
    }

    #[test]
    fn invalid_json_error_names_the_path() {
        let path = scratch_path("broken.json");
        std::fs::write(&path, "{not json").expect("write should succeed");
        let err = load_snapshot(&path).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"), "got: {err}");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let path = scratch_path("atomic.json");
        write_json_atomic(&path, &serde_json::json!({"ok": true})).expect("write should succeed");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
        let _ = std::fs::remove_file(&path);
    }
}
