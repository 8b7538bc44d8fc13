//! Atomic snapshot persistence
//!
//! One JSON file holds every aggregate. Writes go to a sibling `.tmp`
//! file, are synced, then renamed over the target so a crash mid-write
//! never corrupts previously durable data.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use crate::model::LearningSnapshot;

/// Load a snapshot if the file exists; a missing file is an empty store.
///
/// A file that exists but fails to parse is an error, not an empty
/// store; callers decide whether that is fatal.
pub fn load(path: &Path) -> io::Result<Option<LearningSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read(path)?;
    let snapshot = serde_json::from_slice(&raw)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;
    Ok(Some(snapshot))
}

/// Atomically replace the snapshot file.
pub fn store(path: &Path, snapshot: &LearningSnapshot) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_vec_pretty(snapshot)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?;
    let tmp = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    file.write_all(&data)?;
    file.sync_all()?;
    fs::rename(tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ReliabilityStats, SNAPSHOT_VERSION};

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");
        assert!(load(&path).unwrap().is_none());
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("learning.json");

        let mut snapshot = LearningSnapshot {
            version: SNAPSHOT_VERSION,
            ..Default::default()
        };
        let stats = ReliabilityStats {
            attempts: 3,
            successes: 2,
            avg_exec_ms: 42.0,
            ..Default::default()
        };
        snapshot.selectors.insert("css:#submit".to_string(), stats);

        store(&path, &snapshot).unwrap();
        let loaded = load(&path).unwrap().unwrap();
        assert_eq!(loaded.version, SNAPSHOT_VERSION);
        assert_eq!(loaded.selectors["css:#submit"].attempts, 3);
        // No leftover temp file after a successful rename.
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("learning.json");
        fs::write(&path, b"{not json").unwrap();
        let err = load(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
