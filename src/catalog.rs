use crate::constants::{
    BACKUPSTORE_DIR, BACKUPS_DIR, DESCRIPTOR_PREFIX, DESCRIPTOR_SUFFIX, VOLUMES_DIR,
};
use crate::errors::RestoreServiceError;
use crate::ui::create_scan_progress_bar;
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// One backup as described by its on-disk descriptor. Built fresh from the
/// backupstore on every run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupRecord {
    pub id: String,
    pub volume_name: String,
    pub created_at: DateTime<FixedOffset>,
}

/// Raw descriptor fields as the longhorn engine writes them
#[derive(Debug, Deserialize)]
struct BackupDescriptor {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "VolumeName")]
    volume_name: String,
    #[serde(rename = "SnapshotCreatedAt")]
    snapshot_created_at: String,
}

/// Scan the backupstore under `root` and parse every backup descriptor into
/// a record, sorted by backup id.
///
/// Zero matching files is an empty catalog, not an error. A descriptor that
/// fails to parse aborts the whole scan: a partial catalog would silently
/// hide backups from the operator.
pub fn scan_catalog(root: &Path) -> Result<Vec<BackupRecord>, RestoreServiceError> {
    let files = discover_descriptors(root);
    info!(count = files.len(), "Found backup descriptors");

    let pb = create_scan_progress_bar(files.len())?;

    let mut records = Vec::with_capacity(files.len());
    for path in &files {
        debug!(path = %path.display(), "Processing backup descriptor");
        pb.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        records.push(parse_descriptor(path)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    records.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(records)
}

/// Locate `backupstore/volumes/*/*/*/backups/backup_backup-*.cfg` under
/// `root`. The layout is the engine's on-disk contract; anything not
/// matching it exactly is ignored.
fn discover_descriptors(root: &Path) -> Vec<PathBuf> {
    let volumes_root = root.join(BACKUPSTORE_DIR).join(VOLUMES_DIR);

    let mut files: Vec<PathBuf> = WalkDir::new(&volumes_root)
        .min_depth(5)
        .max_depth(5)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_descriptor(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

fn is_descriptor(path: &Path) -> bool {
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name,
        None => return false,
    };

    if !name.starts_with(DESCRIPTOR_PREFIX) || !name.ends_with(DESCRIPTOR_SUFFIX) {
        return false;
    }

    // Descriptors live directly inside a `backups` directory
    path.parent()
        .and_then(|p| p.file_name())
        .map(|d| d == BACKUPS_DIR)
        .unwrap_or(false)
}

fn parse_descriptor(path: &Path) -> Result<BackupRecord, RestoreServiceError> {
    let contents =
        fs::read_to_string(path).map_err(|e| RestoreServiceError::catalog_parse(path, e))?;

    let descriptor: BackupDescriptor = serde_json::from_str(&contents)
        .map_err(|e| RestoreServiceError::catalog_parse(path, e))?;

    let created_at = DateTime::parse_from_rfc3339(&descriptor.snapshot_created_at).map_err(|e| {
        RestoreServiceError::catalog_parse(
            path,
            format!(
                "unparsable SnapshotCreatedAt '{}': {}",
                descriptor.snapshot_created_at, e
            ),
        )
    })?;

    Ok(BackupRecord {
        id: descriptor.name,
        volume_name: descriptor.volume_name,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, TempDir};

    fn write_descriptor(root: &Path, volume: &str, file_name: &str, contents: &str) {
        // Two hash-prefix levels above the volume directory, as the engine
        // lays the store out
        let backups_dir = root
            .join("backupstore/volumes/a1/b2")
            .join(volume)
            .join("backups");
        fs::create_dir_all(&backups_dir).unwrap();
        fs::write(backups_dir.join(file_name), contents).unwrap();
    }

    fn descriptor_json(id: &str, volume: &str, created_at: &str) -> String {
        format!(
            r#"{{"Name":"{}","VolumeName":"{}","SnapshotCreatedAt":"{}"}}"#,
            id, volume, created_at
        )
    }

    fn store_with_three_backups() -> TempDir {
        let dir = tempdir().unwrap();
        write_descriptor(
            dir.path(),
            "pvc-data",
            "backup_backup-c3.cfg",
            &descriptor_json("backup-c3", "pvc-data", "2025-03-01T08:00:00Z"),
        );
        write_descriptor(
            dir.path(),
            "pvc-data",
            "backup_backup-a1.cfg",
            &descriptor_json("backup-a1", "pvc-data", "2025-01-15T10:30:00Z"),
        );
        write_descriptor(
            dir.path(),
            "pvc-logs",
            "backup_backup-b2.cfg",
            &descriptor_json("backup-b2", "pvc-logs", "2025-02-10T23:59:59+01:00"),
        );
        dir
    }

    #[test]
    fn test_scan_produces_one_record_per_descriptor() -> Result<(), RestoreServiceError> {
        let dir = store_with_three_backups();
        let catalog = scan_catalog(dir.path())?;

        assert_eq!(catalog.len(), 3);

        // Sorted by id, fields copied verbatim
        assert_eq!(catalog[0].id, "backup-a1");
        assert_eq!(catalog[0].volume_name, "pvc-data");
        assert_eq!(
            catalog[0].created_at,
            DateTime::parse_from_rfc3339("2025-01-15T10:30:00Z").unwrap()
        );
        assert_eq!(catalog[1].id, "backup-b2");
        assert_eq!(catalog[1].volume_name, "pvc-logs");
        assert_eq!(catalog[2].id, "backup-c3");
        Ok(())
    }

    #[test]
    fn test_timezone_offset_preserved() -> Result<(), RestoreServiceError> {
        let dir = store_with_three_backups();
        let catalog = scan_catalog(dir.path())?;

        assert_eq!(
            catalog[1].created_at,
            DateTime::parse_from_rfc3339("2025-02-10T23:59:59+01:00").unwrap()
        );
        Ok(())
    }

    #[test]
    fn test_empty_store_yields_empty_catalog() -> Result<(), RestoreServiceError> {
        let dir = tempdir()?;
        assert!(scan_catalog(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_files_outside_layout_are_ignored() -> Result<(), RestoreServiceError> {
        let dir = tempdir()?;

        // Right name, wrong depth
        let shallow = dir.path().join("backupstore/volumes/a1/backups");
        fs::create_dir_all(&shallow)?;
        fs::write(
            shallow.join("backup_backup-x.cfg"),
            descriptor_json("backup-x", "vol", "2025-01-01T00:00:00Z"),
        )?;

        // Right depth, wrong name
        write_descriptor(
            dir.path(),
            "pvc-data",
            "volume.cfg",
            &descriptor_json("backup-y", "pvc-data", "2025-01-01T00:00:00Z"),
        );

        assert!(scan_catalog(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_field_fails_whole_scan() {
        let dir = store_with_three_backups();
        write_descriptor(
            dir.path(),
            "pvc-data",
            "backup_backup-bad.cfg",
            r#"{"Name":"backup-bad","SnapshotCreatedAt":"2025-01-01T00:00:00Z"}"#,
        );

        let err = scan_catalog(dir.path()).unwrap_err();
        match err {
            RestoreServiceError::CatalogParse { path, .. } => {
                assert!(path.to_string_lossy().contains("backup_backup-bad.cfg"));
            }
            other => panic!("expected CatalogParse, got {:?}", other),
        }
    }

    #[test]
    fn test_unparsable_timestamp_fails_whole_scan() {
        let dir = tempdir().unwrap();
        write_descriptor(
            dir.path(),
            "pvc-data",
            "backup_backup-z.cfg",
            &descriptor_json("backup-z", "pvc-data", "yesterday"),
        );

        let err = scan_catalog(dir.path()).unwrap_err();
        assert!(matches!(err, RestoreServiceError::CatalogParse { .. }));
        assert!(err.to_string().contains("SnapshotCreatedAt"));
    }

    #[test]
    fn test_malformed_json_fails_whole_scan() {
        let dir = tempdir().unwrap();
        write_descriptor(dir.path(), "pvc-data", "backup_backup-q.cfg", "not json at all");

        let err = scan_catalog(dir.path()).unwrap_err();
        assert!(matches!(err, RestoreServiceError::CatalogParse { .. }));
    }
}
