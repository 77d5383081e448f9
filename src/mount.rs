use crate::constants::NFS_SCHEME_PREFIX;
use crate::errors::RestoreServiceError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

/// Scoped NFS mount for the catalog scan.
///
/// The share is mounted when the session is created and released when it is
/// dropped, on both the success and the error path. Killing the process
/// between the two skips the release; that is accepted.
pub struct NfsSession {
    mount_point: PathBuf,
}

impl NfsSession {
    pub fn mount(nfs: &str, mount_point: &Path) -> Result<Self, RestoreServiceError> {
        create_mount_point(mount_point)?;

        let source = share_source(nfs);
        let status = Command::new("sudo")
            .args(["mount", "-t", "nfs"])
            .arg(&source)
            .arg(mount_point)
            .status()
            .map_err(|_| {
                let _ = fs::remove_dir(mount_point);
                RestoreServiceError::CommandNotFound("Failed to execute mount".to_string())
            })?;

        if !status.success() {
            let _ = fs::remove_dir(mount_point);
            return Err(RestoreServiceError::Mount(format!(
                "mount -t nfs {} {} exited with {}",
                source,
                mount_point.display(),
                status
            )));
        }

        info!(
            source = %source,
            mount_point = %mount_point.display(),
            "NFS share mounted"
        );

        Ok(Self {
            mount_point: mount_point.to_path_buf(),
        })
    }

    pub fn mount_point(&self) -> &Path {
        &self.mount_point
    }
}

impl Drop for NfsSession {
    fn drop(&mut self) {
        match Command::new("sudo")
            .arg("umount")
            .arg(&self.mount_point)
            .status()
        {
            Ok(status) if status.success() => {
                info!(mount_point = %self.mount_point.display(), "NFS share unmounted");
            }
            Ok(status) => {
                warn!(
                    mount_point = %self.mount_point.display(),
                    status = %status,
                    "umount exited non-zero"
                );
            }
            Err(e) => {
                warn!(
                    mount_point = %self.mount_point.display(),
                    error = %e,
                    "Failed to run umount"
                );
            }
        }

        if let Err(e) = fs::remove_dir(&self.mount_point) {
            warn!(
                mount_point = %self.mount_point.display(),
                error = %e,
                "Failed to remove mount point"
            );
        }
    }
}

/// Create the temporary mount point. A pre-existing directory is an error:
/// it may hold a stale mount from an earlier run.
fn create_mount_point(path: &Path) -> Result<(), RestoreServiceError> {
    fs::create_dir(path).map_err(|e| {
        RestoreServiceError::Mount(format!(
            "cannot create mount point {}: {}",
            path.display(),
            e
        ))
    })
}

/// `server:/export` source string for mount(8), with the `nfs://` scheme
/// prefix stripped.
fn share_source(nfs: &str) -> String {
    nfs.strip_prefix(NFS_SCHEME_PREFIX).unwrap_or(nfs).to_string()
}
