use crate::constants::DEFAULT_NFS_MOUNT_POINT;
use crate::errors::RestoreServiceError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub nfs: String,
    pub longhorn_version: String,
    pub outfile: PathBuf,
    /// Mount point for inspecting the restored file (accepted, not yet used
    /// during the restore itself)
    pub mount: Option<PathBuf>,
    pub nfs_mount_point: PathBuf,
}

impl Config {
    /// Build the run configuration from CLI arguments and run the output
    /// path pre-flight checks. Nothing is mounted before this succeeds.
    pub fn load(
        nfs: String,
        longhorn_version: String,
        outfile: PathBuf,
        mount: Option<PathBuf>,
        nfs_mount_point: Option<PathBuf>,
    ) -> Result<Self, RestoreServiceError> {
        dotenv::dotenv().ok();

        // CLI flag wins over the environment, which wins over the default
        let nfs_mount_point = nfs_mount_point
            .or_else(|| env::var("NFS_MOUNT_POINT").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NFS_MOUNT_POINT));

        let config = Config {
            nfs,
            longhorn_version,
            outfile,
            mount,
            nfs_mount_point,
        };

        config.validate_output_path()?;

        Ok(config)
    }

    /// The output file's parent directory must exist and the file itself
    /// must not, checked before any mount happens.
    pub fn validate_output_path(&self) -> Result<(), RestoreServiceError> {
        let parent = match self.outfile.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if !parent.exists() {
            return Err(RestoreServiceError::ArgumentValidation(format!(
                "output directory {} does not exist",
                parent.display()
            )));
        }

        if self.outfile.exists() {
            return Err(RestoreServiceError::ArgumentValidation(format!(
                "output file {} already exists",
                self.outfile.display()
            )));
        }

        Ok(())
    }

    /// Container-side destination path components for the restore
    pub fn outfile_parent(&self) -> PathBuf {
        match self.outfile.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    pub fn outfile_name(&self) -> String {
        self.outfile
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}
