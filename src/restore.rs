use crate::config::Config;
use crate::constants::{CONTAINER_RESTORE_DIR, ENGINE_IMAGE};
use crate::errors::RestoreServiceError;
use crate::ui::{create_restore_spinner, RestoreSelection};
use std::path::PathBuf;
use std::process::Command;
use tracing::info;

/// Parameters for one `longhorn backup restore-to-file` container run
#[derive(Debug, Clone)]
pub struct RestoreCommand {
    nfs: String,
    longhorn_version: String,
    outfile_parent: PathBuf,
    outfile_name: String,
    volume_name: String,
    backup_id: String,
}

impl RestoreCommand {
    pub fn new(config: &Config, selection: &RestoreSelection) -> Self {
        Self {
            nfs: config.nfs.clone(),
            longhorn_version: config.longhorn_version.clone(),
            outfile_parent: config.outfile_parent(),
            outfile_name: config.outfile_name(),
            volume_name: selection.volume_name.clone(),
            backup_id: selection.backup_id.clone(),
        }
    }

    /// Full `docker run` argument list. The output file's parent directory
    /// is bind-mounted into the container and the engine writes the raw
    /// image there; this process never touches the file itself.
    pub fn build_args(&self) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "--privileged".to_string(),
            "-v".to_string(),
            format!("{}:{}", self.outfile_parent.display(), CONTAINER_RESTORE_DIR),
            format!("{}:{}", ENGINE_IMAGE, self.longhorn_version),
            "longhorn".to_string(),
            "backup".to_string(),
            "restore-to-file".to_string(),
            format!(
                "{}?backup={}&volume={}",
                self.nfs, self.backup_id, self.volume_name
            ),
            "--output-file".to_string(),
            format!("{}/{}", CONTAINER_RESTORE_DIR, self.outfile_name),
            "--output-format".to_string(),
            "raw".to_string(),
        ]
    }

    /// Run the restore container and block until it exits. A non-zero exit
    /// is terminal; nothing cleans up a possibly-partial output file.
    pub async fn run(&self) -> Result<(), RestoreServiceError> {
        let args = self.build_args();
        info!(command = %format!("docker {}", args.join(" ")), "Running restore command");

        let spinner = create_restore_spinner();
        spinner.set_message(format!(
            "Restoring {}/{}",
            self.volume_name, self.backup_id
        ));

        let result = Command::new("docker").args(&args).status();
        spinner.finish_and_clear();

        let status = result.map_err(|_| {
            RestoreServiceError::CommandNotFound("Failed to execute docker".to_string())
        })?;

        if status.success() {
            info!(
                outfile = %self.outfile_parent.join(&self.outfile_name).display(),
                "Restore completed"
            );
            Ok(())
        } else {
            Err(RestoreServiceError::RestoreCommand(format!(
                "docker run exited with {}",
                status
            )))
        }
    }
}
