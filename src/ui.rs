use crate::catalog::BackupRecord;
use crate::errors::RestoreServiceError;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::info;

/// Validated operator choices: a volume plus a backup id
#[derive(Debug, Clone)]
pub struct RestoreSelection {
    pub volume_name: String,
    pub backup_id: String,
}

/// Walk the operator through volume and backup selection.
///
/// Both prompts loop until the input exactly matches a valid choice; there
/// is no fuzzy matching and no non-interactive escape.
pub fn select_backup(catalog: &[BackupRecord]) -> Result<RestoreSelection, RestoreServiceError> {
    let volumes = distinct_volumes(catalog);
    for volume in &volumes {
        info!(volume = %volume, "Volume");
    }

    let volume_name = prompt_until_valid("Select a volume", &volumes, "Invalid volume")?;

    for backup in catalog.iter().filter(|b| b.volume_name == volume_name) {
        info!(
            backup = %backup.id,
            created_at = %backup.created_at.format("%Y-%m-%d %H:%M:%S %:z"),
            "Backup"
        );
    }

    // Ids are accepted from the whole catalog here, not just the selected
    // volume's. See DESIGN.md before tightening this.
    let all_ids: BTreeSet<String> = catalog.iter().map(|b| b.id.clone()).collect();
    let backup_id = prompt_until_valid("Select a backup", &all_ids, "Invalid backup")?;

    Ok(RestoreSelection {
        volume_name,
        backup_id,
    })
}

/// Distinct volume names in the catalog, deterministically ordered
pub fn distinct_volumes(catalog: &[BackupRecord]) -> BTreeSet<String> {
    catalog.iter().map(|b| b.volume_name.clone()).collect()
}

fn prompt_until_valid(
    prompt: &str,
    valid: &BTreeSet<String>,
    reject_message: &str,
) -> Result<String, RestoreServiceError> {
    loop {
        let input: String = Input::new().with_prompt(prompt).interact_text()?;
        if let Some(choice) = first_valid_choice([input], valid) {
            return Ok(choice);
        }
        info!("{}", reject_message);
    }
}

/// First attempt that exactly matches an entry of `valid`, if any
pub fn first_valid_choice<I>(attempts: I, valid: &BTreeSet<String>) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    attempts.into_iter().find(|attempt| valid.contains(attempt))
}

/// Create and configure progress bar for the catalog scan
pub fn create_scan_progress_bar(total: usize) -> Result<ProgressBar, RestoreServiceError> {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(pb)
}

/// Spinner shown while the restore container runs
pub fn create_restore_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}
