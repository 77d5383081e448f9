use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, error, info};

mod catalog;
mod config;
mod constants;
mod errors;
mod mount;
mod restore;
mod ui;

#[derive(Parser)]
#[command(name = "longhorn-restore-service")]
#[command(about = "Restore longhorn volume backups from an NFS backupstore", long_about = None)]
struct Cli {
    /// NFS path of the longhorn backupstore, e.g. nfs://host/export
    nfs: String,
    /// longhorn-engine image tag to run the restore with
    longhorn_version: String,
    /// Path to write the restored raw image. The parent directory must
    /// exist; the file itself must not.
    outfile: PathBuf,
    /// Mount point for inspecting the restored file (accepted, not yet used)
    #[arg(long)]
    mount: Option<PathBuf>,
    /// Temporary mount point for the catalog scan
    #[arg(long)]
    nfs_mount_point: Option<PathBuf>,
}

fn init_logging() -> Result<(), errors::RestoreServiceError> {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt::writer::MakeWriterExt, EnvFilter};

    std::fs::create_dir_all("./logs")?;

    let file_appender = rolling::daily("./logs", "longhorn-restore.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking))
        .with_env_filter(env_filter)
        .init();

    // The appender guard must outlive the process
    std::mem::forget(guard);

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, "Restore failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), errors::RestoreServiceError> {
    init_logging()?;

    let cli = Cli::parse();
    let config = config::Config::load(
        cli.nfs,
        cli.longhorn_version,
        cli.outfile,
        cli.mount,
        cli.nfs_mount_point,
    )?;

    info!(nfs = %config.nfs, "NFS path");
    if let Some(mount) = &config.mount {
        debug!(mount = %mount.display(), "Inspection mount point set, unused during restore");
    }

    // The share stays mounted only for the duration of the scan; the
    // session guard unmounts on every exit from this block.
    let catalog = {
        let session = mount::NfsSession::mount(&config.nfs, &config.nfs_mount_point)?;
        catalog::scan_catalog(session.mount_point())?
    };

    let selection = ui::select_backup(&catalog)?;

    info!(
        volume = %selection.volume_name,
        backup = %selection.backup_id,
        "Restoring backup"
    );
    restore::RestoreCommand::new(&config, &selection).run().await?;

    Ok(())
}
