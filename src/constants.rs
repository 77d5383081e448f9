// Shared constants used across the restore service

/// Backupstore layout under the NFS mount
pub const BACKUPSTORE_DIR: &str = "backupstore";
pub const VOLUMES_DIR: &str = "volumes";
pub const BACKUPS_DIR: &str = "backups";

/// Backup descriptor file naming
pub const DESCRIPTOR_PREFIX: &str = "backup_backup-";
pub const DESCRIPTOR_SUFFIX: &str = ".cfg";

/// Longhorn engine container
pub const ENGINE_IMAGE: &str = "longhornio/longhorn-engine";
pub const CONTAINER_RESTORE_DIR: &str = "/restore";

/// Default temporary mount point for the catalog scan
pub const DEFAULT_NFS_MOUNT_POINT: &str = "./temp_backup_query";

/// NFS URL scheme prefix stripped before calling mount(8)
pub const NFS_SCHEME_PREFIX: &str = "nfs://";
