//! Embedded-cluster lifecycle for a single Work.
//!
//! Each Work owns one Postgres cluster under `<work>/.littera/pgdata`, started
//! on demand and stopped after an idle lease. Acquiring the cluster is the
//! suspension point every command-path operation passes through before it can
//! touch the database.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use deadpool_postgres::{Config as PoolConfig, Pool, Runtime};
use littera_core::{LitteraError, Result};
use postgresql_embedded::{PostgreSQL, Settings};
use sysinfo::{Pid, System};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::WorkConfig;
use crate::port::allocate_port;
use crate::schema::run_migrations;

const DB_NAME: &str = "littera";
const DB_USER: &str = "littera";
const DB_PASSWORD: &str = "littera";
const DEFAULT_ENGINE_VERSION: &str = "16.4.0";
const READINESS_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolve the process-global binary cache directory for one engine version.
///
/// Append-only and shared across every Work on the machine; `postgresql_embedded`
/// downloads into it once and every subsequent cluster reuses the install.
pub fn binary_cache_dir(engine_version: &str) -> PathBuf {
    let base = dirs::cache_dir().unwrap_or_else(std::env::temp_dir);
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    base.join("littera")
        .join("embedded")
        .join(engine_version)
        .join(format!("{os}-{arch}"))
}

fn pgdata_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(".littera").join("pgdata")
}

/// Read the pid recorded in `pgdata/postmaster.pid`, if the lock file exists.
fn lock_file_pid(work_dir: &Path) -> Option<u32> {
    let contents = std::fs::read_to_string(pgdata_dir(work_dir).join("postmaster.pid")).ok()?;
    contents.lines().next()?.trim().parse().ok()
}

fn pid_is_alive(pid: u32) -> bool {
    let system = System::new_all();
    system.process(Pid::from_u32(pid)).is_some()
}

/// Remove a lock file left behind by a process that is no longer running.
/// This is the one form of silent recovery the storage layer performs.
fn clear_stale_lock(work_dir: &Path) -> Result<()> {
    if let Some(pid) = lock_file_pid(work_dir) {
        if !pid_is_alive(pid) {
            warn!(pid, "removing stale postmaster lock from a dead process");
            let lock_path = pgdata_dir(work_dir).join("postmaster.pid");
            if lock_path.exists() {
                std::fs::remove_file(lock_path)?;
            }
        }
    }
    Ok(())
}

fn looks_like_wal_corruption(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("invalid wal") || lower.contains("wal file") && lower.contains("corrupt")
}

/// A running (or lazily-startable) cluster handle for one Work directory.
pub struct ClusterHandle {
    work_dir: PathBuf,
    config: WorkConfig,
    engine: Arc<Mutex<Option<PostgreSQL>>>,
}

impl ClusterHandle {
    /// Load or initialise `<work>/.littera/config.yml`, then start the
    /// cluster if it isn't already running. Serialized per-process via the
    /// handle's internal mutex so concurrent acquires within one process
    /// don't race to start two postmasters.
    pub async fn acquire(work_dir: impl Into<PathBuf>) -> Result<Self> {
        let work_dir = work_dir.into();

        let config = if WorkConfig::exists(&work_dir) {
            WorkConfig::load(&work_dir)?
        } else {
            let port = allocate_port()?;
            let config = WorkConfig {
                work_id: uuid::Uuid::new_v4(),
                port,
                engine_version: DEFAULT_ENGINE_VERSION.to_string(),
                idle_lease_secs: None,
            };
            config.save(&work_dir)?;
            config
        };

        clear_stale_lock(&work_dir)?;

        let handle = Self {
            work_dir,
            config,
            engine: Arc::new(Mutex::new(None)),
        };
        handle.start().await?;
        Ok(handle)
    }

    async fn start(&self) -> Result<()> {
        let mut guard = self.engine.lock().await;
        if guard.is_some() {
            return Ok(());
        }

        let mut settings = Settings::default();
        settings.version = self.config.engine_version.parse().unwrap_or_default();
        settings.port = self.config.port;
        settings.data_dir = pgdata_dir(&self.work_dir);
        settings.installation_dir = binary_cache_dir(&self.config.engine_version);
        settings.username = DB_USER.to_string();
        settings.password = DB_PASSWORD.to_string();
        settings.timeout = Some(READINESS_TIMEOUT);

        let mut postgresql = PostgreSQL::new(settings);

        debug!(port = self.config.port, "starting embedded cluster");
        postgresql.setup().await.map_err(|e| classify_start_error(&e.to_string()))?;
        postgresql
            .start()
            .await
            .map_err(|e| classify_start_error(&e.to_string()))?;

        if !postgresql
            .database_exists(DB_NAME)
            .await
            .map_err(|e| LitteraError::BackendUnavailable(e.to_string()))?
        {
            postgresql
                .create_database(DB_NAME)
                .await
                .map_err(|e| LitteraError::BackendUnavailable(e.to_string()))?;
        }

        info!(port = self.config.port, "embedded cluster ready");
        *guard = Some(postgresql);
        Ok(())
    }

    /// Build (or reuse) a connection pool against this cluster and run
    /// pending migrations. Binding is always loopback-only.
    pub async fn pool(&self) -> Result<Pool> {
        let mut pool_config = PoolConfig::new();
        pool_config.host = Some("127.0.0.1".to_string());
        pool_config.port = Some(self.config.port);
        pool_config.user = Some(DB_USER.to_string());
        pool_config.password = Some(DB_PASSWORD.to_string());
        pool_config.dbname = Some(DB_NAME.to_string());

        let pool = pool_config
            .create_pool(Some(Runtime::Tokio1), tokio_postgres::NoTls)
            .map_err(|e| LitteraError::BackendUnavailable(e.to_string()))?;

        let client = pool.get().await?;
        run_migrations(&client).await?;

        Ok(pool)
    }

    /// Stop the cluster. Guaranteed to run on every exit path by callers that
    /// wrap command execution in a scope guard (see `littera-commands`).
    pub async fn release(&self) -> Result<()> {
        let mut guard = self.engine.lock().await;
        if let Some(mut postgresql) = guard.take() {
            postgresql
                .stop()
                .await
                .map_err(|e| LitteraError::BackendUnavailable(e.to_string()))?;
        }
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.config.port
    }

    pub fn work_id(&self) -> uuid::Uuid {
        self.config.work_id
    }
}

/// Idle-lease sleep helper: callers spawn this after `release` is scheduled
/// and cancel it if the Work is reacquired before it fires.
pub async fn idle_sleep(secs: u64) {
    if secs > 0 {
        sleep(Duration::from_secs(secs)).await;
    }
}

/// Removes the cluster's write-ahead log segments without touching the rest
/// of `pgdata`. Lossy for any transaction not yet checkpointed, but leaves
/// already-committed heap data in place. The Work must not have a live
/// `ClusterHandle` when this runs.
pub fn wal_reset(work_dir: &Path) -> Result<()> {
    let wal_dir = pgdata_dir(work_dir).join("pg_wal");
    if wal_dir.exists() {
        std::fs::remove_dir_all(&wal_dir)?;
        std::fs::create_dir_all(&wal_dir)?;
    }
    Ok(())
}

/// Destroys the cluster's entire data directory. The next `acquire` for this
/// Work starts from a fresh, empty database. The Work must not have a live
/// `ClusterHandle` when this runs.
pub fn reinit(work_dir: &Path) -> Result<()> {
    let dir = pgdata_dir(work_dir);
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    Ok(())
}

fn classify_start_error(message: &str) -> LitteraError {
    if looks_like_wal_corruption(message) {
        LitteraError::BackendUnavailable(format!(
            "{message} (remediation: run `littera maintenance wal-reset` or \
             `littera maintenance reinit`)"
        ))
    } else {
        LitteraError::BackendUnavailable(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_cache_dir_is_keyed_by_version_and_platform() {
        let dir = binary_cache_dir("16.4.0");
        let s = dir.to_string_lossy();
        assert!(s.contains("16.4.0"));
        assert!(s.contains(std::env::consts::OS));
        assert!(s.contains(std::env::consts::ARCH));
    }

    #[test]
    fn wal_corruption_message_is_detected() {
        assert!(looks_like_wal_corruption(
            "PANIC: invalid WAL file found at offset 40"
        ));
        assert!(looks_like_wal_corruption(
            "could not read WAL file: data is corrupt"
        ));
        assert!(!looks_like_wal_corruption("connection refused"));
    }

    #[test]
    fn classify_start_error_adds_remediation_for_wal_issues() {
        let err = classify_start_error("invalid WAL file detected");
        match err {
            LitteraError::BackendUnavailable(msg) => {
                assert!(msg.contains("wal-reset"));
                assert!(msg.contains("reinit"));
            }
            _ => panic!("expected BackendUnavailable"),
        }
    }

    #[test]
    fn pid_is_alive_returns_true_for_current_process() {
        assert!(pid_is_alive(std::process::id()));
    }

    #[test]
    fn pid_is_alive_returns_false_for_implausible_pid() {
        assert!(!pid_is_alive(u32::MAX));
    }

    #[test]
    fn wal_reset_recreates_empty_wal_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let wal_dir = pgdata_dir(tmp.path()).join("pg_wal");
        std::fs::create_dir_all(&wal_dir).unwrap();
        std::fs::write(wal_dir.join("000000010000000000000001"), b"stale").unwrap();

        wal_reset(tmp.path()).unwrap();

        assert!(wal_dir.exists());
        assert_eq!(std::fs::read_dir(&wal_dir).unwrap().count(), 0);
    }

    #[test]
    fn reinit_removes_entire_pgdata_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let pgdata = pgdata_dir(tmp.path());
        std::fs::create_dir_all(&pgdata).unwrap();
        std::fs::write(pgdata.join("PG_VERSION"), b"16").unwrap();

        reinit(tmp.path()).unwrap();

        assert!(!pgdata.exists());
    }

    #[test]
    fn reinit_on_missing_pgdata_is_not_found_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(reinit(tmp.path()).is_ok());
    }
}
