//! `littera maintenance wal-reset`/`reinit` — filesystem-level recovery
//! actions on a Work's on-disk `pgdata` directory. Callers must ensure the
//! Work's cluster is not live before invoking either: both operate directly
//! on files the running `postgres` process would otherwise hold open.

use std::path::Path;

use littera_core::Result;

use crate::output::CommandOutput;

pub struct MaintenanceCommands;

impl MaintenanceCommands {
    /// Clears and recreates `pgdata/pg_wal/`. Lossy for any WAL not yet
    /// checkpointed into the heap, but preserves committed data files.
    pub fn wal_reset(work_dir: &Path) -> Result<CommandOutput> {
        littera_storage::wal_reset(work_dir)?;
        Ok(CommandOutput::message(format!(
            "reset write-ahead log for {}",
            work_dir.display()
        )))
    }

    /// Deletes the entire `pgdata` directory. The next cluster start
    /// reinitializes from scratch; every Document, Section, Block, Entity,
    /// and Review in this Work is lost.
    pub fn reinit(work_dir: &Path) -> Result<CommandOutput> {
        littera_storage::reinit(work_dir)?;
        Ok(CommandOutput::message(format!(
            "reinitialized storage cluster for {}",
            work_dir.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wal_reset_on_missing_pgdata_succeeds_as_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let out = MaintenanceCommands::wal_reset(dir.path()).unwrap();
        assert!(out.human.contains("reset write-ahead log"));
    }

    #[test]
    fn reinit_on_missing_pgdata_succeeds_as_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let out = MaintenanceCommands::reinit(dir.path()).unwrap();
        assert!(out.human.contains("reinitialized"));
    }
}
