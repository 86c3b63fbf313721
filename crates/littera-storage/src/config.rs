use std::path::Path;

use littera_core::{LitteraError, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Persisted contents of `<work>/.littera/config.yml`.
///
/// `port` is written once on first cluster init and never silently changed;
/// if the recorded port is later found to be occupied by something else, the
/// cluster refuses to start rather than picking a new one behind the
/// caller's back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkConfig {
    pub work_id: Uuid,
    pub port: u16,
    pub engine_version: String,
    /// Idle-lease override in seconds; `None` means use the process default.
    #[serde(default)]
    pub idle_lease_secs: Option<u64>,
}

impl WorkConfig {
    pub fn config_path(work_dir: &Path) -> std::path::PathBuf {
        work_dir.join(".littera").join("config.yml")
    }

    pub fn load(work_dir: &Path) -> Result<Self> {
        let path = Self::config_path(work_dir);
        let raw = std::fs::read_to_string(&path)?;
        serde_yaml::from_str(&raw)
            .map_err(|e| LitteraError::Internal(format!("malformed config.yml: {e}")))
    }

    pub fn save(&self, work_dir: &Path) -> Result<()> {
        let path = Self::config_path(work_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_yaml::to_string(self)
            .map_err(|e| LitteraError::Internal(format!("failed to serialize config.yml: {e}")))?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    pub fn exists(work_dir: &Path) -> bool {
        Self::config_path(work_dir).is_file()
    }

    /// Idle-lease duration after layering the environment override on top of
    /// the file value: `LITTERA_IDLE_LEASE_SECS` wins if set, then the file's
    /// `idle_lease_secs`, then the 300s interactive default. `LITTERA_TEST_MODE`
    /// forces a zero lease regardless of the above.
    pub fn idle_lease_secs(&self) -> u64 {
        if std::env::var("LITTERA_TEST_MODE").is_ok() {
            return 0;
        }
        if let Ok(raw) = std::env::var("LITTERA_IDLE_LEASE_SECS") {
            if let Ok(v) = raw.parse() {
                return v;
            }
        }
        self.idle_lease_secs.unwrap_or(300)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> WorkConfig {
        WorkConfig {
            work_id: Uuid::new_v4(),
            port: 55123,
            engine_version: "16.4.0".to_string(),
            idle_lease_secs: None,
        }
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let cfg = sample();
        cfg.save(dir.path()).unwrap();
        assert!(WorkConfig::exists(dir.path()));
        let loaded = WorkConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.work_id, cfg.work_id);
        assert_eq!(loaded.port, cfg.port);
    }

    #[test]
    fn missing_config_is_an_error_not_a_panic() {
        let dir = tempdir().unwrap();
        assert!(WorkConfig::load(dir.path()).is_err());
    }

    #[test]
    fn test_mode_env_forces_zero_lease() {
        std::env::set_var("LITTERA_TEST_MODE", "1");
        let cfg = sample();
        assert_eq!(cfg.idle_lease_secs(), 0);
        std::env::remove_var("LITTERA_TEST_MODE");
    }

    #[test]
    fn default_lease_is_300_seconds() {
        std::env::remove_var("LITTERA_TEST_MODE");
        std::env::remove_var("LITTERA_IDLE_LEASE_SECS");
        let cfg = sample();
        assert_eq!(cfg.idle_lease_secs(), 300);
    }
}
