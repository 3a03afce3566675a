//! In-place update of one application's record.
//!
//! Every update is a full read-modify-write of the store. Inside one process
//! the `write_lock` makes this single-writer; across processes the caller
//! passes the version it read and a stale write is rejected with `Conflict`.

use std::sync::{Arc, Mutex, PoisonError};

use crate::canary::error::{CanaryError, CanaryResult};
use crate::canary::lookup::position_of;
use crate::canary::types::AppRecord;
use crate::canary::validation::{into_canary_error, validate_record};
use crate::store::{ConfigStore, Version};

/// Serializes writes to a `ConfigStore`.
#[derive(Debug)]
pub struct ConfigUpdater {
    store: Arc<ConfigStore>,
    write_lock: Mutex<()>,
}

impl ConfigUpdater {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Replace the record with the same name; returns the new store version.
    pub fn update_record(&self, record: AppRecord) -> CanaryResult<Version> {
        self.apply(record, None)
    }

    /// As `update_record`, but only if the store is still at `expected`.
    pub fn update_record_if(&self, record: AppRecord, expected: Version) -> CanaryResult<Version> {
        self.apply(record, Some(expected))
    }

    fn apply(&self, record: AppRecord, expected: Option<Version>) -> CanaryResult<Version> {
        validate_record(&record).map_err(into_canary_error)?;

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let (mut set, current) = self.store.load_versioned()?;
        if let Some(expected) = expected {
            if expected != current {
                tracing::warn!(
                    app = %record.name,
                    expected = %expected,
                    actual = %current,
                    "Rejecting stale canary update"
                );
                return Err(CanaryError::Conflict {
                    expected,
                    actual: current,
                });
            }
        }

        let pos = position_of(&set, &record.name)
            .ok_or_else(|| CanaryError::NotFound(record.name.clone()))?;

        let before = set.apps.len();
        let mut index = 0;
        set.apps.retain(|app| {
            let keep = index <= pos || app.name != record.name;
            index += 1;
            keep
        });
        if set.apps.len() != before {
            tracing::warn!(
                app = %record.name,
                removed = before - set.apps.len(),
                "Dropped duplicate canary records"
            );
        }

        let name = record.name.clone();
        set.apps[pos] = record;
        let version = self.store.save(&set)?;

        tracing::info!(app = %name, version = %version, "Canary record updated");
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canary::types::ConfigSet;
    use crate::store::MemoryBackend;
    use std::fs;

    const STORE: &str = "\
Apps:
- Name: jupyterhub
  Disable: false
  CookieInfo:
    Expiration: 48h
    CanaryPercent: 0.9
    IfSuccessful:
      Key: a
      Value: a
    IfFail:
      Key: b
      Value: b
  View:
    ShowSuccess: true
    ShowFail: true
  Logging:
    Disable: false
Port: 8080
";

    fn file_updater() -> (tempfile::TempDir, std::path::PathBuf, ConfigUpdater) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployment-controller.yaml");
        fs::write(&path, STORE).unwrap();
        let updater = ConfigUpdater::new(Arc::new(ConfigStore::from_path(&path)));
        (dir, path, updater)
    }

    fn jupyterhub(updater: &ConfigUpdater) -> AppRecord {
        updater.store().load().unwrap().apps[0].clone()
    }

    #[test]
    fn test_update_logging_flag() {
        let (_dir, _path, updater) = file_updater();
        let mut app = jupyterhub(&updater);
        app.logging.disable = true;

        updater.update_record(app.clone()).unwrap();

        let saved = updater.store().load().unwrap();
        assert_eq!(saved.apps.len(), 1);
        assert_eq!(saved.apps[0], app);
        assert_eq!(saved.apps[0].name, "jupyterhub");
        assert!(saved.apps[0].logging.disable);
        assert_eq!(saved.port, 8080);
    }

    #[test]
    fn test_absent_name_leaves_file_untouched() {
        let (_dir, path, updater) = file_updater();
        let before = fs::read(&path).unwrap();

        let mut app = jupyterhub(&updater);
        app.name = "other-app".into();
        match updater.update_record(app) {
            Err(CanaryError::NotFound(name)) => assert_eq!(name, "other-app"),
            other => panic!("expected NotFound, got {:?}", other),
        }

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_invalid_record_rejected_before_write() {
        let (_dir, path, updater) = file_updater();
        let before = fs::read(&path).unwrap();

        let mut app = jupyterhub(&updater);
        app.cookie_info.expiration = "abc".into();
        assert!(matches!(
            updater.update_record(app.clone()),
            Err(CanaryError::InvalidArgument(_))
        ));

        app.cookie_info.expiration = "1h".into();
        app.cookie_info.canary_percent = 1.5;
        assert!(matches!(
            updater.update_record(app),
            Err(CanaryError::InvalidArgument(_))
        ));

        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let (_dir, path, updater) = file_updater();
        let (set, v0) = updater.store().load_versioned().unwrap();

        let mut first = set.apps[0].clone();
        first.cookie_info.canary_percent = 0.5;
        let v1 = updater.update_record_if(first, v0).unwrap();
        assert_ne!(v0, v1);

        let after_first = fs::read(&path).unwrap();
        let mut second = set.apps[0].clone();
        second.view.show_fail = false;
        match updater.update_record_if(second.clone(), v0) {
            Err(CanaryError::Conflict { expected, actual }) => {
                assert_eq!(expected, v0);
                assert_eq!(actual, v1);
            }
            other => panic!("expected Conflict, got {:?}", other),
        }
        assert_eq!(fs::read(&path).unwrap(), after_first);

        updater.update_record_if(second, v1).unwrap();
        let saved = updater.store().load().unwrap();
        assert!(!saved.apps[0].view.show_fail);
    }

    #[test]
    fn test_keeps_position_and_drops_duplicates() {
        let mut set: ConfigSet = serde_yaml::from_str(STORE).unwrap();
        let mut other = set.apps[0].clone();
        other.name = "grafana".into();
        let mut dup = set.apps[0].clone();
        dup.cookie_info.canary_percent = 0.1;
        set.apps.insert(0, other);
        set.apps.push(dup);

        let store = Arc::new(ConfigStore::new(MemoryBackend::empty()));
        store.save(&set).unwrap();
        let updater = ConfigUpdater::new(store.clone());

        let mut app = set.apps[1].clone();
        app.mode = Some("canary".into());
        updater.update_record(app.clone()).unwrap();

        let saved = store.load().unwrap();
        let names: Vec<_> = saved.apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["grafana", "jupyterhub"]);
        assert_eq!(saved.apps[1], app);
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let store = Arc::new(ConfigStore::new(MemoryBackend::new(STORE)));
        let updater = Arc::new(ConfigUpdater::new(store.clone()));
        let base = store.load().unwrap().apps[0].clone();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let updater = updater.clone();
                let mut app = base.clone();
                app.cookie_info.if_successful.value = format!("v{}", i);
                std::thread::spawn(move || updater.update_record(app).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let saved = store.load().unwrap();
        assert_eq!(saved.apps.len(), 1);
        assert!(saved.apps[0].cookie_info.if_successful.value.starts_with('v'));
    }
}
