//! Template-keyed policy cache
//!
//! Each certificate template maps to one policy file. [`PolicyCache`] hands
//! out `Arc` snapshots of the parsed document: a reader holds the read lock
//! only long enough to clone the `Arc`, so a reload never blocks an
//! evaluation that is already running.
//!
//! A file is reloaded when its modification time differs from the cached
//! one. Reloads of one template are serialized by a per-template mutex, so
//! concurrent callers that notice the same change parse the file once. A
//! failed reload returns its error and keeps the previous snapshot.

use crate::error::{Error, Result};
use crate::parser::load_policy;
use cert_policy::PolicyDocument;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::SystemTime;
use tracing::{debug, info};

#[derive(Debug)]
struct CachedPolicy {
    path: PathBuf,
    modified: SystemTime,
    policy: Arc<PolicyDocument>,
}

impl CachedPolicy {
    fn is_current(&self, path: &Path, modified: SystemTime) -> bool {
        self.path == path && self.modified == modified
    }
}

/// Cache of parsed policy documents keyed by template name
#[derive(Debug, Default)]
pub struct PolicyCache {
    entries: RwLock<HashMap<String, CachedPolicy>>,
    reload_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

fn poisoned<T>(e: PoisonError<T>) -> Error {
    Error::LockPoisoned(e.to_string())
}

fn modification_time(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| Error::io(path, e))
}

impl PolicyCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the policy for `template`, loading or reloading `path` if the
    /// cached snapshot is missing or stale
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be inspected or read, if it does
    /// not parse, or if a lock was poisoned. A cached snapshot is left in
    /// place when a reload fails.
    pub fn get_or_load(&self, template: &str, path: impl AsRef<Path>) -> Result<Arc<PolicyDocument>> {
        let path = path.as_ref();
        let modified = modification_time(path)?;

        if let Some(policy) = self.current(template, path, modified)? {
            debug!(template, "policy cache hit");
            return Ok(policy);
        }

        let reload_lock = self.reload_lock(template)?;
        let _guard = reload_lock.lock().map_err(poisoned)?;

        // another caller may have finished the same reload while we waited
        if let Some(policy) = self.current(template, path, modified)? {
            debug!(template, "policy reloaded by concurrent caller");
            return Ok(policy);
        }

        let policy = Arc::new(load_policy(path)?);
        info!(template, path = %path.display(), "policy reloaded");

        self.entries.write().map_err(poisoned)?.insert(
            template.to_string(),
            CachedPolicy {
                path: path.to_path_buf(),
                modified,
                policy: Arc::clone(&policy),
            },
        );
        Ok(policy)
    }

    /// The cached snapshot for `template`, without checking the file
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the cache lock was poisoned.
    pub fn get(&self, template: &str) -> Result<Option<Arc<PolicyDocument>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(template).map(|entry| Arc::clone(&entry.policy)))
    }

    /// Drop the snapshot for `template`; returns whether one was cached
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the cache lock was poisoned.
    pub fn invalidate(&self, template: &str) -> Result<bool> {
        let removed = self.entries.write().map_err(poisoned)?.remove(template);
        if removed.is_some() {
            debug!(template, "policy cache entry invalidated");
        }
        Ok(removed.is_some())
    }

    /// Names of all cached templates
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the cache lock was poisoned.
    pub fn templates(&self) -> Result<Vec<String>> {
        let entries = self.entries.read().map_err(poisoned)?;
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    fn current(
        &self,
        template: &str,
        path: &Path,
        modified: SystemTime,
    ) -> Result<Option<Arc<PolicyDocument>>> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries
            .get(template)
            .filter(|entry| entry.is_current(path, modified))
            .map(|entry| Arc::clone(&entry.policy)))
    }

    fn reload_lock(&self, template: &str) -> Result<Arc<Mutex<()>>> {
        let mut locks = self.reload_locks.lock().map_err(poisoned)?;
        Ok(Arc::clone(locks.entry(template.to_string()).or_default()))
    }
}
