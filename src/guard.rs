//! Snapshot, clear, and restore environment variables around a unit of work.
//!
//! [`EnvironmentGuard::engage`] records the current value of every target name
//! that is set, removes it, and hands back a guard. Releasing the guard, either
//! through [`EnvironmentGuard::restore`] or by dropping it during a panic,
//! puts the recorded values back and removes target names that were absent
//! before. Names outside the target set are never read or written.

use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::error::GuardError;
use crate::target::TargetNameSet;

/// Set while a guard is alive. Guards do not nest.
static ENGAGED: AtomicBool = AtomicBool::new(false);

mod env_mut {
    use std::ffi::OsStr;

    pub(super) fn set_var(key: &str, value: &OsStr) {
        // Safety: the engaged guard is the only writer of target names while it is alive.
        unsafe {
            std::env::set_var(key, value);
        }
    }

    pub(super) fn remove_var(key: &str) {
        // Safety: the engaged guard is the only writer of target names while it is alive.
        unsafe {
            std::env::remove_var(key);
        }
    }
}

/// Keys `std::env` accepts: non-empty, no `=`, no NUL.
fn is_env_key(name: &str) -> bool {
    !name.is_empty() && !name.contains(['=', '\0'])
}

// === Snapshot ===

/// Original values of the target names that were set at entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    values: BTreeMap<String, OsString>,
}

impl EnvironmentSnapshot {
    fn capture(targets: &TargetNameSet) -> Self {
        let values = targets
            .iter()
            .filter(|name| is_env_key(name))
            .filter_map(|name| env::var_os(name).map(|value| (name.to_string(), value)))
            .collect();
        Self { values }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&OsStr> {
        self.values.get(name).map(OsString::as_os_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// === Guard ===

/// Exclusive hold on the target names of the process environment.
#[derive(Debug)]
#[must_use = "dropping the guard restores the environment immediately"]
pub struct EnvironmentGuard {
    targets: TargetNameSet,
    snapshot: EnvironmentSnapshot,
    released: bool,
}

impl EnvironmentGuard {
    /// Snapshot and clear every target name.
    ///
    /// Fails without touching the environment if another guard is alive.
    pub fn engage(targets: TargetNameSet) -> Result<Self, GuardError> {
        if ENGAGED
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GuardError::AlreadyEngaged);
        }

        let snapshot = EnvironmentSnapshot::capture(&targets);
        for name in snapshot.names() {
            env_mut::remove_var(name);
        }

        info!(
            targets = targets.len(),
            cleared = snapshot.len(),
            "environment guard engaged"
        );
        Ok(Self {
            targets,
            snapshot,
            released: false,
        })
    }

    #[must_use]
    pub fn targets(&self) -> &TargetNameSet {
        &self.targets
    }

    #[must_use]
    pub fn snapshot(&self) -> &EnvironmentSnapshot {
        &self.snapshot
    }

    /// Whether a guard is currently alive in this process.
    #[must_use]
    pub fn is_engaged() -> bool {
        ENGAGED.load(Ordering::Acquire)
    }

    /// Restore the environment and release the guard.
    pub fn restore(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        for name in self.targets.iter().filter(|name| is_env_key(name)) {
            if !self.snapshot.contains(name) && env::var_os(name).is_some() {
                warn!("removing {name}, which was set while the environment guard was engaged");
                env_mut::remove_var(name);
            }
        }
        for (name, value) in &self.snapshot.values {
            env_mut::set_var(name, value);
        }

        debug!(restored = self.snapshot.len(), "environment guard released");
        ENGAGED.store(false, Ordering::Release);
    }
}

impl Drop for EnvironmentGuard {
    fn drop(&mut self) {
        self.release();
    }
}
