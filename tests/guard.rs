//! Integration tests for snapshot, clear, and restore of the process environment.

use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard, OnceLock};

use envguard::{EnvironmentGuard, GuardError, TargetNameSet};
use pretty_assertions::assert_eq;

fn lock_test_env() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    match LOCK.get_or_init(|| Mutex::new(())).lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn set(key: &str, value: impl AsRef<std::ffi::OsStr>) {
    // Safety: test-only environment mutation guarded by a global mutex.
    unsafe {
        env::set_var(key, value);
    }
}

fn unset(key: &str) {
    // Safety: test-only environment mutation guarded by a global mutex.
    unsafe {
        env::remove_var(key);
    }
}

fn full_env() -> BTreeMap<OsString, OsString> {
    env::vars_os().collect()
}

fn targets(names: &[&str]) -> TargetNameSet {
    names.iter().copied().collect()
}

#[test]
fn engage_then_restore_leaves_environment_identical() {
    let _lock = lock_test_env();
    set("ENVGUARD_IT_PLAIN", "value with spaces = and equals");
    set("ENVGUARD_IT_EMPTY", "");
    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        set(
            "ENVGUARD_IT_BYTES",
            std::ffi::OsStr::from_bytes(&[0x66, 0x6f, 0xff, 0x6f]),
        );
    }
    unset("ENVGUARD_IT_UNSET");

    let before = full_env();
    let guard = EnvironmentGuard::engage(targets(&[
        "ENVGUARD_IT_PLAIN",
        "ENVGUARD_IT_EMPTY",
        "ENVGUARD_IT_BYTES",
        "ENVGUARD_IT_UNSET",
    ]))
    .unwrap();
    guard.restore();

    assert_eq!(full_env(), before);

    for key in ["ENVGUARD_IT_PLAIN", "ENVGUARD_IT_EMPTY", "ENVGUARD_IT_BYTES"] {
        unset(key);
    }
}

#[test]
fn absent_names_stay_absent_even_if_work_sets_them() {
    let _lock = lock_test_env();
    unset("ENVGUARD_IT_NEW_A");
    unset("ENVGUARD_IT_NEW_B");

    let guard =
        EnvironmentGuard::engage(targets(&["ENVGUARD_IT_NEW_A", "ENVGUARD_IT_NEW_B"])).unwrap();
    assert!(guard.snapshot().is_empty());
    set("ENVGUARD_IT_NEW_A", "created during the session");
    drop(guard);

    assert!(env::var_os("ENVGUARD_IT_NEW_A").is_none());
    assert!(env::var_os("ENVGUARD_IT_NEW_B").is_none());
}

#[test]
fn names_outside_the_target_set_are_untouched() {
    let _lock = lock_test_env();
    set("ENVGUARD_IT_OUTSIDE", "keep me");
    set("ENVGUARD_IT_INSIDE", "clear me");

    let guard = EnvironmentGuard::engage(targets(&["ENVGUARD_IT_INSIDE"])).unwrap();
    assert_eq!(env::var("ENVGUARD_IT_OUTSIDE").as_deref(), Ok("keep me"));
    assert!(env::var_os("ENVGUARD_IT_INSIDE").is_none());

    set("ENVGUARD_IT_OUTSIDE", "changed by the session");
    guard.restore();

    assert_eq!(
        env::var("ENVGUARD_IT_OUTSIDE").as_deref(),
        Ok("changed by the session")
    );
    assert_eq!(env::var("ENVGUARD_IT_INSIDE").as_deref(), Ok("clear me"));

    unset("ENVGUARD_IT_OUTSIDE");
    unset("ENVGUARD_IT_INSIDE");
}

#[test]
fn panicking_work_still_restores() {
    let _lock = lock_test_env();
    set("ENVGUARD_IT_PANIC", "before");
    unset("ENVGUARD_IT_PANIC_NEW");

    let result: std::thread::Result<()> = catch_unwind(AssertUnwindSafe(|| {
        let _guard =
            EnvironmentGuard::engage(targets(&["ENVGUARD_IT_PANIC", "ENVGUARD_IT_PANIC_NEW"]))
                .unwrap();
        set("ENVGUARD_IT_PANIC", "during");
        set("ENVGUARD_IT_PANIC_NEW", "during");
        panic!("wrapped work failed");
    }));

    assert!(result.is_err());
    assert_eq!(env::var("ENVGUARD_IT_PANIC").as_deref(), Ok("before"));
    assert!(env::var_os("ENVGUARD_IT_PANIC_NEW").is_none());
    assert!(!EnvironmentGuard::is_engaged());

    unset("ENVGUARD_IT_PANIC");
}

#[test]
fn guard_is_not_reentrant() {
    let _lock = lock_test_env();
    let outer = EnvironmentGuard::engage(targets(&["ENVGUARD_IT_OUTER"])).unwrap();
    assert!(EnvironmentGuard::is_engaged());
    assert_eq!(
        EnvironmentGuard::engage(targets(&["ENVGUARD_IT_INNER"])).unwrap_err(),
        GuardError::AlreadyEngaged
    );
    outer.restore();

    let again = EnvironmentGuard::engage(targets(&["ENVGUARD_IT_INNER"])).unwrap();
    again.restore();
}

#[test]
fn dashed_and_dotted_names_are_cleared_and_restored() {
    let _lock = lock_test_env();
    set("ENVGUARD-DASHED", "leaky");
    set("lower.dotted", "leaky");

    let guard = EnvironmentGuard::engage(targets(&["ENVGUARD-DASHED", "lower.dotted"])).unwrap();
    assert_eq!(guard.snapshot().len(), 2);
    assert!(env::var_os("ENVGUARD-DASHED").is_none());
    assert!(env::var_os("lower.dotted").is_none());
    guard.restore();

    assert_eq!(env::var("ENVGUARD-DASHED").as_deref(), Ok("leaky"));
    assert_eq!(env::var("lower.dotted").as_deref(), Ok("leaky"));

    unset("ENVGUARD-DASHED");
    unset("lower.dotted");
}
