use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily overridden.
///
/// Process environment is global, so concurrent tests that touch the same
/// variables would race. The lock serializes them, and the guard restores the
/// previous values even when `f` panics.
///
/// Each `(key, value)` pair in `overrides` either sets the variable
/// (`Some(v)`) or removes it (`None`).
pub fn with_scoped_env<F, R>(overrides: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _restore = EnvSnapshot::apply(overrides);
    f()
}

struct EnvSnapshot {
    saved: Vec<(String, Option<String>)>,
}

impl EnvSnapshot {
    fn apply(overrides: &[(&str, Option<&str>)]) -> Self {
        let mut saved: Vec<(String, Option<String>)> = Vec::new();
        for (key, _) in overrides {
            // A key listed twice is snapshotted once, before any override.
            if !saved.iter().any(|(k, _)| k == key) {
                saved.push((key.to_string(), std::env::var(key).ok()));
            }
        }

        for (key, value) in overrides {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }

        Self { saved }
    }
}

impl Drop for EnvSnapshot {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(v) => std::env::set_var(&key, v),
                None => std::env::remove_var(&key),
            }
        }
    }
}
