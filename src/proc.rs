//! Process id → executable name, with a time-bounded cache.
//!
//! Looking up an executable means a syscall per window per event, so
//! successful lookups are remembered for [`DEFAULT_TTL`].  Failures are
//! never remembered: a process that could not be inspected now may well be
//! inspectable on the next event.

use crate::traits::ExecutableLookup;
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How long a resolved name stays valid.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    expires_at: Instant,
}

/// Caching front of an [`ExecutableLookup`].
pub struct ProcessNameResolver {
    lookup: Box<dyn ExecutableLookup>,
    entries: Mutex<HashMap<u32, Entry>>,
    ttl: Duration,
}

impl ProcessNameResolver {
    /// Create a resolver with [`DEFAULT_TTL`].
    pub fn new(lookup: impl ExecutableLookup + 'static) -> Self {
        Self::with_ttl(lookup, DEFAULT_TTL)
    }

    pub fn with_ttl(lookup: impl ExecutableLookup + 'static, ttl: Duration) -> Self {
        Self {
            lookup: Box::new(lookup),
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<u32, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Return the executable name of `pid`, or `None` if it cannot be
    /// determined.
    pub fn resolve(&self, pid: u32) -> Option<String> {
        self.resolve_at(pid, Instant::now())
    }

    /// [`resolve`](Self::resolve) with an explicit notion of "now".
    pub(crate) fn resolve_at(&self, pid: u32, now: Instant) -> Option<String> {
        if let Some(entry) = self.entries().get(&pid) {
            if now <= entry.expires_at {
                return Some(entry.name.clone());
            }
            debug!("cached name for pid {} expired", pid);
        }

        // The lock is not held while talking to the OS.
        let name = match self.lookup.executable_name(pid) {
            Ok(name) if !name.is_empty() => name,
            Ok(_) => {
                debug!("empty executable name for pid {}", pid);
                return None;
            }
            Err(e) => {
                debug!("cannot resolve executable of pid {}: {}", pid, e);
                return None;
            }
        };

        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.expires_at);
        if entries.len() < before {
            debug!("dropped {} expired pid(s)", before - entries.len());
        }
        entries.insert(
            pid,
            Entry {
                name: name.clone(),
                expires_at: now + self.ttl,
            },
        );
        Some(name)
    }

    /// Number of cached pids.  Expired entries are dropped on the next
    /// insert, so some may still be counted.
    pub fn cached(&self) -> usize {
        self.entries().len()
    }
}

/// Reads `/proc/<pid>/exe` and returns the base name of its target.
#[derive(Debug, Clone)]
pub struct LinuxExecutableLookup {
    proc_root: PathBuf,
}

impl LinuxExecutableLookup {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Use a different procfs mount (or a fake one in tests).
    pub fn with_root(proc_root: impl AsRef<Path>) -> Self {
        Self {
            proc_root: proc_root.as_ref().to_path_buf(),
        }
    }
}

impl Default for LinuxExecutableLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutableLookup for LinuxExecutableLookup {
    fn executable_name(&self, pid: u32) -> std::io::Result<String> {
        let exe = self.proc_root.join(pid.to_string()).join("exe");
        let target = std::fs::canonicalize(&exe)?;
        target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("{} has no file name", target.display()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Counts calls and answers from a fixed table.
    #[derive(Default)]
    struct CountingLookup {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ExecutableLookup for CountingLookup {
        fn executable_name(&self, pid: u32) -> std::io::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no such process",
                ));
            }
            Ok(format!("app-{}", pid))
        }
    }

    #[test]
    fn resolves_and_caches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ProcessNameResolver::new(CountingLookup {
            calls: Arc::clone(&calls),
            fail: false,
        });
        assert_eq!(resolver.resolve(1234).as_deref(), Some("app-1234"));
        assert_eq!(resolver.resolve(1234).as_deref(), Some("app-1234"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.cached(), 1);
    }

    #[test]
    fn expired_entries_are_looked_up_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ProcessNameResolver::with_ttl(
            CountingLookup {
                calls: Arc::clone(&calls),
                fail: false,
            },
            Duration::from_secs(60),
        );
        let start = Instant::now();
        resolver.resolve_at(7, start);
        resolver.resolve_at(7, start + Duration::from_secs(60));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        resolver.resolve_at(7, start + Duration::from_secs(61));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The refreshed entry starts a new window.
        resolver.resolve_at(7, start + Duration::from_secs(100));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn exited_pids_do_not_accumulate() {
        let resolver =
            ProcessNameResolver::with_ttl(CountingLookup::default(), Duration::from_secs(1));
        let start = Instant::now();
        for pid in 0..1000 {
            resolver.resolve_at(pid, start);
        }
        assert_eq!(resolver.cached(), 1000);

        resolver.resolve_at(5000, start + Duration::from_secs(10));
        assert_eq!(resolver.cached(), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ProcessNameResolver::new(CountingLookup {
            calls: Arc::clone(&calls),
            fail: true,
        });
        assert_eq!(resolver.resolve(99), None);
        assert_eq!(resolver.resolve(99), None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolver.cached(), 0);
    }

    #[test]
    fn different_pids_are_independent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolver = ProcessNameResolver::new(CountingLookup {
            calls: Arc::clone(&calls),
            fail: false,
        });
        assert_eq!(resolver.resolve(1).as_deref(), Some("app-1"));
        assert_eq!(resolver.resolve(2).as_deref(), Some("app-2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn linux_lookup_follows_exe_symlink() {
        let root = tempfile::tempdir().unwrap();
        let bin_dir = root.path().join("usr-bin");
        std::fs::create_dir_all(&bin_dir).unwrap();
        std::fs::write(bin_dir.join("firefox"), b"").unwrap();
        let pid_dir = root.path().join("4242");
        std::fs::create_dir_all(&pid_dir).unwrap();
        std::os::unix::fs::symlink(bin_dir.join("firefox"), pid_dir.join("exe")).unwrap();

        let lookup = LinuxExecutableLookup::with_root(root.path());
        assert_eq!(lookup.executable_name(4242).unwrap(), "firefox");
        assert!(lookup.executable_name(1).is_err());
    }

    #[test]
    fn linux_lookup_of_own_process() {
        let lookup = LinuxExecutableLookup::new();
        let name = lookup.executable_name(std::process::id()).unwrap();
        assert!(!name.is_empty());
    }
}
