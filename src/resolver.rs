//! Window → icon resolution.
//!
//! [`IconResolver`] ties together the [`NameCache`], the
//! [`IconMatcher`] of the active configuration generation and the
//! [`ProcessNameResolver`].  For a window it tries, in order:
//!
//! 1. the name cache, keyed by the lowercase title;
//! 2. the matcher against the lowercase title;
//! 3. the executable name of the window's process, through the cache and
//!    then the matcher.
//!
//! Hits are cached under the key that produced them (title or executable
//! name).  Misses are never cached.

use crate::cache::NameCache;
use crate::icons::IconMatcher;
use crate::proc::ProcessNameResolver;
use crate::reload::ActiveConfig;
use crate::workspace::Workspaces;
use log::debug;
use std::sync::Arc;

/// Resolves windows to icons.  Owns both caches.
pub struct IconResolver {
    active: Arc<ActiveConfig>,
    names: NameCache,
    processes: ProcessNameResolver,
}

impl IconResolver {
    pub fn new(active: Arc<ActiveConfig>, processes: ProcessNameResolver) -> Self {
        Self {
            active,
            names: NameCache::new(),
            processes,
        }
    }

    /// Replace the default-sized name cache.
    pub fn with_name_cache(mut self, names: NameCache) -> Self {
        self.names = names;
        self
    }

    pub fn name_cache(&self) -> &NameCache {
        &self.names
    }

    /// Forget every cached icon.  Process names are kept.
    pub fn clear_name_cache(&self) {
        self.names.clear();
    }

    /// Find the icon for a window, or `None` if nothing matches.
    ///
    /// All matching within one call uses a single configuration generation.
    pub fn get_icon(&self, pid: Option<u32>, title: &str) -> Option<String> {
        // Read the epoch before the generation so that a value computed from
        // a generation that is being replaced cannot be cached after the
        // clear that follows the replacement.
        let epoch = self.names.epoch();
        let generation = self.active.current();

        let title_key = title.to_lowercase();
        if let Some(icon) = self.icon_for(&generation.matcher, epoch, &title_key) {
            return Some(icon);
        }

        let app = self.processes.resolve(pid?)?;
        let app_key = app.to_lowercase();
        let icon = self.icon_for(&generation.matcher, epoch, &app_key);
        if icon.is_none() {
            debug!("no icon for {:?} (executable {:?})", title, app);
        }
        icon
    }

    /// The icon for a window, or its raw title if there is none.
    pub fn display_for(&self, pid: Option<u32>, title: &str) -> String {
        self.get_icon(pid, title)
            .unwrap_or_else(|| title.to_string())
    }

    fn icon_for(&self, matcher: &IconMatcher, epoch: u64, key: &str) -> Option<String> {
        if let Some(icon) = self.names.get(key) {
            return Some(icon);
        }
        let icon = matcher.find(key)?;
        self.names.set_if_epoch(epoch, key, icon);
        Some(icon.to_string())
    }

    /// Resolve every window of every workspace and append the results to
    /// the workspaces' icon lists.
    ///
    /// Each workspace is handled on its own thread; within a workspace the
    /// icons keep the window order.  Returns once all workspaces are done.
    pub fn add_icons(&self, workspaces: &mut Workspaces) {
        std::thread::scope(|scope| {
            for ws in workspaces.values_mut() {
                scope.spawn(move || {
                    debug!("adding icons to workspace {}", ws);
                    let icons: Vec<String> = ws
                        .windows
                        .iter()
                        .map(|w| self.display_for(w.pid, &w.title))
                        .collect();
                    ws.icons.extend(icons);
                });
            }
        });
    }
}
