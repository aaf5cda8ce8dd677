//! Workspace name rendering.

use crate::config::Format;
use std::collections::HashSet;

/// Turns a workspace's icons into its display name.
#[derive(Debug, Clone, Default)]
pub struct NameFormatter {
    format: Format,
}

impl NameFormatter {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    /// Render `"<number>: <icon><delim><icon>…"`.
    ///
    /// Duplicates are dropped first (when `uniq` is set), then each icon is
    /// cut to `length` characters (when `length > 0`).  No icons at all
    /// renders as `""`, meaning "leave this workspace alone".
    pub fn format(&self, number: i64, icons: &[String]) -> String {
        if icons.is_empty() {
            return String::new();
        }

        let icons: Vec<&str> = if self.format.uniq {
            let mut seen = HashSet::new();
            icons
                .iter()
                .map(String::as_str)
                .filter(|icon| seen.insert(*icon))
                .collect()
        } else {
            icons.iter().map(String::as_str).collect()
        };

        let icons: Vec<&str> = match usize::try_from(self.format.length) {
            Ok(length) if length > 0 => icons.into_iter().map(|i| truncate(i, length)).collect(),
            _ => icons,
        };

        format!("{}: {}", number, icons.join(&self.format.delimiter))
    }
}

/// The first `max_chars` characters of `s`.
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
