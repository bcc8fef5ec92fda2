//! Boundary to the host's session history

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::Mutex;

/// Session history of the host (the browser's `history` object).
///
/// URLs are path plus optional query, e.g. `/watch?id=v1`.
pub trait BrowserHistory: Send + Debug {
    fn push_state(&mut self, url: &str);
    fn replace_state(&mut self, url: &str);
    /// URL of the current entry
    fn location(&self) -> String;
}

#[derive(Debug)]
struct Entries {
    urls: Vec<String>,
    index: usize,
}

/// In-memory history with browser semantics: pushing drops forward entries.
///
/// Clones share the same entries, so a host can keep one handle to drive
/// back/forward while the location store owns another.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Arc<Mutex<Entries>>,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries {
                urls: vec![initial.into()],
                index: 0,
            })),
        }
    }

    /// Step back one entry; false when already at the oldest one
    pub fn back(&self) -> bool {
        let mut entries = self.entries.lock();
        if entries.index == 0 {
            return false;
        }
        entries.index -= 1;
        true
    }

    pub fn forward(&self) -> bool {
        let mut entries = self.entries.lock();
        if entries.index + 1 >= entries.urls.len() {
            return false;
        }
        entries.index += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.lock().urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().urls.is_empty()
    }

    /// All entries, oldest first
    pub fn urls(&self) -> Vec<String> {
        self.entries.lock().urls.clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl BrowserHistory for MemoryHistory {
    fn push_state(&mut self, url: &str) {
        let mut entries = self.entries.lock();
        let keep = entries.index + 1;
        entries.urls.truncate(keep);
        entries.urls.push(url.to_string());
        entries.index = keep;
    }

    fn replace_state(&mut self, url: &str) {
        let mut entries = self.entries.lock();
        let index = entries.index;
        entries.urls[index] = url.to_string();
    }

    fn location(&self) -> String {
        let entries = self.entries.lock();
        entries.urls[entries.index].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_truncates_forward_entries() {
        let mut history = MemoryHistory::new("/a");
        history.push_state("/b");
        history.push_state("/c");
        assert!(history.back());
        history.push_state("/d");

        assert_eq!(history.urls(), vec!["/a", "/b", "/d"]);
        assert!(!history.forward());
        assert_eq!(history.location(), "/d");
    }

    #[test]
    fn replace_keeps_length() {
        let mut history = MemoryHistory::new("/a");
        history.replace_state("/b");
        assert_eq!(history.len(), 1);
        assert_eq!(history.location(), "/b");
        assert!(!history.back());
    }
}
