//! Browser-history abstraction.
//!
//! The router never touches a real location bar. It talks to a [`History`]
//! implementation that records fragments, answers whether push state is on,
//! and takes the document title. [`MemoryHistory`] keeps everything in a
//! push/replace stack and is what tests and headless embedders use.

use crate::commands::NavigationOptions;
use crate::url::fragment_from_location;
use crate::{debug_log, trace_log};
use parking_lot::RwLock;
use std::fmt;

/// Options passed when the application router takes over the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryOptions {
    pub push_state: bool,
}

/// Location storage the router writes to.
pub trait History: Send + Sync + 'static {
    /// Start listening. The router activates the history once it is
    /// configured.
    fn activate(&self, _options: &HistoryOptions) {}

    fn deactivate(&self) {}

    /// Record `fragment`. Returns `false` when nothing changed, in which case
    /// the router does not run a navigation even if `options.trigger` is set.
    fn navigate(&self, fragment: &str, options: &NavigationOptions) -> bool;

    /// Step one entry back and return the fragment now current.
    fn navigate_back(&self) -> Option<String>;

    fn set_title(&self, title: &str);

    fn has_push_state(&self) -> bool {
        false
    }

    /// Current fragment.
    fn fragment(&self) -> String;
}

#[derive(Debug, Clone)]
struct HistoryStack {
    entries: Vec<String>,
    current: usize,
    title: Option<String>,
    active: bool,
}

/// [`History`] backed by an in-memory stack.
///
/// ```
/// use navigator_pipeline::history::{History, MemoryHistory};
/// use navigator_pipeline::NavigationOptions;
///
/// let history = MemoryHistory::new();
/// assert!(history.navigate("#/users", &NavigationOptions::new()));
/// assert!(history.navigate("/users/42", &NavigationOptions::new()));
/// assert_eq!(history.entries(), vec!["/", "/users", "/users/42"]);
///
/// assert_eq!(history.navigate_back().as_deref(), Some("/users"));
/// ```
pub struct MemoryHistory {
    stack: RwLock<HistoryStack>,
    push_state: bool,
}

impl MemoryHistory {
    /// Start at `/` without push state.
    pub fn new() -> Self {
        Self::with_push_state(false)
    }

    pub fn with_push_state(push_state: bool) -> Self {
        Self {
            stack: RwLock::new(HistoryStack {
                entries: vec!["/".to_string()],
                current: 0,
                title: None,
                active: false,
            }),
            push_state,
        }
    }

    /// Every entry, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.stack.read().entries.clone()
    }

    pub fn title(&self) -> Option<String> {
        self.stack.read().title.clone()
    }

    pub fn is_active(&self) -> bool {
        self.stack.read().active
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.read().current > 0
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl History for MemoryHistory {
    fn activate(&self, options: &HistoryOptions) {
        debug_log!("Memory history activated (push state: {})", options.push_state);
        self.stack.write().active = true;
    }

    fn deactivate(&self) {
        self.stack.write().active = false;
    }

    fn navigate(&self, fragment: &str, options: &NavigationOptions) -> bool {
        let fragment = fragment_from_location(fragment);
        let mut stack = self.stack.write();
        if stack.entries[stack.current] == fragment && !options.replace {
            trace_log!("History already at '{}'", fragment);
            return false;
        }

        if options.replace {
            let current = stack.current;
            stack.entries[current] = fragment;
        } else {
            let keep = stack.current + 1;
            stack.entries.truncate(keep);
            stack.entries.push(fragment);
            stack.current += 1;
        }
        true
    }

    fn navigate_back(&self) -> Option<String> {
        let mut stack = self.stack.write();
        if stack.current == 0 {
            return None;
        }
        stack.current -= 1;
        Some(stack.entries[stack.current].clone())
    }

    fn set_title(&self, title: &str) {
        self.stack.write().title = Some(title.to_string());
    }

    fn has_push_state(&self) -> bool {
        self.push_state
    }

    fn fragment(&self) -> String {
        let stack = self.stack.read();
        stack.entries[stack.current].clone()
    }
}

impl fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stack = self.stack.read();
        f.debug_struct("MemoryHistory")
            .field("entries", &stack.entries)
            .field("current", &stack.current)
            .field("push_state", &self.push_state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_back() {
        let history = MemoryHistory::new();
        assert_eq!(history.fragment(), "/");

        history.navigate("/users", &NavigationOptions::new());
        history.navigate("/users/123", &NavigationOptions::new());
        assert_eq!(history.fragment(), "/users/123");

        assert_eq!(history.navigate_back().as_deref(), Some("/users"));
        assert_eq!(history.fragment(), "/users");
        assert!(history.can_go_back());
    }

    #[test]
    fn test_replace() {
        let history = MemoryHistory::new();
        history.navigate("/users", &NavigationOptions::new());
        history.navigate("/posts", &NavigationOptions::new().replace(true));

        assert_eq!(history.fragment(), "/posts");
        assert_eq!(history.entries().len(), 2);
    }

    #[test]
    fn test_push_truncates_forward_entries() {
        let history = MemoryHistory::new();
        history.navigate("/a", &NavigationOptions::new());
        history.navigate("/b", &NavigationOptions::new());
        history.navigate_back();
        history.navigate("/c", &NavigationOptions::new());
        assert_eq!(history.entries(), vec!["/", "/a", "/c"]);
    }

    #[test]
    fn test_same_fragment_is_not_a_change() {
        let history = MemoryHistory::new();
        assert!(history.navigate("/a", &NavigationOptions::new()));
        assert!(!history.navigate("#/a", &NavigationOptions::new()));
        assert!(history.navigate("/a", &NavigationOptions::new().replace(true)));
    }

    #[test]
    fn test_back_at_start() {
        let history = MemoryHistory::new();
        assert_eq!(history.navigate_back(), None);
    }

    #[test]
    fn test_title_and_activation() {
        let history = MemoryHistory::with_push_state(true);
        history.activate(&HistoryOptions { push_state: true });
        history.set_title("Users | App");
        assert!(history.is_active());
        assert!(history.has_push_state());
        assert_eq!(history.title().as_deref(), Some("Users | App"));
    }
}
