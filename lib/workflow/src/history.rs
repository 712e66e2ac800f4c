//! Bounded undo/redo history.

/// How many snapshots the editor keeps by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// A linear snapshot history with a cursor.
///
/// Invariants: `entries` is never empty, `index < entries.len()`, and
/// `entries.len() <= limit`. Pushing after an undo drops the redo branch.
/// When the limit is exceeded the oldest snapshot is evicted and the
/// cursor stays on the newest one.
#[derive(Debug, Clone, PartialEq)]
pub struct History<T> {
    entries: Vec<T>,
    index: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    /// Starts a history at `initial`. A limit of zero is treated as one.
    #[must_use]
    pub fn new(initial: T, limit: usize) -> Self {
        Self {
            entries: vec![initial],
            index: 0,
            limit: limit.max(1),
        }
    }

    /// Records a new snapshot after the cursor.
    pub fn push(&mut self, snapshot: T) {
        self.entries.truncate(self.index + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            let overflow = self.entries.len() - self.limit;
            self.entries.drain(..overflow);
        }
        self.index = self.entries.len() - 1;
    }

    /// Steps back and returns the snapshot now current, or `None` at the start.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Steps forward and returns the snapshot now current, or `None` at the end.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// The snapshot under the cursor.
    #[must_use]
    pub fn current(&self) -> &T {
        &self.entries[self.index]
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its initial snapshot.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_and_redo_stop_at_bounds() {
        let mut history = History::new(0, 10);
        assert!(history.undo().is_none());

        history.push(1);
        history.push(2);
        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert!(history.undo().is_none());
        assert_eq!(history.index(), 0);

        assert_eq!(history.redo(), Some(&1));
        assert_eq!(history.redo(), Some(&2));
        assert!(history.redo().is_none());
        assert_eq!(history.index(), 2);
    }

    #[test]
    fn push_after_undo_discards_redo_branch() {
        let mut history = History::new("a", 10);
        history.push("b");
        history.push("c");
        history.undo();
        history.undo();

        history.push("d");
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &"d");
        assert!(!history.can_redo());
    }

    #[test]
    fn overflow_evicts_oldest_and_keeps_cursor_on_newest() {
        let mut history = History::new(0, 3);
        for n in 1..=5 {
            history.push(n);
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), history.len() - 1);
        assert_eq!(history.current(), &5);
        assert!(history.redo().is_none());
        assert_eq!(history.undo(), Some(&4));
        assert_eq!(history.undo(), Some(&3));
        assert!(history.undo().is_none());
    }

    #[test]
    fn zero_limit_keeps_one_snapshot() {
        let mut history = History::new(0, 0);
        history.push(1);
        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), &1);
        assert!(!history.can_undo());
    }
}
