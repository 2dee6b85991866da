//! Linear undo/redo log, one per operator kind.
//!
//! Entries are applied operator states; the cursor marks the last active
//! entry. Entries past the cursor are redoable until a new apply truncates
//! them (standard redo-branch discard). Index 0 always holds the identity
//! state, so the log is never empty and `cursor == 0` means "nothing applied".

#[derive(Debug, Clone)]
pub struct History<S: Clone + Default> {
    entries: Vec<S>,
    cursor: usize,
}

impl<S: Clone + Default> Default for History<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Clone + Default> History<S> {
    pub fn new() -> Self {
        Self {
            entries: vec![S::default()],
            cursor: 0,
        }
    }

    /// Commit a state: drop the redo branch, append, move the cursor to the
    /// new tail.
    pub fn apply(&mut self, state: S) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(state);
        self.cursor = self.entries.len() - 1;
    }

    /// Append without truncation, cursor to tail. Used by script replay,
    /// which rebuilds a history from a clean slate.
    pub fn push(&mut self, state: S) {
        self.entries.push(state);
        self.cursor = self.entries.len() - 1;
    }

    /// Step the cursor back one entry. Returns false (and does nothing) at
    /// the identity entry.
    pub fn undo(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Step the cursor forward one entry. Returns false (and does nothing)
    /// at the tail.
    pub fn redo(&mut self) -> bool {
        if self.cursor < self.entries.len() - 1 {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len() - 1
    }

    /// Collapse back to `[identity]` with the cursor at 0.
    pub fn hard_reset(&mut self) {
        self.entries = vec![S::default()];
        self.cursor = 0;
    }

    /// Active entries: everything up to and including the cursor. This is
    /// the history half of a resolved operation list.
    pub fn active(&self) -> &[S] {
        &self.entries[..=self.cursor]
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        // Never true; the identity entry is permanent
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history_is_identity_only() {
        let history: History<i32> = History::new();
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.active(), &[0]);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_apply_advances_cursor() {
        let mut history: History<i32> = History::new();
        history.apply(1);
        history.apply(2);
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.active(), &[0, 1, 2]);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history: History<i32> = History::new();
        for i in 1..=4 {
            history.apply(i);
        }
        let snapshot: Vec<i32> = history.active().to_vec();

        for _ in 0..4 {
            assert!(history.undo());
        }
        assert!(!history.undo());
        assert_eq!(history.active(), &[0]);

        for _ in 0..4 {
            assert!(history.redo());
        }
        assert!(!history.redo());
        assert_eq!(history.active(), snapshot.as_slice());
        assert_eq!(history.cursor(), 4);
    }

    #[test]
    fn test_apply_after_undo_discards_redo_branch() {
        let mut history: History<i32> = History::new();
        history.apply(1);
        history.apply(2);
        history.undo();
        history.apply(3);

        // [identity, 1, 3] - the 2 is unrecoverable
        assert_eq!(history.len(), 3);
        assert_eq!(history.active(), &[0, 1, 3]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_hard_reset() {
        let mut history: History<i32> = History::new();
        history.apply(7);
        history.apply(8);
        history.undo();
        history.hard_reset();
        assert_eq!(history.len(), 1);
        assert_eq!(history.cursor(), 0);
        assert_eq!(history.active(), &[0]);
    }

    #[test]
    fn test_undo_keeps_redo_available() {
        let mut history: History<i32> = History::new();
        history.apply(1);
        history.undo();
        assert!(history.can_redo());
        assert_eq!(history.active(), &[0]);
        assert_eq!(history.len(), 2);
    }
}
