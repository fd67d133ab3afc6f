use std::collections::VecDeque;

use crate::app::domain::Selection;

/// Editor state captured after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub selection: Selection,
}

impl Snapshot {
    pub fn new(text: impl Into<String>, selection: Selection) -> Self {
        Self {
            text: text.into(),
            selection,
        }
    }
}

/// Undo/redo stack for one editing session.
///
/// Holds at most `capacity` snapshots; the oldest is dropped first.
#[derive(Debug, Clone)]
pub struct EditHistory {
    snapshots: VecDeque<Snapshot>,
    /// Index of the snapshot matching the editor, None when empty.
    current: Option<usize>,
    capacity: usize,
}

impl EditHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current: None,
            capacity: capacity.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.current.and_then(|i| self.snapshots.get(i))
    }

    /// Push a new state. Redo entries past the current one are discarded.
    /// Returns false when the state equals the current one and nothing was recorded.
    pub fn record(&mut self, snapshot: Snapshot) -> bool {
        if self.current() == Some(&snapshot) {
            return false;
        }

        if let Some(i) = self.current {
            self.snapshots.truncate(i + 1);
        }
        self.snapshots.push_back(snapshot);
        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.current = Some(self.snapshots.len() - 1);
        true
    }

    pub fn undo(&mut self) -> Option<&Snapshot> {
        let i = self.current.filter(|&i| i > 0)? - 1;
        self.current = Some(i);
        self.snapshots.get(i)
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        let i = self.current? + 1;
        if i >= self.snapshots.len() {
            return None;
        }
        self.current = Some(i);
        self.snapshots.get(i)
    }
}
