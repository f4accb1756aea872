use crate::model::NodeId;

/// A reversible user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoAction {
    AddNode { id: NodeId },
}

/// Linear undo stack. There is no redo.
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    actions: Vec<UndoAction>,
}

impl UndoLog {
    pub fn push(&mut self, action: UndoAction) {
        self.actions.push(action);
    }

    /// Pop entries until `still_present` accepts one, returning it. Entries
    /// whose target is already gone are discarded. `None` once the log is
    /// exhausted.
    pub fn pop_live(&mut self, mut still_present: impl FnMut(&UndoAction) -> bool) -> Option<UndoAction> {
        while let Some(action) = self.actions.pop() {
            if still_present(&action) {
                return Some(action);
            }
            tracing::debug!(?action, "skipping stale undo entry");
        }
        None
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
