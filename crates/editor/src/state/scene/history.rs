//! Undo/redo functionality
//!
//! Change records capture one mutation each; the transaction log groups them into
//! undoable steps and replays them through the registry's internal mutators.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use super::{SceneObject, SceneRegistry};

/// Default number of undo steps kept by [`UndoHistory`]
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// A recorded scene mutation that can be re-applied or reverted.
///
/// Records hold strong references to their objects, so a deleted object stays
/// alive for as long as undo may need to bring it back.
pub enum SceneChange {
    AddRemoveObject {
        object: Rc<SceneObject>,
        added: bool,
        /// Position in the scene's object list
        index: usize,
    },
    Selection {
        old_selection: Vec<Rc<SceneObject>>,
        new_selection: Vec<Rc<SceneObject>>,
    },
}

impl SceneChange {
    /// Replay the mutation
    pub fn apply(&self, registry: &mut SceneRegistry) {
        match self {
            SceneChange::AddRemoveObject {
                object,
                added: true,
                index,
            } => registry.add_object_internal(object, *index, true),
            SceneChange::AddRemoveObject {
                object,
                added: false,
                ..
            } => registry.remove_object_internal(object),
            SceneChange::Selection { new_selection, .. } => {
                registry.set_selection_internal(new_selection)
            }
        }
    }

    /// Undo the mutation
    pub fn revert(&self, registry: &mut SceneRegistry) {
        match self {
            SceneChange::AddRemoveObject {
                object,
                added: true,
                ..
            } => registry.remove_object_internal(object),
            SceneChange::AddRemoveObject {
                object,
                added: false,
                index,
            } => registry.add_object_internal(object, *index, true),
            SceneChange::Selection { old_selection, .. } => {
                registry.set_selection_internal(old_selection)
            }
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SceneChange::AddRemoveObject { added: true, .. } => "Add SceneObject",
            SceneChange::AddRemoveObject { added: false, .. } => "Delete SceneObject",
            SceneChange::Selection { .. } => "Selection Change",
        }
    }
}

impl fmt::Debug for SceneChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids = |objects: &[Rc<SceneObject>]| -> Vec<String> {
            objects.iter().map(|o| o.id().clone()).collect()
        };
        match self {
            SceneChange::AddRemoveObject {
                object,
                added,
                index,
            } => f
                .debug_struct("AddRemoveObject")
                .field("object", object.id())
                .field("added", added)
                .field("index", index)
                .finish(),
            SceneChange::Selection {
                old_selection,
                new_selection,
            } => f
                .debug_struct("Selection")
                .field("old_selection", &ids(old_selection))
                .field("new_selection", &ids(new_selection))
                .finish(),
        }
    }
}

/// Receives change records from the scene registry
pub trait TransactionLog {
    /// Open a transaction; changes appended until the matching `end_transaction`
    /// become one undo step. Transactions may nest.
    fn begin_transaction(&mut self, description: &str);
    /// Record a change. Outside a transaction it becomes its own undo step.
    fn append_change(&mut self, change: SceneChange, description: &str);
    fn end_transaction(&mut self);
}

/// One undo step
#[derive(Debug)]
pub struct Transaction {
    pub description: String,
    pub changes: Vec<SceneChange>,
}

/// Bounded undo/redo stacks of transactions
#[derive(Debug)]
pub struct UndoHistory {
    undo_stack: VecDeque<Transaction>,
    redo_stack: Vec<Transaction>,
    open: Option<Transaction>,
    open_depth: usize,
    max_depth: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl UndoHistory {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            open: None,
            open_depth: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Undo the last transaction
    pub fn undo(&mut self, registry: &mut SceneRegistry) -> bool {
        if self.is_transaction_open() {
            tracing::warn!("Cannot undo while a transaction is open");
            return false;
        }
        let Some(transaction) = self.undo_stack.pop_back() else {
            return false;
        };

        tracing::debug!("Undo: {}", transaction.description);
        for change in transaction.changes.iter().rev() {
            change.revert(registry);
        }
        self.redo_stack.push(transaction);
        true
    }

    /// Redo the last undone transaction
    pub fn redo(&mut self, registry: &mut SceneRegistry) -> bool {
        if self.is_transaction_open() {
            tracing::warn!("Cannot redo while a transaction is open");
            return false;
        }
        let Some(transaction) = self.redo_stack.pop() else {
            return false;
        };

        tracing::debug!("Redo: {}", transaction.description);
        for change in &transaction.changes {
            change.apply(registry);
        }
        self.undo_stack.push_back(transaction);
        true
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|t| t.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|t| t.description.as_str())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn is_transaction_open(&self) -> bool {
        self.open.is_some()
    }

    /// Drop all history. Objects only kept alive by change records are released.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open = None;
        self.open_depth = 0;
    }

    fn commit(&mut self, transaction: Transaction) {
        if transaction.changes.is_empty() {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push_back(transaction);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
    }
}

impl TransactionLog for UndoHistory {
    fn begin_transaction(&mut self, description: &str) {
        self.open_depth += 1;
        if self.open.is_none() {
            self.open = Some(Transaction {
                description: description.to_string(),
                changes: Vec::new(),
            });
        }
    }

    fn append_change(&mut self, change: SceneChange, description: &str) {
        match &mut self.open {
            Some(transaction) => transaction.changes.push(change),
            None => self.commit(Transaction {
                description: description.to_string(),
                changes: vec![change],
            }),
        }
    }

    fn end_transaction(&mut self) {
        if self.open_depth == 0 {
            tracing::warn!("end_transaction called without an open transaction");
            return;
        }
        self.open_depth -= 1;
        if self.open_depth == 0 {
            if let Some(transaction) = self.open.take() {
                self.commit(transaction);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scene::SceneObjectDesc;
    use crate::viewport::mesh;
    use std::cell::RefCell;

    fn attached() -> (SceneRegistry, Rc<RefCell<UndoHistory>>) {
        let history = Rc::new(RefCell::new(UndoHistory::default()));
        let mut registry = SceneRegistry::default();
        registry.set_transactions(Some(history.clone()));
        (registry, history)
    }

    fn desc(name: &str) -> SceneObjectDesc {
        SceneObjectDesc::new(name, mesh::cube(1.0, 1.0, 1.0, [1.0; 3]))
    }

    #[test]
    fn test_create_records_add() {
        let (mut r, h) = attached();
        r.create_object(desc("a"));
        assert!(h.borrow().can_undo());
        assert_eq!(h.borrow().undo_description(), Some("Add SceneObject"));
    }

    #[test]
    fn test_undo_redo_create() {
        let (mut r, h) = attached();
        let a = r.create_object(desc("a"));

        assert!(h.borrow_mut().undo(&mut r));
        assert!(!r.contains(&a));
        assert!(!a.is_registered());

        assert!(h.borrow_mut().redo(&mut r));
        assert!(r.contains(&a));
        assert!(a.is_registered());
    }

    #[test]
    fn test_noop_selection_not_recorded() {
        let (mut r, h) = attached();
        let a = r.create_object(desc("a"));
        r.set_selected(&a, false, false);
        let depth = h.borrow().undo_len();

        r.set_selected(&a, false, false);
        assert_eq!(h.borrow().undo_len(), depth);
    }

    #[test]
    fn test_new_change_clears_redo() {
        let (mut r, h) = attached();
        r.create_object(desc("a"));
        h.borrow_mut().undo(&mut r);
        assert!(h.borrow().can_redo());

        r.create_object(desc("b"));
        assert!(!h.borrow().can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let history = Rc::new(RefCell::new(UndoHistory::new(3)));
        let mut r = SceneRegistry::default();
        r.set_transactions(Some(history.clone()));
        for i in 0..5 {
            r.create_object(desc(&format!("o{i}")));
        }
        assert_eq!(history.borrow().undo_len(), 3);

        while history.borrow_mut().undo(&mut r) {}
        let names: Vec<&str> = r.objects().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["o0", "o1"]);

        while history.borrow_mut().redo(&mut r) {}
        assert_eq!(r.object_count(), 5);
    }

    #[test]
    fn test_delete_selected_is_one_step() {
        let (mut r, h) = attached();
        let a = r.create_object(desc("a"));
        r.set_selected(&a, false, false);
        let depth = h.borrow().undo_len();

        r.delete_object(&a);
        assert_eq!(h.borrow().undo_len(), depth + 1);
        assert_eq!(h.borrow().undo_description(), Some("Delete SceneObject"));

        assert!(h.borrow_mut().undo(&mut r));
        assert!(r.contains(&a));
        assert!(r.is_selected(&a));
        assert!(a.is_highlighted());
    }

    #[test]
    fn test_nested_transactions_form_one_step() {
        let (mut r, h) = attached();
        h.borrow_mut().begin_transaction("outer");
        r.create_object(desc("a"));
        h.borrow_mut().begin_transaction("inner");
        r.create_object(desc("b"));
        h.borrow_mut().end_transaction();
        assert!(!h.borrow().can_undo());
        h.borrow_mut().end_transaction();

        assert_eq!(h.borrow().undo_len(), 1);
        assert_eq!(h.borrow().undo_description(), Some("outer"));
        h.borrow_mut().undo(&mut r);
        assert_eq!(r.object_count(), 0);
    }

    #[test]
    fn test_undo_refused_while_transaction_open() {
        let (mut r, h) = attached();
        r.create_object(desc("a"));
        h.borrow_mut().begin_transaction("open");
        assert!(!h.borrow_mut().undo(&mut r));
        h.borrow_mut().end_transaction();
        assert!(h.borrow_mut().undo(&mut r));
    }

    #[test]
    fn test_empty_transaction_discarded() {
        let (_r, h) = attached();
        h.borrow_mut().begin_transaction("nothing");
        h.borrow_mut().end_transaction();
        assert!(!h.borrow().can_undo());
    }

    #[test]
    fn test_record_keeps_deleted_object_alive() {
        let (mut r, h) = attached();
        let a = r.create_object(desc("a"));
        let weak = Rc::downgrade(&a);
        r.delete_object(&a);
        drop(a);
        assert!(weak.upgrade().is_some());

        h.borrow_mut().clear();
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_change_debug_lists_ids() {
        let (mut r, _h) = attached();
        let a = r.create_object(desc("a"));
        let change = SceneChange::AddRemoveObject {
            object: a.clone(),
            added: true,
            index: 0,
        };
        assert!(format!("{:?}", change).contains(a.id().as_str()));
    }
}
