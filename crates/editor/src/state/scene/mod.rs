//! Scene state management
//!
//! The registry owns the scene objects and the selection over them. Every mutation
//! is recorded as a [`SceneChange`] on the attached [`TransactionLog`], and every
//! committed selection mutation is broadcast to selection listeners.

mod history;
mod object;
mod object_ops;
mod selection_ops;

pub use hit_test::SceneHit;
pub use history::{SceneChange, Transaction, TransactionLog, UndoHistory, DEFAULT_MAX_DEPTH};
pub use object::{
    MaterialHandle, NullVisual, ObjectVisual, SceneObject, SceneObjectDesc, TransformTarget,
};

use std::cell::RefCell;
use std::rc::Rc;

use crate::state::settings::MaterialSettings;

/// Callback invoked after every committed selection mutation
pub type SelectionListener = Box<dyn FnMut(&SceneRegistry)>;

/// Returned by [`SceneRegistry::on_selection_modified`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(u64);

/// Materials used for unselected and selected objects
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionMaterials {
    pub standard: MaterialHandle,
    pub selected: MaterialHandle,
}

impl SelectionMaterials {
    pub fn from_settings(settings: &MaterialSettings) -> Self {
        Self {
            standard: MaterialHandle::new(settings.standard_or_default()),
            selected: MaterialHandle::new(settings.selected_or_default()),
        }
    }
}

impl Default for SelectionMaterials {
    fn default() -> Self {
        Self::from_settings(&MaterialSettings::default())
    }
}

/// Snapshot taken when a selection change begins
pub(crate) struct PendingSelectionChange {
    old_selection: Vec<Rc<SceneObject>>,
}

/// Scene objects, the selection over them, and the hooks that make both undoable
pub struct SceneRegistry {
    /// All scene objects, in insertion order
    pub(crate) objects: Vec<Rc<SceneObject>>,
    /// Selected objects, in order of selection. Always a subset of `objects`.
    pub(crate) selected: Vec<Rc<SceneObject>>,
    /// Set only while a selection mutation is in progress
    pub(crate) active_change: Option<PendingSelectionChange>,
    pub(crate) transactions: Option<Rc<RefCell<dyn TransactionLog>>>,
    pub(crate) materials: SelectionMaterials,
    listeners: Vec<(ListenerHandle, SelectionListener)>,
    next_listener_id: u64,
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new(SelectionMaterials::default())
    }
}

impl SceneRegistry {
    pub fn new(materials: SelectionMaterials) -> Self {
        Self {
            objects: Vec::new(),
            selected: Vec::new(),
            active_change: None,
            transactions: None,
            materials,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Attach (or detach, with `None`) the log that receives change records
    pub fn set_transactions(&mut self, transactions: Option<Rc<RefCell<dyn TransactionLog>>>) {
        self.transactions = transactions;
    }

    pub fn has_transactions(&self) -> bool {
        self.transactions.is_some()
    }

    pub fn selected_materials(&self) -> &SelectionMaterials {
        &self.materials
    }

    /// All scene objects, in insertion order
    pub fn objects(&self) -> &[Rc<SceneObject>] {
        &self.objects
    }

    /// Selected objects, in order of selection
    pub fn selection(&self) -> &[Rc<SceneObject>] {
        &self.selected
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn contains(&self, object: &Rc<SceneObject>) -> bool {
        self.object_index(object).is_some()
    }

    pub fn is_selected(&self, object: &Rc<SceneObject>) -> bool {
        self.selection_index(object).is_some()
    }

    /// Look up a scene object by ID
    pub fn find(&self, id: &str) -> Option<&Rc<SceneObject>> {
        self.objects.iter().find(|o| o.id() == id)
    }

    /// Subscribe to selection-changed notifications
    pub fn on_selection_modified(
        &mut self,
        listener: impl FnMut(&SceneRegistry) + 'static,
    ) -> ListenerHandle {
        let handle = ListenerHandle(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((handle, Box::new(listener)));
        handle
    }

    /// Unsubscribe a selection listener. Returns false if the handle is unknown.
    pub fn remove_selection_listener(&mut self, handle: ListenerHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Deliver the selection-changed notification to every listener, in subscription order
    pub(crate) fn notify_selection_modified(&mut self) {
        // Listeners only get a shared borrow, so none can subscribe or unsubscribe mid-broadcast.
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(self);
        }
        self.listeners = listeners;
    }

    pub(crate) fn object_index(&self, object: &Rc<SceneObject>) -> Option<usize> {
        self.objects.iter().position(|o| Rc::ptr_eq(o, object))
    }

    pub(crate) fn selection_index(&self, object: &Rc<SceneObject>) -> Option<usize> {
        self.selected.iter().position(|o| Rc::ptr_eq(o, object))
    }

    pub(crate) fn record_change(&self, change: SceneChange) {
        if let Some(log) = &self.transactions {
            let description = change.description();
            log.borrow_mut().append_change(change, description);
        }
    }

    pub(crate) fn begin_log_transaction(&self, description: &str) {
        if let Some(log) = &self.transactions {
            log.borrow_mut().begin_transaction(description);
        }
    }

    pub(crate) fn end_log_transaction(&self) {
        if let Some(log) = &self.transactions {
            log.borrow_mut().end_transaction();
        }
    }
}

/// Ordered identity comparison of two object lists
pub(crate) fn same_objects(a: &[Rc<SceneObject>], b: &[Rc<SceneObject>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Rc::ptr_eq(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_registry_starts_empty() {
        let r = SceneRegistry::default();
        assert_eq!(r.object_count(), 0);
        assert!(r.selection().is_empty());
        assert!(!r.has_transactions());
    }

    #[test]
    fn test_listener_subscribe_and_remove() {
        let mut r = SceneRegistry::default();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let handle = r.on_selection_modified(move |_| c.set(c.get() + 1));

        r.notify_selection_modified();
        assert_eq!(count.get(), 1);

        assert!(r.remove_selection_listener(handle));
        assert!(!r.remove_selection_listener(handle));
        r.notify_selection_modified();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_listeners_called_in_subscription_order() {
        let mut r = SceneRegistry::default();
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let o = order.clone();
            r.on_selection_modified(move |_| o.borrow_mut().push(i));
        }
        r.notify_selection_modified();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(r.listener_count(), 3);
    }

    #[test]
    fn test_default_materials_are_distinct() {
        let m = SelectionMaterials::default();
        assert_ne!(m.standard, m.selected);
    }
}
