//! Selection operations
//!
//! Every public mutation is bracketed by `begin_selection_change` /
//! `end_selection_change` and followed by exactly one broadcast.

use std::rc::Rc;

use super::{same_objects, PendingSelectionChange, SceneChange, SceneObject, SceneRegistry};

impl SceneRegistry {
    /// Deselect everything. No-op when nothing is selected.
    pub fn clear_selection(&mut self) {
        if self.selected.is_empty() {
            return;
        }

        self.begin_selection_change();
        for object in self.selected.drain(..) {
            object.clear_highlight_material();
        }
        self.end_selection_change();
        self.notify_selection_modified();
    }

    /// Select or deselect a single object.
    ///
    /// - `deselect`: remove `object` from the selection if present (no-op otherwise).
    /// - `deselect_others`: make `object` the only selected object.
    /// - neither: add `object` to the selection; re-adding is idempotent.
    ///
    /// Returns false (with a warning) if `object` is not part of the scene.
    pub fn set_selected(
        &mut self,
        object: &Rc<SceneObject>,
        deselect: bool,
        deselect_others: bool,
    ) -> bool {
        if !self.contains(object) {
            tracing::warn!("Tried to select non-existent scene object {}", object.id());
            return false;
        }

        if deselect {
            if let Some(pos) = self.selection_index(object) {
                self.begin_selection_change();
                let removed = self.selected.remove(pos);
                removed.clear_highlight_material();
                self.end_selection_change();
                self.notify_selection_modified();
            }
            return true;
        }

        self.begin_selection_change();

        let was_selected = self.is_selected(object);
        if deselect_others {
            for other in self.selected.drain(..) {
                if !Rc::ptr_eq(&other, object) {
                    other.clear_highlight_material();
                }
            }
        }
        if !was_selected {
            object.set_highlight_material(&self.materials.selected);
        }
        if !self.is_selected(object) {
            self.selected.push(object.clone());
        }

        self.end_selection_change();
        self.notify_selection_modified();
        true
    }

    /// Flip selection membership of `object`. Returns false if it is not part of the scene.
    pub fn toggle_selected(&mut self, object: &Rc<SceneObject>) -> bool {
        if !self.contains(object) {
            tracing::warn!("Tried to toggle non-existent scene object {}", object.id());
            return false;
        }

        self.begin_selection_change();

        if let Some(pos) = self.selection_index(object) {
            let removed = self.selected.remove(pos);
            removed.clear_highlight_material();
        } else {
            self.selected.push(object.clone());
            object.set_highlight_material(&self.materials.selected);
        }

        self.end_selection_change();
        self.notify_selection_modified();
        true
    }

    /// Replace the selection. Objects not in the scene are skipped with a warning.
    pub fn set_selection(&mut self, objects: &[Rc<SceneObject>]) {
        self.begin_selection_change();
        self.assign_selection(objects);
        self.end_selection_change();
        self.notify_selection_modified();
    }

    /// Replace the selection without recording a change, then broadcast. Used by undo/redo.
    pub(crate) fn set_selection_internal(&mut self, objects: &[Rc<SceneObject>]) {
        self.assign_selection(objects);
        self.notify_selection_modified();
    }

    fn assign_selection(&mut self, objects: &[Rc<SceneObject>]) {
        let mut next: Vec<Rc<SceneObject>> = Vec::with_capacity(objects.len());
        for object in objects {
            if !self.contains(object) {
                tracing::warn!("Tried to select non-existent scene object {}", object.id());
                continue;
            }
            if next.iter().any(|n| Rc::ptr_eq(n, object)) {
                continue;
            }
            next.push(object.clone());
        }

        for leaving in &self.selected {
            if !next.iter().any(|n| Rc::ptr_eq(n, leaving)) {
                leaving.clear_highlight_material();
            }
        }
        for entering in &next {
            if !self.is_selected(entering) {
                entering.set_highlight_material(&self.materials.selected);
            }
        }

        self.selected = next;
    }

    /// Open a selection change. Selection changes must not nest.
    pub(crate) fn begin_selection_change(&mut self) {
        assert!(
            self.active_change.is_none(),
            "begin_selection_change: a selection change is already active"
        );

        self.active_change = Some(PendingSelectionChange {
            old_selection: self.selected.clone(),
        });
    }

    /// Close the active selection change, recording it only if the selection differs.
    pub(crate) fn end_selection_change(&mut self) {
        let Some(pending) = self.active_change.take() else {
            panic!("end_selection_change: no selection change is active");
        };

        if !same_objects(&pending.old_selection, &self.selected) {
            tracing::debug!(
                "Selection changed: {} -> {} objects",
                pending.old_selection.len(),
                self.selected.len()
            );
            self.record_change(SceneChange::Selection {
                old_selection: pending.old_selection,
                new_selection: self.selected.clone(),
            });
        }
    }
}
