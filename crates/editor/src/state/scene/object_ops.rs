//! Scene object creation and deletion

use std::rc::Rc;

use super::{SceneChange, SceneObject, SceneObjectDesc, SceneRegistry};

impl SceneRegistry {
    /// Create a new scene object and add it to the scene.
    ///
    /// Has no selection side effects. Records an add change when a transaction log is attached.
    pub fn create_object(&mut self, desc: SceneObjectDesc) -> Rc<SceneObject> {
        let object = Rc::new(SceneObject::new(desc, self.materials.standard.clone()));
        let index = self.objects.len();
        self.add_object_internal(&object, index, false);
        tracing::info!("Created scene object {} ({})", object.name(), object.id());

        self.record_change(SceneChange::AddRemoveObject {
            object: object.clone(),
            added: true,
            index,
        });

        object
    }

    /// Delete a scene object. Returns false if it is not part of the scene.
    ///
    /// A selected object is deselected first, as its own selection change, and the
    /// deselect plus the removal are recorded as a single undoable transaction.
    pub fn delete_object(&mut self, object: &Rc<SceneObject>) -> bool {
        let Some(index) = self.object_index(object) else {
            tracing::warn!("Tried to delete non-existent scene object {}", object.id());
            return false;
        };

        self.begin_log_transaction("Delete SceneObject");

        if let Some(pos) = self.selection_index(object) {
            self.begin_selection_change();
            let removed = self.selected.remove(pos);
            removed.clear_highlight_material();
            self.end_selection_change();
            self.notify_selection_modified();
        }

        self.remove_object_internal(object);
        tracing::info!("Deleted scene object {} ({})", object.name(), object.id());

        self.record_change(SceneChange::AddRemoveObject {
            object: object.clone(),
            added: false,
            index,
        });

        self.end_log_transaction();
        true
    }

    /// Insert an object at `index` (clamped to the end) without recording a change.
    /// Replayed adds re-register the visual.
    pub(crate) fn add_object_internal(
        &mut self,
        object: &Rc<SceneObject>,
        index: usize,
        is_undo_redo: bool,
    ) {
        if self.contains(object) {
            tracing::warn!("Scene object {} is already in the scene", object.id());
            return;
        }

        let index = index.min(self.objects.len());
        self.objects.insert(index, object.clone());

        if is_undo_redo {
            object.set_registered(true);
        }
    }

    /// Remove an object without recording a change and unregister its visual.
    pub(crate) fn remove_object_internal(&mut self, object: &Rc<SceneObject>) {
        let Some(pos) = self.object_index(object) else {
            panic!(
                "remove_object_internal: scene object {} is not in the scene",
                object.id()
            );
        };
        self.objects.remove(pos);

        // Selection must stay a subset of the scene
        if let Some(sel) = self.selection_index(object) {
            tracing::warn!("Removing scene object {} that is still selected", object.id());
            let removed = self.selected.remove(sel);
            removed.clear_highlight_material();
            self.notify_selection_modified();
        }

        object.set_registered(false);
    }
}
