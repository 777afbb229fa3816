//! Editing session: one scene registry with its undo history and transform gizmo.
//!
//! Everything is addressed by object ID here, which is what the command protocol
//! and integration tests use.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec3;
use shared::{GizmoSubElements, ObjectId, Primitive, Transform};

use crate::state::gizmo_binding::GizmoBinder;
use crate::state::scene::{
    SceneHit, SceneObject, SceneObjectDesc, SceneRegistry, SelectionMaterials, UndoHistory,
};
use crate::state::settings::EditorSettings;
use crate::viewport::gizmo::{GizmoManager, GizmoOwner};
use crate::viewport::mesh::MeshData;

const SESSION_GIZMO_OWNER: GizmoOwner = GizmoOwner(0);

/// Owns the scene state of one editing session
pub struct EditorSession {
    pub registry: SceneRegistry,
    pub history: Rc<RefCell<UndoHistory>>,
    pub gizmos: Rc<RefCell<GizmoManager>>,
    gizmo: GizmoBinder,
    gizmo_enabled: Rc<Cell<bool>>,
    pick_max_distance: f32,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(&EditorSettings::default())
    }
}

impl EditorSession {
    pub fn new(settings: &EditorSettings) -> Self {
        let history = Rc::new(RefCell::new(UndoHistory::new(settings.history.max_depth)));
        let gizmos = Rc::new(RefCell::new(GizmoManager::new()));

        let mut registry = SceneRegistry::new(SelectionMaterials::from_settings(&settings.materials));
        registry.set_transactions(Some(history.clone()));

        let gizmo_enabled = Rc::new(Cell::new(settings.gizmo.enabled));
        let mut gizmo = GizmoBinder::new(gizmos.clone(), SESSION_GIZMO_OWNER);
        let enabled = gizmo_enabled.clone();
        gizmo.initialize(&mut registry, move || enabled.get());
        gizmo.set_enable_scaling(&registry, settings.gizmo.enable_scaling);
        gizmo.set_enable_non_uniform_scaling(&registry, settings.gizmo.enable_non_uniform_scaling);

        Self {
            registry,
            history,
            gizmos,
            gizmo,
            gizmo_enabled,
            pick_max_distance: settings.picking.max_distance,
        }
    }

    // ── Scene manipulation ────────────────────────────────────

    /// Create an object from a primitive shape and return its ID
    pub fn create_primitive(&mut self, name: &str, primitive: &Primitive, transform: Transform) -> ObjectId {
        self.create_mesh(name, MeshData::from_primitive(primitive), transform)
    }

    /// Create an object from raw mesh data and return its ID
    pub fn create_mesh(&mut self, name: &str, mesh: MeshData, transform: Transform) -> ObjectId {
        let desc = SceneObjectDesc::new(name, mesh).with_transform(transform);
        self.registry.create_object(desc).id().clone()
    }

    /// Create a cube centered at `position` and return its ID
    pub fn create_cube(&mut self, name: &str, size: f64, position: [f64; 3]) -> ObjectId {
        self.create_primitive(
            name,
            &Primitive::Cube {
                width: size,
                height: size,
                depth: size,
            },
            Transform::at(position),
        )
    }

    /// Look up a scene object by ID
    pub fn object(&self, id: &str) -> Option<Rc<SceneObject>> {
        self.registry.find(id).cloned()
    }

    /// Delete an object by ID. Returns false if no such object exists.
    pub fn delete(&mut self, id: &str) -> bool {
        match self.object(id) {
            Some(object) => self.registry.delete_object(&object),
            None => {
                tracing::warn!("Tried to delete unknown scene object {id}");
                false
            }
        }
    }

    /// Select or deselect one object by ID (see [`SceneRegistry::set_selected`])
    pub fn select(&mut self, id: &str, deselect: bool, deselect_others: bool) -> bool {
        match self.object(id) {
            Some(object) => self.registry.set_selected(&object, deselect, deselect_others),
            None => {
                tracing::warn!("Tried to select unknown scene object {id}");
                false
            }
        }
    }

    /// Toggle selection of one object by ID
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.object(id) {
            Some(object) => self.registry.toggle_selected(&object),
            None => {
                tracing::warn!("Tried to toggle unknown scene object {id}");
                false
            }
        }
    }

    /// Replace the selection. Unknown IDs are skipped; returns the IDs that were selected.
    pub fn set_selection(&mut self, ids: &[ObjectId]) -> Vec<ObjectId> {
        let objects: Vec<Rc<SceneObject>> = ids
            .iter()
            .filter_map(|id| {
                let object = self.object(id);
                if object.is_none() {
                    tracing::warn!("Tried to select unknown scene object {id}");
                }
                object
            })
            .collect();
        self.registry.set_selection(&objects);
        self.selected_ids()
    }

    pub fn clear_selection(&mut self) {
        self.registry.clear_selection();
    }

    /// Nearest object along a ray; `max_distance` defaults to the configured picking range
    pub fn pick(&self, origin: Vec3, direction: Vec3, max_distance: Option<f32>) -> Option<SceneHit> {
        self.registry
            .find_nearest_hit(origin, direction, max_distance.unwrap_or(self.pick_max_distance))
    }

    /// Undo the last operation
    pub fn undo(&mut self) -> bool {
        self.history.borrow_mut().undo(&mut self.registry)
    }

    /// Redo the last undone operation
    pub fn redo(&mut self) -> bool {
        self.history.borrow_mut().redo(&mut self.registry)
    }

    pub fn can_undo(&self) -> bool {
        self.history.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.borrow().can_redo()
    }

    // ── Gizmo ─────────────────────────────────────────────────

    /// Show or hide the selection gizmo
    pub fn set_gizmo_enabled(&mut self, enabled: bool) {
        if self.gizmo_enabled.replace(enabled) != enabled {
            self.gizmo.force_update(&self.registry);
        }
    }

    pub fn set_enable_scaling(&mut self, enable: bool) {
        self.gizmo.set_enable_scaling(&self.registry, enable);
    }

    pub fn set_enable_non_uniform_scaling(&mut self, enable: bool) {
        self.gizmo.set_enable_non_uniform_scaling(&self.registry, enable);
    }

    pub fn gizmo(&self) -> &GizmoBinder {
        &self.gizmo
    }

    /// Handles of the active selection gizmo, if one is shown
    pub fn active_gizmo_elements(&self) -> Option<GizmoSubElements> {
        let id = self.gizmo.active_manipulator()?;
        self.gizmos.borrow().manipulator(id).map(|m| m.elements)
    }

    /// Tear down the gizmo binding. The session keeps working without a gizmo.
    pub fn shutdown(&mut self) {
        self.gizmo.shutdown(&mut self.registry);
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn object_count(&self) -> usize {
        self.registry.object_count()
    }

    pub fn object_ids(&self) -> Vec<ObjectId> {
        self.registry.objects().iter().map(|o| o.id().clone()).collect()
    }

    pub fn selected_ids(&self) -> Vec<ObjectId> {
        self.registry.selection().iter().map(|o| o.id().clone()).collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.registry.selection().iter().any(|o| o.id() == id)
    }
}
