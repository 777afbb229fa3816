//! Factory functions for creating test data.
//!
//! Provides scene object descriptions with known geometry and a visual backend
//! that counts the calls the registry makes on it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use shared::{Primitive, Transform};

use crate::state::scene::{MaterialHandle, ObjectVisual, SceneObject, SceneObjectDesc, SceneRegistry};
use crate::viewport::mesh::MeshData;

// ── Object factories ────────────────────────────────────────────

/// Description of a cube with edge length `size` centered at `position`.
pub fn cube_desc_at(name: &str, size: f64, position: [f64; 3]) -> SceneObjectDesc {
    let mesh = MeshData::from_primitive(&Primitive::Cube {
        width: size,
        height: size,
        depth: size,
    });
    SceneObjectDesc::new(name, mesh).with_transform(Transform::at(position))
}

/// Description of a unit cube at the origin.
pub fn unit_cube_desc(name: &str) -> SceneObjectDesc {
    cube_desc_at(name, 1.0, [0.0; 3])
}

/// Add `count` unit cubes to the registry, spaced two units apart along X.
pub fn populate_row(registry: &mut SceneRegistry, count: usize) -> Vec<Rc<SceneObject>> {
    (0..count)
        .map(|i| registry.create_object(cube_desc_at(&format!("Cube{i}"), 1.0, [2.0 * i as f64, 0.0, 0.0])))
        .collect()
}

// ── Counting visual ─────────────────────────────────────────────

/// Shared call counters of a [`CountingVisual`].
#[derive(Debug, Default)]
pub struct VisualCounters {
    pub highlights_applied: Cell<usize>,
    pub highlights_cleared: Cell<usize>,
    /// Material most recently restored when a highlight was cleared
    pub restored_material: RefCell<Option<MaterialHandle>>,
    pub registered: Cell<bool>,
    pub registration_changes: Cell<usize>,
}

/// Visual backend that records how often it was highlighted and (un)registered.
pub struct CountingVisual {
    counters: Rc<VisualCounters>,
}

impl CountingVisual {
    /// Create a visual and a handle to its counters.
    pub fn with_counters() -> (Self, Rc<VisualCounters>) {
        let counters = Rc::new(VisualCounters {
            registered: Cell::new(true),
            ..Default::default()
        });
        (
            Self {
                counters: counters.clone(),
            },
            counters,
        )
    }
}

impl ObjectVisual for CountingVisual {
    fn apply_highlight(&self, _material: &MaterialHandle) {
        let c = &self.counters.highlights_applied;
        c.set(c.get() + 1);
    }

    fn clear_highlight(&self, standard: &MaterialHandle) {
        let c = &self.counters.highlights_cleared;
        c.set(c.get() + 1);
        *self.counters.restored_material.borrow_mut() = Some(standard.clone());
    }

    fn set_registered(&self, registered: bool) {
        self.counters.registered.set(registered);
        let c = &self.counters.registration_changes;
        c.set(c.get() + 1);
    }
}

/// Unit cube at `position` with a counting visual attached.
pub fn counted_cube_desc(name: &str, position: [f64; 3]) -> (SceneObjectDesc, Rc<VisualCounters>) {
    let (visual, counters) = CountingVisual::with_counters();
    (
        cube_desc_at(name, 1.0, position).with_visual(Box::new(visual)),
        counters,
    )
}

// ── Convenience helpers ─────────────────────────────────────────

/// Sorted IDs of a list of objects, for set comparisons.
pub fn sorted_ids(objects: &[Rc<SceneObject>]) -> Vec<String> {
    let mut ids: Vec<String> = objects.iter().map(|o| o.id().clone()).collect();
    ids.sort();
    ids
}

/// Counter of selection-changed notifications on a registry.
pub fn count_notifications(registry: &mut SceneRegistry) -> Rc<Cell<usize>> {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    registry.on_selection_modified(move |_| c.set(c.get() + 1));
    count
}
