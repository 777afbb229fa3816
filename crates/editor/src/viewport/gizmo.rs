use std::rc::{Rc, Weak};

use glam::Vec3;
use shared::{GizmoSubElements, ObjectId};

use crate::state::scene::{SceneObject, TransformTarget};

/// Identifies who created a manipulator, so it can tear down everything it owns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GizmoOwner(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManipulatorId(pub u64);

/// Aggregates the transform targets of several scene objects so one gizmo can drive them.
///
/// Targets are held weakly: the proxy never keeps a deleted object alive.
#[derive(Default)]
pub struct TransformProxy {
    targets: Vec<(TransformTarget, Weak<SceneObject>)>,
}

impl TransformProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_object(&mut self, object: &Rc<SceneObject>) {
        self.targets
            .push((object.transform_target(), Rc::downgrade(object)));
    }

    /// IDs of every target added to the proxy
    pub fn target_ids(&self) -> Vec<ObjectId> {
        self.targets
            .iter()
            .map(|(target, _)| target.object_id.clone())
            .collect()
    }

    /// Targets that are still alive
    pub fn targets(&self) -> Vec<Rc<SceneObject>> {
        self.targets
            .iter()
            .filter_map(|(_, weak)| weak.upgrade())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Gizmo pivot: mean position of the live targets
    pub fn pivot(&self) -> Option<Vec3> {
        let live = self.targets();
        if live.is_empty() {
            return None;
        }
        let sum: Vec3 = live.iter().map(|o| o.position()).sum();
        Some(sum / live.len() as f32)
    }
}

/// Engine capability that owns transform manipulators
pub trait ManipulatorHost {
    fn destroy_all_owned_by(&mut self, owner: GizmoOwner);
    fn create_manipulator(&mut self, elements: GizmoSubElements, owner: GizmoOwner) -> ManipulatorId;
    fn set_target(&mut self, manipulator: ManipulatorId, proxy: Rc<TransformProxy>);
}

/// A live manipulator
pub struct Manipulator {
    pub id: ManipulatorId,
    pub owner: GizmoOwner,
    pub elements: GizmoSubElements,
    pub target: Option<Rc<TransformProxy>>,
}

/// Headless manipulator host: keeps track of the manipulators that would be on screen
#[derive(Default)]
pub struct GizmoManager {
    manipulators: Vec<Manipulator>,
    next_id: u64,
}

impl GizmoManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manipulators(&self) -> &[Manipulator] {
        &self.manipulators
    }

    pub fn manipulator(&self, id: ManipulatorId) -> Option<&Manipulator> {
        self.manipulators.iter().find(|m| m.id == id)
    }

    pub fn owned_by(&self, owner: GizmoOwner) -> impl Iterator<Item = &Manipulator> {
        self.manipulators.iter().filter(move |m| m.owner == owner)
    }
}

impl ManipulatorHost for GizmoManager {
    fn destroy_all_owned_by(&mut self, owner: GizmoOwner) {
        let before = self.manipulators.len();
        self.manipulators.retain(|m| m.owner != owner);
        let destroyed = before - self.manipulators.len();
        if destroyed > 0 {
            tracing::debug!("Destroyed {destroyed} manipulator(s) owned by {:?}", owner);
        }
    }

    fn create_manipulator(&mut self, elements: GizmoSubElements, owner: GizmoOwner) -> ManipulatorId {
        let id = ManipulatorId(self.next_id);
        self.next_id += 1;
        self.manipulators.push(Manipulator {
            id,
            owner,
            elements,
            target: None,
        });
        tracing::debug!("Created manipulator {:?} ({:?}) for {:?}", id, elements, owner);
        id
    }

    fn set_target(&mut self, manipulator: ManipulatorId, proxy: Rc<TransformProxy>) {
        match self.manipulators.iter_mut().find(|m| m.id == manipulator) {
            Some(m) => m.target = Some(proxy),
            None => tracing::warn!("set_target on unknown manipulator {:?}", manipulator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::scene::{SceneObjectDesc, SceneRegistry};
    use crate::viewport::mesh;
    use shared::Transform;

    #[test]
    fn test_destroy_only_removes_owned() {
        let mut m = GizmoManager::new();
        m.create_manipulator(GizmoSubElements::TranslateRotate, GizmoOwner(1));
        m.create_manipulator(GizmoSubElements::TranslateRotate, GizmoOwner(2));
        m.destroy_all_owned_by(GizmoOwner(1));
        assert_eq!(m.manipulators().len(), 1);
        assert_eq!(m.owned_by(GizmoOwner(2)).count(), 1);
    }

    #[test]
    fn test_set_target_attaches_proxy() {
        let mut m = GizmoManager::new();
        let id = m.create_manipulator(GizmoSubElements::FullTranslateRotateScale, GizmoOwner(0));
        m.set_target(id, Rc::new(TransformProxy::new()));
        assert!(m.manipulator(id).unwrap().target.is_some());
    }

    #[test]
    fn test_proxy_pivot_is_mean_position() {
        let mut r = SceneRegistry::default();
        let a = r.create_object(
            SceneObjectDesc::new("a", mesh::cube(1.0, 1.0, 1.0, [1.0; 3]))
                .with_transform(Transform::at([0.0, 0.0, 0.0])),
        );
        let b = r.create_object(
            SceneObjectDesc::new("b", mesh::cube(1.0, 1.0, 1.0, [1.0; 3]))
                .with_transform(Transform::at([4.0, 2.0, 0.0])),
        );
        let mut proxy = TransformProxy::new();
        proxy.add_object(&a);
        proxy.add_object(&b);

        assert_eq!(proxy.len(), 2);
        assert_eq!(proxy.pivot(), Some(Vec3::new(2.0, 1.0, 0.0)));
        assert_eq!(proxy.target_ids(), vec![a.id().clone(), b.id().clone()]);
    }

    #[test]
    fn test_proxy_does_not_keep_objects_alive() {
        let mut r = SceneRegistry::default();
        let a = r.create_object(SceneObjectDesc::new("a", mesh::cube(1.0, 1.0, 1.0, [1.0; 3])));
        let mut proxy = TransformProxy::new();
        proxy.add_object(&a);

        r.delete_object(&a);
        drop(a);
        assert!(proxy.targets().is_empty());
        assert!(proxy.pivot().is_none());
        assert_eq!(proxy.len(), 1);
    }
}
