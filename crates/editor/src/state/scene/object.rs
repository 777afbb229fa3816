//! Scene objects and the visual capability they drive

use std::cell::{Cell, RefCell};
use std::fmt;

use glam::{EulerRot, Mat4, Quat, Vec3};
use shared::{ObjectId, Transform};

use crate::viewport::mesh::MeshData;
use crate::viewport::picking::{pick_triangle, Ray, TriangleHit};

/// Handle to a material asset (asset path)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub String);

impl MaterialHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MaterialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Engine-side representation of a scene object (render components, material overrides).
///
/// Methods take `&self`: the object is shared between the registry and undo records,
/// so backends keep whatever state they need behind interior mutability.
pub trait ObjectVisual {
    /// Override the object's materials with a highlight material
    fn apply_highlight(&self, material: &MaterialHandle);
    /// Drop the highlight and restore the object's standard material
    fn clear_highlight(&self, standard: &MaterialHandle);
    /// Register or unregister the object's render components
    fn set_registered(&self, registered: bool);
}

/// Visual backend for headless sessions: nothing is rendered
#[derive(Debug, Default)]
pub struct NullVisual;

impl ObjectVisual for NullVisual {
    fn apply_highlight(&self, _material: &MaterialHandle) {}
    fn clear_highlight(&self, _standard: &MaterialHandle) {}
    fn set_registered(&self, _registered: bool) {}
}

/// Everything needed to construct a [`SceneObject`]
pub struct SceneObjectDesc {
    pub name: String,
    pub mesh: MeshData,
    pub transform: Transform,
    pub visual: Box<dyn ObjectVisual>,
}

impl SceneObjectDesc {
    pub fn new(name: impl Into<String>, mesh: MeshData) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: Transform::new(),
            visual: Box::new(NullVisual),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visual(mut self, visual: Box<dyn ObjectVisual>) -> Self {
        self.visual = visual;
        self
    }
}

/// Identifies what a transform gizmo moves when it drives a scene object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformTarget {
    pub object_id: ObjectId,
}

/// One mesh entity in the runtime scene
pub struct SceneObject {
    id: ObjectId,
    name: String,
    mesh: MeshData,
    transform: Transform,
    standard_material: MaterialHandle,
    highlight: RefCell<Option<MaterialHandle>>,
    registered: Cell<bool>,
    visual: Box<dyn ObjectVisual>,
}

impl SceneObject {
    pub(crate) fn new(desc: SceneObjectDesc, standard_material: MaterialHandle) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: desc.name,
            mesh: desc.mesh,
            transform: desc.transform,
            standard_material,
            highlight: RefCell::new(None),
            registered: Cell::new(true),
            visual: desc.visual,
        }
    }

    pub fn id(&self) -> &ObjectId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &MeshData {
        &self.mesh
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        let [x, y, z] = self.transform.position;
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Local-to-world matrix built from the object's transform
    pub fn world_matrix(&self) -> Mat4 {
        let t = &self.transform;
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            (t.rotation[0] as f32).to_radians(),
            (t.rotation[1] as f32).to_radians(),
            (t.rotation[2] as f32).to_radians(),
        );
        let scale = Vec3::new(t.scale[0] as f32, t.scale[1] as f32, t.scale[2] as f32);
        Mat4::from_scale_rotation_translation(scale, rotation, self.position())
    }

    /// Material currently overriding this object, if highlighted
    pub fn highlight(&self) -> Option<MaterialHandle> {
        self.highlight.borrow().clone()
    }

    /// Material shown when the object is not highlighted
    pub fn standard_material(&self) -> &MaterialHandle {
        &self.standard_material
    }

    /// Material currently shown: the highlight if any, else the standard material
    pub fn material(&self) -> MaterialHandle {
        self.highlight()
            .unwrap_or_else(|| self.standard_material.clone())
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlight.borrow().is_some()
    }

    /// Whether the object's render components are registered with the engine
    pub fn is_registered(&self) -> bool {
        self.registered.get()
    }

    pub fn set_highlight_material(&self, material: &MaterialHandle) {
        *self.highlight.borrow_mut() = Some(material.clone());
        self.visual.apply_highlight(material);
    }

    pub fn clear_highlight_material(&self) {
        self.highlight.borrow_mut().take();
        self.visual.clear_highlight(&self.standard_material);
    }

    pub(crate) fn set_registered(&self, registered: bool) {
        self.registered.set(registered);
        self.visual.set_registered(registered);
    }

    pub fn transform_target(&self) -> TransformTarget {
        TransformTarget {
            object_id: self.id.clone(),
        }
    }

    /// Intersect a world-space ray with this object's triangles
    pub fn intersect_ray(&self, ray: &Ray, max_distance: f32) -> Option<TriangleHit> {
        pick_triangle(ray, &self.mesh, &self.world_matrix(), max_distance)
    }
}

impl fmt::Debug for SceneObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneObject")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("standard_material", &self.standard_material)
            .field("highlight", &self.highlight.borrow())
            .field("registered", &self.registered.get())
            .finish()
    }
}
