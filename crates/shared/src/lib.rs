use serde::{Deserialize, Serialize};

/// Unique identifier of a scene object
pub type ObjectId = String;

/// Primitive mesh shape used when creating scene objects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Cube {
        width: f64,
        height: f64,
        depth: f64,
    },
    Cylinder {
        radius: f64,
        height: f64,
    },
    Sphere {
        radius: f64,
    },
    Cone {
        radius: f64,
        height: f64,
    },
}

/// Object transform. Rotation is XYZ Euler angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Transform {
    pub fn new() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Identity transform moved to `position`
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/// Which handles a transform gizmo exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GizmoSubElements {
    /// Translation and rotation handles only
    TranslateRotate,
    /// Translation, rotation and a single uniform-scale handle
    TranslateRotateUniformScale,
    /// Translation, rotation and per-axis scale handles
    FullTranslateRotateScale,
}

impl GizmoSubElements {
    pub fn allows_scaling(&self) -> bool {
        !matches!(self, GizmoSubElements::TranslateRotate)
    }

    pub fn allows_non_uniform_scaling(&self) -> bool {
        matches!(self, GizmoSubElements::FullTranslateRotateScale)
    }
}
