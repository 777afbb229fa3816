pub mod gizmo_binding;
pub mod scene;
pub mod settings;

pub use gizmo_binding::{choose_sub_elements, GizmoBinder};
pub use scene::{SceneObject, SceneObjectDesc, SceneRegistry, UndoHistory};
pub use settings::EditorSettings;
