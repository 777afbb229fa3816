// Library crate: the scene editing core, exposed for integration tests and the
// command-line driver in main.rs.

pub mod command;
pub mod error;
pub mod fixtures;
pub mod session;
pub mod state;

/// Headless viewport pieces: mesh data, ray picking, manipulator bookkeeping.
/// Rendering lives in whatever engine hosts the editor.
pub mod viewport {
    pub mod gizmo;
    pub mod mesh;
    pub mod picking;
}
