//! JSON command protocol for driving an editor session from scripts.

use serde::{Deserialize, Serialize};
use shared::{Primitive, Transform};

use crate::error::EditorError;
use crate::session::EditorSession;

/// A command a script can execute against the session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Create a new scene object from a primitive
    CreateObject {
        name: String,
        primitive: Primitive,
        #[serde(default)]
        transform: Transform,
    },
    /// Delete an object by ID
    DeleteObject {
        id: String,
    },
    /// Select (or deselect) one object.
    Select {
        id: String,
        #[serde(default)]
        deselect: bool,
        #[serde(default)]
        deselect_others: bool,
    },
    /// Flip the selection state of one object.
    ToggleSelect {
        id: String,
    },
    /// Replace the selection.
    SetSelection {
        ids: Vec<String>,
    },
    ClearSelection,
    /// Cast a ray into the scene and report the nearest hit.
    Pick {
        origin: [f32; 3],
        direction: [f32; 3],
        #[serde(default)]
        max_distance: Option<f32>,
    },
    /// Undo the last operation.
    Undo,
    /// Redo the last undone operation.
    Redo,
    SetGizmoEnabled {
        enabled: bool,
    },
    SetGizmoScaling {
        enabled: bool,
    },
    SetGizmoNonUniformScaling {
        enabled: bool,
    },
    /// Inspect the scene: list all objects and the selection.
    Inspect,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn unknown_object(id: &str) -> CommandResponse {
    CommandResponse::err(format!("No scene object with id {id}"))
}

/// Execute a single command on the session.
pub fn execute_command(session: &mut EditorSession, cmd: AgentCommand) -> CommandResponse {
    match cmd {
        AgentCommand::CreateObject {
            name,
            primitive,
            transform,
        } => {
            let id = session.create_primitive(&name, &primitive, transform);
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        AgentCommand::DeleteObject { id } => {
            if session.delete(&id) {
                CommandResponse::ok_with_data(serde_json::json!({ "removed": id }))
            } else {
                unknown_object(&id)
            }
        }

        AgentCommand::Select {
            id,
            deselect,
            deselect_others,
        } => {
            if session.select(&id, deselect, deselect_others) {
                CommandResponse::ok_with_data(serde_json::json!({ "selected": session.selected_ids() }))
            } else {
                unknown_object(&id)
            }
        }

        AgentCommand::ToggleSelect { id } => {
            if session.toggle(&id) {
                CommandResponse::ok_with_data(serde_json::json!({ "selected": session.selected_ids() }))
            } else {
                unknown_object(&id)
            }
        }

        AgentCommand::SetSelection { ids } => {
            let selected = session.set_selection(&ids);
            CommandResponse::ok_with_data(serde_json::json!({ "selected": selected }))
        }

        AgentCommand::ClearSelection => {
            session.clear_selection();
            CommandResponse::ok()
        }

        AgentCommand::Pick {
            origin,
            direction,
            max_distance,
        } => {
            let hit = session.pick(origin.into(), direction.into(), max_distance);
            let data = match hit {
                Some(hit) => serde_json::json!({
                    "hit": true,
                    "id": hit.object.id(),
                    "distance": hit.distance,
                    "point": hit.world_point.to_array(),
                    "triangle": hit.triangle_index,
                }),
                None => serde_json::json!({ "hit": false }),
            };
            CommandResponse::ok_with_data(data)
        }

        AgentCommand::Undo => {
            let success = session.undo();
            CommandResponse::ok_with_data(serde_json::json!({ "undone": success }))
        }

        AgentCommand::Redo => {
            let success = session.redo();
            CommandResponse::ok_with_data(serde_json::json!({ "redone": success }))
        }

        AgentCommand::SetGizmoEnabled { enabled } => {
            session.set_gizmo_enabled(enabled);
            CommandResponse::ok()
        }

        AgentCommand::SetGizmoScaling { enabled } => {
            session.set_enable_scaling(enabled);
            CommandResponse::ok()
        }

        AgentCommand::SetGizmoNonUniformScaling { enabled } => {
            session.set_enable_non_uniform_scaling(enabled);
            CommandResponse::ok()
        }

        AgentCommand::Inspect => {
            let gizmo = session.active_gizmo_elements();
            let objects: Vec<serde_json::Value> = session
                .registry
                .objects()
                .iter()
                .map(|object| {
                    serde_json::json!({
                        "id": object.id(),
                        "name": object.name(),
                        "position": object.transform().position,
                        "selected": session.registry.is_selected(object),
                        "highlight": object.highlight().map(|m| m.path().to_string()),
                        "material": object.material().path(),
                        "triangle_count": object.mesh().triangle_count(),
                    })
                })
                .collect();
            CommandResponse::ok_with_data(serde_json::json!({
                "object_count": objects.len(),
                "objects": objects,
                "selected": session.selected_ids(),
                "gizmo": gizmo,
                "gizmo_scaling": gizmo.is_some_and(|g| g.allows_scaling()),
                "gizmo_non_uniform_scaling": gizmo.is_some_and(|g| g.allows_non_uniform_scaling()),
                "can_undo": session.can_undo(),
                "can_redo": session.can_redo(),
            }))
        }
    }
}

/// Parse and execute a single JSON command string.
pub fn execute_json(session: &mut EditorSession, json: &str) -> Result<CommandResponse, EditorError> {
    let cmd: AgentCommand = serde_json::from_str(json).map_err(EditorError::InvalidCommand)?;
    Ok(execute_command(session, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    session: &mut EditorSession,
    json: &str,
) -> Result<Vec<CommandResponse>, EditorError> {
    let cmds: Vec<AgentCommand> = serde_json::from_str(json).map_err(EditorError::InvalidCommand)?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(session, cmd))
        .collect())
}
