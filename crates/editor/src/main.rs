use std::io::{self, BufRead, Write};

use mesh_scene_lib::command::execute_json;
use mesh_scene_lib::error::EditorError;
use mesh_scene_lib::session::EditorSession;
use mesh_scene_lib::state::EditorSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mesh_scene_editor=info,mesh_scene_lib=info".into()),
        )
        .init();

    let settings = EditorSettings::load();
    let mut session = EditorSession::new(&settings);

    let result = match parse_script_arg() {
        Some(path) => {
            tracing::info!("Running commands from {}", path);
            std::fs::File::open(&path)
                .map_err(|source| EditorError::Io {
                    path: path.into(),
                    source,
                })
                .and_then(|file| run(&mut session, io::BufReader::new(file)))
        }
        None => run(&mut session, io::stdin().lock()),
    };

    session.shutdown();
    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

/// Execute one JSON command per non-empty line, printing one JSON response per line
fn run(session: &mut EditorSession, input: impl BufRead) -> Result<(), EditorError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (number, line) in input.lines().enumerate() {
        let line = line.map_err(|source| EditorError::Io {
            path: "<input>".into(),
            source,
        })?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match execute_json(session, line) {
            Ok(response) => serde_json::to_string(&response),
            Err(e) => {
                tracing::error!("Line {}: {e}", number + 1);
                serde_json::to_string(&serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                }))
            }
        };
        match response {
            Ok(json) => writeln!(out, "{json}").map_err(|source| EditorError::Io {
                path: "<stdout>".into(),
                source,
            })?,
            Err(e) => tracing::error!("Failed to serialize response: {e}"),
        }
    }
    Ok(())
}

fn parse_script_arg() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--script" && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        i += 1;
    }
    None
}
