pub mod check;
pub mod init;
pub mod rooms;
pub mod walk;

use std::path::Path;

use wf_engine::{Engine, EngineConfig, WorldFile};

/// Read and parse a world file.
fn load(path: &Path) -> Result<WorldFile, String> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    WorldFile::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

/// Load a world file and build an engine from it.
fn build(path: &Path, config: EngineConfig) -> Result<Engine, String> {
    load(path)?
        .build(config)
        .map_err(|e| format!("{}: {e}", path.display()))
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
