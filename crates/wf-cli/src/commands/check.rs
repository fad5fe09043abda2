use std::path::Path;

use colored::Colorize;
use wf_engine::EngineConfig;

use super::plural;

pub fn run(file: &Path) -> Result<(), String> {
    let world = super::load(file)?;
    let problems = world.lint();
    for problem in &problems {
        eprintln!("  {} {problem}", "warning:".yellow().bold());
    }

    let name = world.name.clone();
    let (rooms, regions, actors) = (world.rooms.len(), world.regions.len(), world.actors.len());
    world
        .build(EngineConfig::default())
        .map_err(|e| format!("{}: {e}", file.display()))?;

    if !problems.is_empty() {
        return Err(format!(
            "{} problem{} found",
            problems.len(),
            plural(problems.len())
        ));
    }

    println!("  All checks passed for '{name}'.");
    println!(
        "  {rooms} room{}, {regions} region{}, {actors} actor{}",
        plural(rooms),
        plural(regions),
        plural(actors)
    );
    Ok(())
}
