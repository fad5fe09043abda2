use std::path::Path;

use comfy_table::{ContentArrangement, Table};
use wf_core::{Exit, ExitFlag};

use super::plural;

pub fn run(file: &Path, region: Option<&str>) -> Result<(), String> {
    let world = super::load(file)?;

    let rooms: Vec<_> = world
        .rooms
        .iter()
        .filter(|r| region.is_none_or(|name| r.at.region() == name))
        .collect();
    let regions: Vec<_> = world
        .regions
        .iter()
        .filter(|r| region.is_none_or(|name| r.name == name))
        .collect();

    if rooms.is_empty() && regions.is_empty() {
        println!("  No rooms found.");
        return Ok(());
    }

    if !rooms.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Room", "Name", "Exits", "Capacity"]);
        for room in &rooms {
            let exits = room
                .def
                .exits
                .iter()
                .map(exit_label)
                .collect::<Vec<_>>()
                .join(", ");
            let capacity = room
                .def
                .capacity
                .map_or_else(|| "-".to_string(), |c| c.to_string());
            table.add_row(vec![room.at.to_string(), room.def.name.clone(), exits, capacity]);
        }
        println!("{table}");
        println!();
    }

    if !regions.is_empty() {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Region", "Terrain", "Tiles", "Wraps at"]);
        for area in &regions {
            let width = area.terrain.iter().map(|row| row.chars().count()).max().unwrap_or(0);
            let tiles = area
                .tiles
                .iter()
                .map(|t| format!("{} {}", t.symbol, t.name))
                .collect::<Vec<_>>()
                .join(", ");
            let wrap = area
                .wrap
                .map_or_else(|| "-".to_string(), |w| format!("{}x{}", w.x, w.y));
            table.add_row(vec![
                area.name.clone(),
                format!("{width}x{}", area.terrain.len()),
                tiles,
                wrap,
            ]);
        }
        println!("{table}");
        println!();
    }

    println!(
        "  {} room{}, {} region{}",
        rooms.len(),
        plural(rooms.len()),
        regions.len(),
        plural(regions.len())
    );
    Ok(())
}

fn exit_label(exit: &Exit) -> String {
    if exit.is(ExitFlag::Locked) {
        format!("{} (locked)", exit.name)
    } else if exit.is(ExitFlag::Closed) {
        format!("{} (closed)", exit.name)
    } else {
        exit.name.clone()
    }
}
