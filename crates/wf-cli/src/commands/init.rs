use std::fs;
use std::path::Path;

const TEMPLATE: &str = r#"{
  "name": "__NAME__",
  "zones": {
    "teleport": { "town": "mainland", "wild": "mainland" },
    "track": { "town": "mainland", "wild": "mainland" }
  },
  "rooms": [
    {
      "at": "town:1",
      "name": "Town Square",
      "exits": [
        { "name": "north", "target": { "location": "town:2" } },
        { "name": "gate", "target": { "location": "wild.2.0" } }
      ]
    },
    {
      "at": "town:2",
      "name": "Old Chapel",
      "capacity": 4,
      "exits": [
        { "name": "south", "target": { "location": "town:1" } }
      ]
    }
  ],
  "regions": [
    {
      "name": "wild",
      "default_tile": ".",
      "tiles": [
        { "symbol": ".", "name": "Grassland" },
        { "symbol": "^", "name": "Mountains", "fly": null }
      ],
      "terrain": [
        ".....",
        ".^^..",
        "....."
      ]
    }
  ],
  "actors": [
    { "name": "Kael", "level": 5, "location": "town:1", "pets": ["Rex"] },
    { "name": "Rex", "kind": "monster", "size": "small", "location": "town:1" }
  ]
}
"#;

pub fn run(name: &str) -> Result<(), String> {
    let dir = Path::new(name);

    if dir.exists() {
        return Err(format!("directory '{name}' already exists"));
    }

    fs::create_dir_all(dir).map_err(|e| format!("cannot create directory: {e}"))?;
    fs::write(dir.join("world.json"), TEMPLATE.replace("__NAME__", name))
        .map_err(|e| format!("cannot write world.json: {e}"))?;

    println!("Created world '{name}' in {name}/");
    println!("  world.json  rooms, regions and actors");
    println!();
    println!("Get started:");
    println!("  cd {name}");
    println!("  wf check world.json                  # Validate the world");
    println!("  wf rooms world.json                  # List rooms and regions");
    println!("  wf walk world.json -a Kael north     # Take a walk");

    Ok(())
}
