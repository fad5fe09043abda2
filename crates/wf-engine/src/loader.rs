//! JSON world files.
//!
//! A world file lists procedural regions, authored rooms, zone tags, actors
//! and groups. Actors refer to each other by name; the loader turns those
//! names into identifiers and spawns everyone at their starting location.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use wf_core::{
    Actor, ActorFlag, ActorKind, Area, AreaDef, Condition, ExitTarget, Group, GroupStatus,
    Location, Role, RoomDef, Size, SymbolicRef, World,
};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::store::MemoryStore;
use crate::zone::StaticZones;

/// Top-level world file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldFile {
    /// World name.
    pub name: String,
    /// Grid regions.
    #[serde(default)]
    pub regions: Vec<AreaDef>,
    /// Authored rooms with their addresses.
    #[serde(default)]
    pub rooms: Vec<AuthoredRoom>,
    /// Zone tags per region.
    #[serde(default)]
    pub zones: StaticZones,
    /// Actors to place.
    #[serde(default)]
    pub actors: Vec<ActorDef>,
    /// Groups to form after actors are placed.
    #[serde(default)]
    pub groups: Vec<GroupDef>,
}

/// An authored room and its address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoredRoom {
    /// Address the room is loaded at.
    pub at: Location,
    /// Authored content.
    #[serde(flatten)]
    pub def: RoomDef,
}

/// An actor as written in a world file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorDef {
    /// Unique actor name.
    pub name: String,
    /// Player or mobile.
    #[serde(default = "player_kind")]
    pub kind: ActorKind,
    /// Staff role.
    #[serde(default)]
    pub role: Role,
    /// Experience level.
    #[serde(default = "first_level")]
    pub level: u32,
    /// Body size.
    #[serde(default)]
    pub size: Size,
    /// Starting hit points.
    #[serde(default)]
    pub hp: Option<i32>,
    /// Dexterity score.
    #[serde(default)]
    pub dexterity: Option<u32>,
    /// Carried weight.
    #[serde(default)]
    pub weight: u32,
    /// Most weight the actor can carry.
    #[serde(default)]
    pub max_weight: Option<u32>,
    /// Gold on hand.
    #[serde(default)]
    pub gold: u64,
    /// Active conditions.
    #[serde(default)]
    pub conditions: BTreeSet<Condition>,
    /// Actor flags.
    #[serde(default)]
    pub flags: BTreeSet<ActorFlag>,
    /// Skill name to proficiency.
    #[serde(default)]
    pub skills: BTreeMap<String, u32>,
    /// Key ids carried.
    #[serde(default)]
    pub keys: BTreeSet<String>,
    /// Wearing climbing gear.
    #[serde(default)]
    pub climbing_gear: bool,
    /// Flight strength.
    #[serde(default)]
    pub fly_strength: u8,
    /// Names of actors this one is fighting, current target first.
    #[serde(default)]
    pub enemies: Vec<String>,
    /// Names of this actor's pets.
    #[serde(default)]
    pub pets: Vec<String>,
    /// Starting location.
    #[serde(default)]
    pub location: Option<Location>,
    /// Location before the last move.
    #[serde(default)]
    pub previous: Option<Location>,
    /// Bound location for recall.
    #[serde(default)]
    pub bound: Option<Location>,
    /// Rooms the actor keeps items in.
    #[serde(default)]
    pub storage: Vec<Location>,
}

fn player_kind() -> ActorKind {
    ActorKind::Player
}

fn first_level() -> u32 {
    1
}

/// A group as written in a world file, members by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDef {
    /// Group name.
    pub name: String,
    /// Name of the leading actor.
    pub leader: String,
    /// Member names.
    #[serde(default)]
    pub members: Vec<String>,
    /// Names invited but not yet joined.
    #[serde(default)]
    pub invited: Vec<String>,
}

impl WorldFile {
    /// Parse a world file from JSON.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// References that would fail at move time: exits into rooms or regions
    /// that do not exist, and embedded rooms with no content.
    pub fn lint(&self) -> Vec<String> {
        let rooms: BTreeSet<&Location> = self.rooms.iter().map(|r| &r.at).collect();
        let regions: BTreeSet<&str> = self.regions.iter().map(|r| r.name.as_str()).collect();
        let known = |loc: &Location| match loc {
            Location::Symbolic(_) => rooms.contains(loc),
            Location::Grid(g) => regions.contains(g.region.as_str()),
        };

        let mut problems = Vec::new();
        for room in &self.rooms {
            for exit in &room.def.exits {
                let dangling = match &exit.target {
                    ExitTarget::Location(to) if !known(to) => Some(to),
                    _ => None,
                };
                if let Some(to) = dangling {
                    problems.push(format!(
                        "{}: exit \"{}\" leads to unknown {to}",
                        room.at, exit.name
                    ));
                }
            }
        }
        for region in &self.regions {
            for e in &region.embedded {
                let at = Location::Symbolic(e.room.clone());
                if !rooms.contains(&at) {
                    problems.push(format!("{}: embedded room {at} is not defined", region.name));
                }
            }
        }
        for actor in &self.actors {
            if let Some(loc) = actor.location.as_ref().filter(|l| !known(*l)) {
                problems.push(format!("{}: starts in unknown {loc}", actor.name));
            }
        }
        problems
    }

    /// Build an engine from this file.
    pub fn build(self, config: EngineConfig) -> EngineResult<Engine> {
        let mut world = World::new(&self.name);
        for def in self.regions {
            world.add_area(Area::new(def)?)?;
        }

        let mut store = MemoryStore::new();
        for room in self.rooms {
            let at = match room.at {
                Location::Symbolic(at) => at,
                grid => {
                    return Err(EngineError::Load(format!(
                        "room \"{}\" must have a symbolic address, not {grid}",
                        room.def.name
                    )));
                }
            };
            store.insert(at, room.def);
        }

        let mut spawns = Vec::new();
        for def in &self.actors {
            let actor = actor_from(def)?;
            let id = world.add_actor(actor)?;
            if let Some(at) = &def.location {
                spawns.push((id, at.clone()));
            }
        }
        for def in &self.actors {
            let id = lookup(&world, &def.name)?;
            for pet in &def.pets {
                let pet = lookup(&world, pet)?;
                world.tame(id, pet)?;
            }
            let enemies = def
                .enemies
                .iter()
                .map(|name| lookup(&world, name))
                .collect::<EngineResult<Vec<_>>>()?;
            if let Some(a) = world.actor_mut(id) {
                a.enemies = enemies;
            }
        }
        for def in &self.groups {
            let mut group = Group::new(&def.name, lookup(&world, &def.leader)?);
            for name in &def.members {
                group.add(lookup(&world, name)?, GroupStatus::Member);
            }
            for name in &def.invited {
                group.add(lookup(&world, name)?, GroupStatus::Invited);
            }
            world.add_group(group)?;
        }

        let mut engine = Engine::new(world, config)
            .with_store(store)
            .with_zones(self.zones);
        for (id, at) in spawns {
            if let Err(e) = engine.spawn(id, &at) {
                warn!(actor = %id, at = %at, error = %e, "could not place actor");
                return Err(e);
            }
        }
        info!(
            world = %self.name,
            actors = engine.world().actor_count(),
            "world loaded"
        );
        Ok(engine)
    }
}

impl Engine {
    /// Parse a JSON world file and build an engine from it.
    pub fn from_json(json: &str, config: EngineConfig) -> EngineResult<Self> {
        WorldFile::from_json(json)?.build(config)
    }
}

fn lookup(world: &World, name: &str) -> EngineResult<wf_core::ActorId> {
    world
        .find_actor(name)
        .ok_or_else(|| EngineError::Load(format!("unknown actor \"{name}\"")))
}

fn actor_from(def: &ActorDef) -> EngineResult<Actor> {
    let mut a = match def.kind {
        ActorKind::Player => Actor::player(&def.name, def.level),
        ActorKind::Monster => Actor::monster(&def.name, def.level),
    };
    a.role = def.role.clone();
    a.size = def.size;
    if let Some(hp) = def.hp {
        a.hp = hp;
        a.max_hp = hp;
    }
    if let Some(dex) = def.dexterity {
        a.dexterity = dex;
    }
    a.weight = def.weight;
    if let Some(max) = def.max_weight {
        a.max_weight = max;
    }
    a.gold = def.gold;
    a.conditions = def.conditions.clone();
    a.flags = def.flags.clone();
    a.skills = def.skills.clone();
    a.keys = def.keys.clone();
    a.climbing_gear = def.climbing_gear;
    a.fly_strength = def.fly_strength;
    a.previous = def.previous.clone();
    a.bound = def.bound.clone();
    a.storage = def
        .storage
        .iter()
        .map(|loc| match loc {
            Location::Symbolic(s) => Ok::<SymbolicRef, EngineError>(s.clone()),
            Location::Grid(_) => Err(EngineError::Load(format!(
                "{}: storage room {loc} must be a symbolic address",
                def.name
            ))),
        })
        .collect::<Result<_, _>>()?;
    Ok(a)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOWN: &str = r#"{
        "name": "Town",
        "rooms": [
            {"at": "town:1", "name": "Square",
             "exits": [{"name": "north", "target": {"location": "town:2"}}]},
            {"at": "town:2", "name": "Gate",
             "exits": [{"name": "south", "target": {"location": "town:1"}},
                       {"name": "out", "target": {"location": "wild.0.0"}}]}
        ],
        "regions": [{
            "name": "wild",
            "default_tile": ".",
            "tiles": [{"symbol": ".", "name": "Plains"}]
        }],
        "actors": [
            {"name": "Kael", "level": 5, "location": "town:1", "pets": ["Rex"]},
            {"name": "Rex", "kind": "monster", "location": "town:1"}
        ],
        "groups": []
    }"#;

    #[test]
    fn load_and_spawn() {
        let engine = Engine::from_json(TOWN, EngineConfig::default()).unwrap();
        let world = engine.world();
        let kael = world.find_actor("kael").unwrap();
        let rex = world.find_actor("Rex").unwrap();
        assert_eq!(world.actor(kael).unwrap().pets, vec![rex]);
        assert_eq!(world.actor(rex).unwrap().master, Some(kael));
        assert_eq!(
            world.actor(kael).unwrap().location,
            Some(Location::symbolic("town", 1))
        );
        assert_eq!(world.rooms_containing(kael), 1);
    }

    #[test]
    fn lint_reports_dangling_exits() {
        let mut file = WorldFile::from_json(TOWN).unwrap();
        assert!(file.lint().is_empty());
        file.rooms.pop();
        let problems = file.lint();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("town:2"));
    }

    #[test]
    fn unknown_pet_is_a_load_error() {
        let json = TOWN.replace("[\"Rex\"]", "[\"Fido\"]");
        let err = Engine::from_json(&json, EngineConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::Load(_)));
    }

    #[test]
    fn bad_json_is_reported() {
        assert!(matches!(
            Engine::from_json("{", EngineConfig::default()),
            Err(EngineError::Json(_))
        ));
    }
}
