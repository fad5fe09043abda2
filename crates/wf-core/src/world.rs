use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::actor::{Actor, ActorId};
use crate::addressing::{Location, SymbolicRef};
use crate::area::{Area, SlotId};
use crate::error::{WfError, WfResult};
use crate::group::{Group, GroupId};
use crate::room::Room;
use crate::track::Track;

/// Stable handle to a live room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RoomKey {
    /// An authored room, by its symbolic reference.
    Authored(SymbolicRef),
    /// A procedural room, by region and pool slot.
    Procedural {
        /// Region owning the slot.
        region: String,
        /// Slot in the region's pool.
        slot: SlotId,
    },
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authored(s) => write!(f, "{s}"),
            Self::Procedural { region, slot } => write!(f, "{region}{slot}"),
        }
    }
}

/// The arena. Owns every actor, group, region and resident room; all
/// cross-references are identifiers resolved through it.
#[derive(Debug, Clone)]
pub struct World {
    /// World name, for display.
    pub name: String,
    actors: HashMap<ActorId, Actor>,
    groups: HashMap<GroupId, Group>,
    areas: BTreeMap<String, Area>,
    authored: HashMap<SymbolicRef, Room>,
    authored_tracks: HashMap<SymbolicRef, Track>,

    // Indexes
    by_name_lower: HashMap<String, ActorId>,
}

impl World {
    /// An empty world.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actors: HashMap::new(),
            groups: HashMap::new(),
            areas: BTreeMap::new(),
            authored: HashMap::new(),
            authored_tracks: HashMap::new(),
            by_name_lower: HashMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Actors
    // -----------------------------------------------------------------------

    /// Register an actor. Names are unique, case-insensitively. The actor
    /// is not placed in any room.
    pub fn add_actor(&mut self, mut actor: Actor) -> WfResult<ActorId> {
        let name_lower = actor.name.to_lowercase();
        if self.by_name_lower.contains_key(&name_lower) {
            return Err(WfError::DuplicateActor(actor.name));
        }
        actor.location = None;
        let id = actor.id;
        self.by_name_lower.insert(name_lower, id);
        self.actors.insert(id, actor);
        Ok(id)
    }

    /// Look up an actor.
    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    /// Look up an actor mutably.
    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    /// Like [`World::actor`], but missing actors are an error.
    pub fn try_actor(&self, id: ActorId) -> WfResult<&Actor> {
        self.actors.get(&id).ok_or(WfError::ActorNotFound(id))
    }

    /// Find an actor ID by name (case-insensitive).
    pub fn find_actor(&self, name: &str) -> Option<ActorId> {
        self.by_name_lower.get(&name.to_lowercase()).copied()
    }

    /// All actors, in no particular order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Number of actors.
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Pair a pet with its master.
    pub fn tame(&mut self, master: ActorId, pet: ActorId) -> WfResult<()> {
        if !self.actors.contains_key(&pet) {
            return Err(WfError::ActorNotFound(pet));
        }
        let m = self
            .actors
            .get_mut(&master)
            .ok_or(WfError::ActorNotFound(master))?;
        if !m.pets.contains(&pet) {
            m.pets.push(pet);
        }
        if let Some(p) = self.actors.get_mut(&pet) {
            p.master = Some(master);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Groups
    // -----------------------------------------------------------------------

    /// Register a group and point its leader and members at it.
    pub fn add_group(&mut self, group: Group) -> WfResult<GroupId> {
        let id = group.id;
        let everyone = std::iter::once(group.leader).chain(group.members.iter().map(|(m, _)| *m));
        for member in everyone {
            let actor = self
                .actors
                .get_mut(&member)
                .ok_or(WfError::ActorNotFound(member))?;
            actor.group = Some(id);
        }
        self.groups.insert(id, group);
        Ok(id)
    }

    /// Look up a group.
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    /// Look up a group mutably.
    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(&id)
    }

    /// The group an actor belongs to, if any.
    pub fn group_of(&self, actor: ActorId) -> Option<&Group> {
        self.actors
            .get(&actor)
            .and_then(|a| a.group)
            .and_then(|g| self.groups.get(&g))
    }

    // -----------------------------------------------------------------------
    // Regions
    // -----------------------------------------------------------------------

    /// Register a procedural region. Region names must be unique.
    pub fn add_area(&mut self, area: Area) -> WfResult<()> {
        if self.areas.contains_key(area.name()) {
            return Err(WfError::DuplicateRegion(area.name().to_string()));
        }
        self.areas.insert(area.name().to_string(), area);
        Ok(())
    }

    /// Look up a region.
    pub fn area(&self, name: &str) -> Option<&Area> {
        self.areas.get(name)
    }

    /// Look up a region mutably.
    pub fn area_mut(&mut self, name: &str) -> Option<&mut Area> {
        self.areas.get_mut(name)
    }

    /// All regions.
    pub fn areas(&self) -> impl Iterator<Item = &Area> {
        self.areas.values()
    }

    /// All regions, mutably.
    pub fn areas_mut(&mut self) -> impl Iterator<Item = &mut Area> {
        self.areas.values_mut()
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    /// Make an authored room resident. An already-resident room is kept.
    pub fn insert_authored(&mut self, room: Room) -> WfResult<RoomKey> {
        let Location::Symbolic(at) = room.location() else {
            return Err(WfError::Validation(format!(
                "room \"{}\" is not an authored room",
                room.name
            )));
        };
        self.authored.entry(at.clone()).or_insert(room);
        Ok(RoomKey::Authored(at))
    }

    /// Drop a resident authored room, returning it.
    pub fn release_authored(&mut self, at: &SymbolicRef) -> Option<Room> {
        self.authored.remove(at)
    }

    /// Handle for the resident room at a location, if there is one.
    pub fn room_key_of(&self, location: &Location) -> Option<RoomKey> {
        match location {
            Location::Symbolic(s) => self
                .authored
                .contains_key(s)
                .then(|| RoomKey::Authored(s.clone())),
            Location::Grid(g) => {
                let slot = self.areas.get(&g.region)?.lookup_only(g.coord)?;
                Some(RoomKey::Procedural {
                    region: g.region.clone(),
                    slot,
                })
            }
        }
    }

    /// The live room behind a key.
    pub fn room(&self, key: &RoomKey) -> Option<&Room> {
        match key {
            RoomKey::Authored(s) => self.authored.get(s),
            RoomKey::Procedural { region, slot } => self.areas.get(region)?.room(*slot),
        }
    }

    /// The live room behind a key, mutably.
    pub fn room_mut(&mut self, key: &RoomKey) -> Option<&mut Room> {
        match key {
            RoomKey::Authored(s) => self.authored.get_mut(s),
            RoomKey::Procedural { region, slot } => self.areas.get_mut(region)?.room_mut(*slot),
        }
    }

    /// Like [`World::room_mut`], but a missing room is an error.
    pub fn try_room_mut(&mut self, key: &RoomKey) -> WfResult<&mut Room> {
        self.room_mut(key)
            .ok_or_else(|| WfError::RoomNotResident(key.to_string()))
    }

    /// The room an actor currently stands in.
    pub fn room_of(&self, actor: ActorId) -> Option<RoomKey> {
        let loc = self.actors.get(&actor)?.location.as_ref()?;
        self.room_key_of(loc)
    }

    /// Every resident room, authored first.
    pub fn resident_rooms(&self) -> Vec<(RoomKey, &Room)> {
        let mut authored: Vec<_> = self.authored.iter().collect();
        authored.sort_by(|a, b| a.0.cmp(b.0));
        let mut out: Vec<(RoomKey, &Room)> = authored
            .into_iter()
            .map(|(s, r)| (RoomKey::Authored(s.clone()), r))
            .collect();
        for (name, area) in &self.areas {
            out.extend(area.resident_rooms().map(|(slot, r)| {
                (
                    RoomKey::Procedural {
                        region: name.clone(),
                        slot,
                    },
                    r,
                )
            }));
        }
        out
    }

    /// How many resident rooms list the actor as an occupant.
    pub fn rooms_containing(&self, actor: ActorId) -> usize {
        self.resident_rooms()
            .iter()
            .filter(|(_, r)| r.contains(actor))
            .count()
    }

    // -----------------------------------------------------------------------
    // Occupancy
    // -----------------------------------------------------------------------

    /// Move an actor into a resident room, removing it from wherever it was.
    pub fn place(&mut self, actor: ActorId, key: &RoomKey) -> WfResult<()> {
        if !self.actors.contains_key(&actor) {
            return Err(WfError::ActorNotFound(actor));
        }
        let location = self
            .room(key)
            .map(Room::location)
            .ok_or_else(|| WfError::RoomNotResident(key.to_string()))?;
        self.unplace(actor)?;
        self.try_room_mut(key)?.add_occupant(actor);
        if let Some(a) = self.actors.get_mut(&actor) {
            a.location = Some(location);
        }
        Ok(())
    }

    /// Take an actor out of its room. Its location is kept so callers can
    /// record it as the previous one. Returns the room it left.
    pub fn unplace(&mut self, actor: ActorId) -> WfResult<Option<RoomKey>> {
        if !self.actors.contains_key(&actor) {
            return Err(WfError::ActorNotFound(actor));
        }
        let Some(key) = self.room_of(actor) else {
            return Ok(None);
        };
        if let Some(room) = self.room_mut(&key) {
            room.remove_occupant(actor);
        }
        Ok(Some(key))
    }

    // -----------------------------------------------------------------------
    // Tracks
    // -----------------------------------------------------------------------

    /// Footprint left at a location, authored or procedural.
    pub fn track_at(&self, location: &Location) -> Option<&Track> {
        match location {
            Location::Symbolic(s) => self.authored_tracks.get(s),
            Location::Grid(g) => self.areas.get(&g.region)?.track_at(g.coord),
        }
    }

    /// Footprint record for a location, created on demand.
    pub fn track_mut(&mut self, location: &Location) -> Option<&mut Track> {
        match location {
            Location::Symbolic(s) => Some(self.authored_tracks.entry(s.clone()).or_default()),
            Location::Grid(g) => self.areas.get_mut(&g.region)?.track_mut(g.coord),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{AreaDef, Tile};
    use crate::room::RoomDef;
    use crate::{Coord, GroupStatus};

    fn test_world() -> World {
        let mut world = World::new("Test");
        for id in 1..=2 {
            let def = RoomDef {
                name: format!("Room {id}"),
                ..RoomDef::default()
            };
            world
                .insert_authored(Room::authored(SymbolicRef::new("town", id), def))
                .unwrap();
        }
        let plains = Tile {
            symbol: '.',
            name: "Plains".to_string(),
            water: false,
            road: false,
            fly: Some(0),
            holds_tracks: true,
            flags: Default::default(),
            capacity: None,
        };
        let area = Area::new(AreaDef {
            name: "wild".to_string(),
            default_tile: '.',
            tiles: vec![plains],
            terrain: Vec::new(),
            wrap: None,
            embedded: Vec::new(),
        })
        .unwrap();
        world.add_area(area).unwrap();
        world
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut world = test_world();
        world.add_actor(Actor::player("Kael", 3)).unwrap();
        assert!(world.add_actor(Actor::player("kael", 4)).is_err());
        assert!(world.find_actor("KAEL").is_some());
    }

    #[test]
    fn place_moves_between_rooms() {
        let mut world = test_world();
        let kael = world.add_actor(Actor::player("Kael", 3)).unwrap();
        let one = RoomKey::Authored(SymbolicRef::new("town", 1));
        let two = RoomKey::Authored(SymbolicRef::new("town", 2));

        world.place(kael, &one).unwrap();
        world.place(kael, &two).unwrap();
        assert!(world.room(&one).unwrap().is_empty());
        assert!(world.room(&two).unwrap().contains(kael));
        assert_eq!(world.rooms_containing(kael), 1);
        assert_eq!(world.room_of(kael), Some(two));
    }

    #[test]
    fn grid_locations_resolve_only_when_resident() {
        let mut world = test_world();
        let loc = Location::grid("wild", 4, 4, 0);
        assert!(world.room_key_of(&loc).is_none());
        world.area_mut("wild").unwrap().get_or_create(Coord::new(4, 4, 0));
        let key = world.room_key_of(&loc).unwrap();
        assert_eq!(world.room(&key).unwrap().location(), loc);
    }

    #[test]
    fn groups_point_members_back() {
        let mut world = test_world();
        let lead = world.add_actor(Actor::player("Lead", 5)).unwrap();
        let mate = world.add_actor(Actor::player("Mate", 5)).unwrap();
        let mut g = Group::new("party", lead);
        g.add(mate, GroupStatus::Member);
        let gid = world.add_group(g).unwrap();
        assert_eq!(world.actor(mate).unwrap().group, Some(gid));
        assert_eq!(world.group_of(lead).unwrap().followers(), vec![mate]);
    }

    #[test]
    fn authored_tracks_survive_release() {
        let mut world = test_world();
        let at = Location::symbolic("town", 1);
        world.track_mut(&at).unwrap().reset("north");
        world.release_authored(&SymbolicRef::new("town", 1));
        assert_eq!(
            world.track_at(&at).unwrap().direction.as_deref(),
            Some("north")
        );
    }
}
