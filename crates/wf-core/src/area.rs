use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::addressing::{Coord, Direction, GridRef, Location, SymbolicRef};
use crate::error::{WfError, WfResult};
use crate::exit::Exit;
use crate::room::{Room, RoomFlag, RoomKind};
use crate::track::Track;

/// Default cap on remembered footprints per region.
pub const DEFAULT_MAX_TRACKS: usize = 100;

/// Terrain template for one map symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Map symbol this tile is drawn with.
    pub symbol: char,
    /// Terrain name, used as the room name.
    pub name: String,
    /// Water cannot be crossed without flight.
    #[serde(default)]
    pub water: bool,
    /// Roads can always be travelled.
    #[serde(default)]
    pub road: bool,
    /// Flight strength needed to cross. `None` means the tile cannot be
    /// crossed at all.
    #[serde(default = "walkable")]
    pub fly: Option<u8>,
    /// Whether footprints can be left here.
    #[serde(default = "yes")]
    pub holds_tracks: bool,
    /// Traits copied onto rooms made from this tile.
    #[serde(default)]
    pub flags: BTreeSet<RoomFlag>,
    /// Player capacity of rooms made from this tile.
    #[serde(default)]
    pub capacity: Option<u32>,
}

fn walkable() -> Option<u8> {
    Some(0)
}

fn yes() -> bool {
    true
}

/// An authored room bound to a fixed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedRoom {
    /// Cell the room is bound to.
    pub at: Coord,
    /// The authored room found there.
    pub room: SymbolicRef,
}

/// Authored description of a procedural region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaDef {
    /// Region name, the first part of every grid reference.
    pub name: String,
    /// Symbol used for cells outside the terrain map.
    pub default_tile: char,
    /// Terrain templates, one per symbol.
    pub tiles: Vec<Tile>,
    /// Terrain at `z = 0`: row `y`, column `x`, one symbol per cell.
    #[serde(default)]
    pub terrain: Vec<String>,
    /// Critical bounds per axis; a coordinate past `+n` wraps to `-n` and
    /// vice versa. Zero disables wrapping on that axis.
    #[serde(default)]
    pub wrap: Option<Coord>,
    /// Authored rooms bound to fixed cells.
    #[serde(default)]
    pub embedded: Vec<EmbeddedRoom>,
}

/// Index of a room slot in a region's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub u32);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    room: Room,
    resident: bool,
}

/// A procedural region: terrain plus a pool of live rooms keyed by cell.
#[derive(Debug, Clone)]
pub struct Area {
    name: String,
    default_tile: Tile,
    tiles: HashMap<char, Tile>,
    terrain: Vec<Vec<char>>,
    wrap: Option<Coord>,
    embedded: HashMap<Coord, SymbolicRef>,

    slots: Vec<Slot>,
    by_coord: HashMap<Coord, SlotId>,
    free: Vec<SlotId>,

    tracks: VecDeque<(Coord, Track)>,
    max_tracks: usize,
}

impl Area {
    /// Build a region from its definition, checking that every map symbol
    /// has a tile.
    pub fn new(def: AreaDef) -> WfResult<Self> {
        let tiles: HashMap<char, Tile> = def.tiles.into_iter().map(|t| (t.symbol, t)).collect();
        let default_tile = tiles.get(&def.default_tile).cloned().ok_or_else(|| {
            WfError::Validation(format!(
                "region \"{}\": default tile '{}' is not defined",
                def.name, def.default_tile
            ))
        })?;

        let terrain: Vec<Vec<char>> = def.terrain.iter().map(|row| row.chars().collect()).collect();
        for (y, row) in terrain.iter().enumerate() {
            if let Some(sym) = row.iter().find(|c| !tiles.contains_key(*c)) {
                return Err(WfError::Validation(format!(
                    "region \"{}\": unknown terrain symbol '{sym}' in row {y}",
                    def.name
                )));
            }
        }

        let mut embedded = HashMap::new();
        for e in def.embedded {
            if embedded.insert(e.at, e.room).is_some() {
                return Err(WfError::Validation(format!(
                    "region \"{}\": two rooms embedded at {}",
                    def.name, e.at
                )));
            }
        }

        Ok(Self {
            name: def.name,
            default_tile,
            tiles,
            terrain,
            wrap: def.wrap,
            embedded,
            slots: Vec::new(),
            by_coord: HashMap::new(),
            free: Vec::new(),
            tracks: VecDeque::new(),
            max_tracks: DEFAULT_MAX_TRACKS,
        })
    }

    /// Region name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cap the footprint list, evicting the oldest records.
    pub fn set_max_tracks(&mut self, max: usize) {
        self.max_tracks = max;
        while self.tracks.len() > max {
            self.tracks.pop_front();
        }
    }

    // -----------------------------------------------------------------------
    // Terrain
    // -----------------------------------------------------------------------

    /// Apply wrap bounds.
    pub fn cycle(&self, coord: Coord) -> Coord {
        let Some(bounds) = self.wrap else {
            return coord;
        };
        let wrap = |v: i32, crit: i32| {
            if crit <= 0 {
                v
            } else if v > crit {
                -crit
            } else if v < -crit {
                crit
            } else {
                v
            }
        };
        Coord::new(
            wrap(coord.x, bounds.x),
            wrap(coord.y, bounds.y),
            wrap(coord.z, bounds.z),
        )
    }

    /// Terrain template for a cell; cells off the map use the default tile.
    pub fn tile_at(&self, coord: Coord) -> &Tile {
        let coord = self.cycle(coord);
        if coord.z != 0 || coord.x < 0 || coord.y < 0 {
            return &self.default_tile;
        }
        self.terrain
            .get(coord.y as usize)
            .and_then(|row| row.get(coord.x as usize))
            .and_then(|sym| self.tiles.get(sym))
            .unwrap_or(&self.default_tile)
    }

    /// Whether a traveler with the given flight strength can enter a cell.
    pub fn can_pass(&self, coord: Coord, fly_strength: u8) -> bool {
        let tile = self.tile_at(coord);
        if tile.road {
            return true;
        }
        match tile.fly {
            None => false,
            Some(_) if tile.water && fly_strength == 0 => false,
            Some(needed) => fly_strength >= needed,
        }
    }

    /// Authored room bound to this cell, if any.
    pub fn embedded_at(&self, coord: Coord) -> Option<&SymbolicRef> {
        self.embedded.get(&self.cycle(coord))
    }

    /// Grid reference for a cell, after wrapping.
    pub fn grid_ref(&self, coord: Coord) -> GridRef {
        let c = self.cycle(coord);
        GridRef::new(self.name.clone(), c.x, c.y, c.z)
    }

    // -----------------------------------------------------------------------
    // Room pool
    // -----------------------------------------------------------------------

    /// The resident room at a cell, without materializing anything.
    pub fn lookup_only(&self, coord: Coord) -> Option<SlotId> {
        self.by_coord.get(&self.cycle(coord)).copied()
    }

    /// The resident room at a cell, materializing it from terrain if needed.
    pub fn get_or_create(&mut self, coord: Coord) -> SlotId {
        let coord = self.cycle(coord);
        if let Some(id) = self.by_coord.get(&coord) {
            return *id;
        }
        let room = self.populate(coord);
        let id = match self.free.pop() {
            Some(id) => {
                self.slots[id.0 as usize] = Slot {
                    room,
                    resident: true,
                };
                id
            }
            None => {
                self.slots.push(Slot {
                    room,
                    resident: true,
                });
                SlotId((self.slots.len() - 1) as u32)
            }
        };
        self.by_coord.insert(coord, id);
        id
    }

    /// Retarget a reclaimable room to another cell instead of freeing it.
    /// If the new cell already has a resident room, the old one is reclaimed
    /// and the resident one is returned.
    pub fn recycle(&mut self, slot: SlotId, coord: Coord) -> WfResult<SlotId> {
        if !self.is_reclaimable(slot) {
            return Err(WfError::Validation(format!(
                "room {slot} in \"{}\" cannot be recycled",
                self.name
            )));
        }
        let coord = self.cycle(coord);
        if let Some(existing) = self.by_coord.get(&coord).copied() {
            self.reclaim(slot);
            return Ok(existing);
        }
        let old = self.coord_of(slot);
        if let Some(old) = old {
            self.by_coord.remove(&old);
        }
        let room = self.populate(coord);
        self.slots[slot.0 as usize].room = room;
        self.by_coord.insert(coord, slot);
        Ok(slot)
    }

    /// Empty, unpinned, unaltered, with no embedded room and nothing on the
    /// floor worth keeping.
    pub fn is_reclaimable(&self, slot: SlotId) -> bool {
        let Some(room) = self.room(slot) else {
            return false;
        };
        room.is_empty()
            && room.pins() == 0
            && room.embedded().is_none()
            && !room.dirty
            && room.items.iter().all(|i| i.disposable)
            && room.has_standard_exits()
    }

    /// Release a room back to the pool. Returns `false` if it is not
    /// reclaimable.
    pub fn reclaim(&mut self, slot: SlotId) -> bool {
        if !self.is_reclaimable(slot) {
            return false;
        }
        if let Some(coord) = self.coord_of(slot) {
            self.by_coord.remove(&coord);
        }
        self.slots[slot.0 as usize].resident = false;
        self.free.push(slot);
        true
    }

    /// Reclaim every eligible room. Returns how many were released.
    pub fn clean_up_rooms(&mut self) -> usize {
        let candidates: Vec<SlotId> = self.by_coord.values().copied().collect();
        candidates.into_iter().filter(|s| self.reclaim(*s)).count()
    }

    /// The resident room in a slot.
    pub fn room(&self, slot: SlotId) -> Option<&Room> {
        self.slots
            .get(slot.0 as usize)
            .filter(|s| s.resident)
            .map(|s| &s.room)
    }

    /// The resident room in a slot, mutably.
    pub fn room_mut(&mut self, slot: SlotId) -> Option<&mut Room> {
        self.slots
            .get_mut(slot.0 as usize)
            .filter(|s| s.resident)
            .map(|s| &mut s.room)
    }

    /// Resident rooms, in slot order.
    pub fn resident_rooms(&self) -> impl Iterator<Item = (SlotId, &Room)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.resident)
            .map(|(i, s)| (SlotId(i as u32), &s.room))
    }

    /// Number of resident rooms.
    pub fn resident_count(&self) -> usize {
        self.by_coord.len()
    }

    /// Total slots ever allocated, resident or free.
    pub fn pool_size(&self) -> usize {
        self.slots.len()
    }

    fn coord_of(&self, slot: SlotId) -> Option<Coord> {
        match &self.room(slot)?.kind {
            RoomKind::Procedural { grid, .. } => Some(grid.coord),
            RoomKind::Authored(_) => None,
        }
    }

    /// Fresh room content for a cell. Recycled and newly allocated rooms
    /// both come from here.
    fn populate(&self, coord: Coord) -> Room {
        let tile = self.tile_at(coord);
        let mut room = Room::procedural(self.grid_ref(coord));
        room.name = tile.name.clone();
        room.flags = tile.flags.clone();
        room.capacity = tile.capacity;
        room.exits = Direction::COMPASS
            .iter()
            .map(|d| {
                let to = self.grid_ref(coord.step(*d));
                Exit::new(d.name(), Location::Grid(to))
            })
            .collect();
        if let RoomKind::Procedural { embedded, .. } = &mut room.kind {
            *embedded = self.embedded.get(&coord).cloned();
        }
        room
    }

    // -----------------------------------------------------------------------
    // Tracks
    // -----------------------------------------------------------------------

    /// Footprint at a cell, if one was recorded.
    pub fn track_at(&self, coord: Coord) -> Option<&Track> {
        let coord = self.cycle(coord);
        self.tracks.iter().find(|(c, _)| *c == coord).map(|(_, t)| t)
    }

    /// Footprint record for a cell, creating one if the tile holds tracks.
    /// The oldest record is evicted once the region is at its cap.
    pub fn track_mut(&mut self, coord: Coord) -> Option<&mut Track> {
        let coord = self.cycle(coord);
        if !self.tile_at(coord).holds_tracks || self.max_tracks == 0 {
            return None;
        }
        let idx = match self.tracks.iter().position(|(c, _)| *c == coord) {
            Some(idx) => idx,
            None => {
                if self.tracks.len() >= self.max_tracks {
                    self.tracks.pop_front();
                }
                self.tracks.push_back((coord, Track::default()));
                self.tracks.len() - 1
            }
        };
        self.tracks.get_mut(idx).map(|(_, t)| t)
    }

    /// Number of footprint records held.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorId;
    use crate::exit::ExitTarget;
    use crate::room::Item;

    fn tile(symbol: char, name: &str) -> Tile {
        Tile {
            symbol,
            name: name.to_string(),
            water: false,
            road: false,
            fly: Some(0),
            holds_tracks: true,
            flags: BTreeSet::new(),
            capacity: None,
        }
    }

    fn wilds() -> Area {
        let mut water = tile('~', "Lake");
        water.water = true;
        let mut cliff = tile('^', "Cliffs");
        cliff.fly = None;
        let mut rock = tile('#', "Bare Rock");
        rock.holds_tracks = false;
        let def = AreaDef {
            name: "wild".to_string(),
            default_tile: '.',
            tiles: vec![tile('.', "Plains"), tile('=', "Road"), water, cliff, rock],
            terrain: vec![
                "........".to_string(),
                "...=....".to_string(),
                "..~~....".to_string(),
                "......^.".to_string(),
                ".....#^.".to_string(),
                "......^.".to_string(),
            ],
            wrap: Some(Coord::new(20, 20, 0)),
            embedded: vec![EmbeddedRoom {
                at: Coord::new(0, 0, 0),
                room: SymbolicRef::new("town", 1),
            }],
        };
        Area::new(def).unwrap()
    }

    #[test]
    fn unknown_symbols_are_rejected() {
        let def = AreaDef {
            name: "bad".to_string(),
            default_tile: '.',
            tiles: vec![tile('.', "Plains")],
            terrain: vec![".x".to_string()],
            wrap: None,
            embedded: Vec::new(),
        };
        assert!(Area::new(def).is_err());
    }

    #[test]
    fn passability_rules() {
        let area = wilds();
        assert!(area.can_pass(Coord::new(0, 0, 0), 0));
        assert!(!area.can_pass(Coord::new(6, 4, 0), 0));
        assert!(!area.can_pass(Coord::new(6, 4, 0), 255));
        assert!(!area.can_pass(Coord::new(2, 2, 0), 0));
        assert!(area.can_pass(Coord::new(2, 2, 0), 1));
        // Off the map uses the default tile.
        assert_eq!(area.tile_at(Coord::new(-5, 99, 0)).name, "Plains");
    }

    #[test]
    fn coordinates_wrap_past_critical_bounds() {
        let area = wilds();
        assert_eq!(area.cycle(Coord::new(21, 0, 0)), Coord::new(-20, 0, 0));
        assert_eq!(area.cycle(Coord::new(0, -21, 0)), Coord::new(0, 20, 0));
        assert_eq!(area.cycle(Coord::new(0, 0, 7)), Coord::new(0, 0, 7));
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut area = wilds();
        let a = area.get_or_create(Coord::new(3, 1, 0));
        let b = area.get_or_create(Coord::new(3, 1, 0));
        assert_eq!(a, b);
        assert_eq!(area.resident_count(), 1);
        let room = area.room(a).unwrap();
        assert_eq!(room.name, "Road");
        assert_eq!(room.exits.len(), 8);
        assert_eq!(
            room.find_exit("east").unwrap().target,
            ExitTarget::Location(Location::grid("wild", 4, 1, 0))
        );
    }

    #[test]
    fn lookup_only_never_creates() {
        let area = wilds();
        assert!(area.lookup_only(Coord::new(1, 1, 0)).is_none());
        assert_eq!(area.resident_count(), 0);
    }

    #[test]
    fn reclaim_requires_empty_unpinned_room() {
        let mut area = wilds();
        let slot = area.get_or_create(Coord::new(2, 1, 0));
        let who = ActorId::new();
        area.room_mut(slot).unwrap().add_occupant(who);
        assert!(!area.reclaim(slot));

        area.room_mut(slot).unwrap().remove_occupant(who);
        area.room_mut(slot).unwrap().pin();
        assert!(!area.reclaim(slot));

        area.room_mut(slot).unwrap().unpin();
        assert!(area.reclaim(slot));
        assert!(area.lookup_only(Coord::new(2, 1, 0)).is_none());
    }

    #[test]
    fn kept_items_block_reclaim() {
        let mut area = wilds();
        let slot = area.get_or_create(Coord::new(1, 1, 0));
        area.room_mut(slot).unwrap().items.push(Item {
            name: "sword".to_string(),
            disposable: false,
        });
        assert!(!area.is_reclaimable(slot));
        assert_eq!(area.clean_up_rooms(), 0);
    }

    #[test]
    fn embedded_cells_are_not_reclaimable() {
        let mut area = wilds();
        let slot = area.get_or_create(Coord::new(0, 0, 0));
        assert_eq!(
            area.room(slot).unwrap().embedded(),
            Some(&SymbolicRef::new("town", 1))
        );
        assert!(!area.reclaim(slot));
    }

    #[test]
    fn recycle_retargets_in_place() {
        let mut area = wilds();
        let slot = area.get_or_create(Coord::new(2, 2, 0));
        let moved = area.recycle(slot, Coord::new(3, 1, 0)).unwrap();
        assert_eq!(moved, slot);
        assert!(area.lookup_only(Coord::new(2, 2, 0)).is_none());
        assert_eq!(area.get_or_create(Coord::new(3, 1, 0)), slot);
        assert_eq!(area.pool_size(), 1);
        assert_eq!(area.room(slot).unwrap().name, "Road");
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut area = wilds();
        let a = area.get_or_create(Coord::new(1, 1, 0));
        area.reclaim(a);
        let b = area.get_or_create(Coord::new(5, 5, 0));
        assert_eq!(a, b);
        assert_eq!(area.pool_size(), 1);
    }

    #[test]
    fn tracks_are_capped_and_skip_bare_rock() {
        let mut area = wilds();
        area.set_max_tracks(2);
        assert!(area.track_mut(Coord::new(5, 4, 0)).is_none());
        for x in 0..3 {
            area.track_mut(Coord::new(x, 0, 0)).unwrap().reset("north");
        }
        assert_eq!(area.track_count(), 2);
        assert!(area.track_at(Coord::new(0, 0, 0)).is_none());
        assert!(area.track_at(Coord::new(2, 0, 0)).is_some());
    }

    proptest::proptest! {
        #[test]
        fn single_steps_stay_inside_wrap_bounds(
            x in -20i32..=20,
            y in -20i32..=20,
            dx in -1i32..=1,
            dy in -1i32..=1,
        ) {
            let area = wilds();
            let next = area.cycle(Coord::new(x + dx, y + dy, 0));
            proptest::prop_assert!((-20..=20).contains(&next.x));
            proptest::prop_assert!((-20..=20).contains(&next.y));
        }

        #[test]
        fn one_live_room_per_coordinate(x in 1i32..8, y in 1i32..6) {
            let mut area = wilds();
            let first = area.get_or_create(Coord::new(x, y, 0));
            let again = area.get_or_create(Coord::new(x, y, 0));
            proptest::prop_assert_eq!(first, again);
            proptest::prop_assert_eq!(area.pool_size(), 1);
        }
    }
}
