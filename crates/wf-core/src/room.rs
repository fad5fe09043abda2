use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::actor::ActorId;
use crate::addressing::{Direction, GridRef, Location, SymbolicRef};
use crate::exit::Exit;

/// Boolean room traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomFlag {
    /// Footprints here are never overwritten.
    PermanentTracks,
    /// Nobody may teleport or open portals into it.
    Jail,
    /// Outside the world; unreachable by teleport or portal.
    Limbo,
    /// Travelers swim rather than walk.
    Underwater,
    /// Every climb out of this room counts as difficult.
    DifficultToMove,
    /// Mist-form actors cannot enter.
    DisperseMist,
    /// Large enough that searching it for tracks takes time.
    Vast,
}

/// Something lying on the floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item name.
    pub name: String,
    /// Disposable items vanish with the room that holds them.
    #[serde(default)]
    pub disposable: bool,
}

/// Authored content for a room, as handed out by a room store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDef {
    /// Room name.
    pub name: String,
    /// Exits in listing order.
    #[serde(default)]
    pub exits: Vec<Exit>,
    /// Room traits.
    #[serde(default)]
    pub flags: BTreeSet<RoomFlag>,
    /// Maximum number of players admitted.
    #[serde(default)]
    pub capacity: Option<u32>,
    /// Lowest level allowed in.
    #[serde(default)]
    pub min_level: Option<u32>,
    /// Highest level allowed in.
    #[serde(default)]
    pub max_level: Option<u32>,
    /// Items lying on the floor.
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Which addressing scheme a live room belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomKind {
    /// Keyed by its symbolic reference.
    Authored(SymbolicRef),
    /// Materialized from terrain.
    Procedural {
        /// The cell this room currently represents.
        grid: GridRef,
        /// Authored room permanently embedded at this cell, if any.
        embedded: Option<SymbolicRef>,
    },
}

/// A live room.
#[derive(Debug, Clone)]
pub struct Room {
    /// Room name.
    pub name: String,
    /// Authored or procedural, with the address.
    pub kind: RoomKind,
    /// Exits in listing order. Open and locked state changes at runtime.
    pub exits: Vec<Exit>,
    /// Room traits.
    pub flags: BTreeSet<RoomFlag>,
    /// Maximum number of players admitted.
    pub capacity: Option<u32>,
    /// Lowest level allowed in.
    pub min_level: Option<u32>,
    /// Highest level allowed in.
    pub max_level: Option<u32>,
    /// Items lying on the floor.
    pub items: Vec<Item>,
    /// Set once runtime state diverges from the authored content.
    pub dirty: bool,
    occupants: Vec<ActorId>,
    pins: u32,
}

impl Room {
    /// Instantiate an authored room.
    pub fn authored(at: SymbolicRef, def: RoomDef) -> Self {
        Self {
            name: def.name,
            kind: RoomKind::Authored(at),
            exits: def.exits,
            flags: def.flags,
            capacity: def.capacity,
            min_level: def.min_level,
            max_level: def.max_level,
            items: def.items,
            dirty: false,
            occupants: Vec::new(),
            pins: 0,
        }
    }

    /// An empty procedural room at `grid`. Regions fill in the rest.
    pub fn procedural(grid: GridRef) -> Self {
        Self {
            name: String::new(),
            kind: RoomKind::Procedural {
                grid,
                embedded: None,
            },
            exits: Vec::new(),
            flags: BTreeSet::new(),
            capacity: None,
            min_level: None,
            max_level: None,
            items: Vec::new(),
            dirty: false,
            occupants: Vec::new(),
            pins: 0,
        }
    }

    /// The address this room currently represents.
    pub fn location(&self) -> Location {
        match &self.kind {
            RoomKind::Authored(s) => Location::Symbolic(s.clone()),
            RoomKind::Procedural { grid, .. } => Location::Grid(grid.clone()),
        }
    }

    /// Whether the runtime exits and floor items are exactly the authored ones.
    pub fn matches_def(&self, def: &RoomDef) -> bool {
        self.exits == def.exits && self.items == def.items
    }

    /// Return `true` for rooms materialized from terrain.
    pub fn is_procedural(&self) -> bool {
        matches!(self.kind, RoomKind::Procedural { .. })
    }

    /// Authored room embedded at this cell, for procedural rooms.
    pub fn embedded(&self) -> Option<&SymbolicRef> {
        match &self.kind {
            RoomKind::Procedural { embedded, .. } => embedded.as_ref(),
            RoomKind::Authored(_) => None,
        }
    }

    /// Whether the room carries `flag`.
    pub fn has(&self, flag: RoomFlag) -> bool {
        self.flags.contains(&flag)
    }

    // -----------------------------------------------------------------------
    // Occupants
    // -----------------------------------------------------------------------

    /// Occupants in arrival order.
    pub fn occupants(&self) -> &[ActorId] {
        &self.occupants
    }

    /// Whether `id` is here.
    pub fn contains(&self, id: ActorId) -> bool {
        self.occupants.contains(&id)
    }

    /// Whether nobody is here.
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    /// Add an occupant. Adding an actor twice is a no-op.
    pub fn add_occupant(&mut self, id: ActorId) {
        if !self.occupants.contains(&id) {
            self.occupants.push(id);
        }
    }

    /// Remove an occupant, returning whether it was present.
    pub fn remove_occupant(&mut self, id: ActorId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|o| *o != id);
        before != self.occupants.len()
    }

    // -----------------------------------------------------------------------
    // Pinning
    // -----------------------------------------------------------------------

    /// How many in-flight transactions hold this room.
    pub fn pins(&self) -> u32 {
        self.pins
    }

    /// Keep the room resident until the matching [`Room::unpin`].
    pub fn pin(&mut self) {
        self.pins += 1;
    }

    /// Release one pin. Never goes below zero.
    pub fn unpin(&mut self) {
        self.pins = self.pins.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Exits
    // -----------------------------------------------------------------------

    /// Find an exit by name. Exact matches win over prefix matches.
    pub fn find_exit(&self, name: &str) -> Option<&Exit> {
        self.exit_index(name).map(|i| &self.exits[i])
    }

    /// Find an exit by name, mutably.
    pub fn exit_mut(&mut self, name: &str) -> Option<&mut Exit> {
        self.exit_index(name).map(move |i| &mut self.exits[i])
    }

    fn exit_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        if wanted.is_empty() {
            return None;
        }
        // Abbreviated directions ("ne") are expanded first.
        let wanted = Direction::parse(&wanted)
            .map(|d| d.name().to_string())
            .unwrap_or(wanted);
        self.exits
            .iter()
            .position(|e| e.name.to_lowercase() == wanted)
            .or_else(|| {
                self.exits
                    .iter()
                    .position(|e| e.name.to_lowercase().starts_with(&wanted))
            })
    }

    /// Whether the exit list is exactly the eight plain compass exits a
    /// region gives its procedural rooms.
    pub fn has_standard_exits(&self) -> bool {
        self.exits.len() == Direction::COMPASS.len()
            && self
                .exits
                .iter()
                .zip(Direction::COMPASS)
                .all(|(e, d)| e.name == d.name() && e.flags.is_empty() && e.portal.is_none())
    }
}
