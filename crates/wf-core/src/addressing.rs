use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WfError;

/// Address of an authored room: a region name plus an integer identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolicRef {
    /// Region the room belongs to.
    pub region: String,
    /// Identifier within the region.
    pub id: u32,
}

impl SymbolicRef {
    /// Create a symbolic reference.
    pub fn new(region: impl Into<String>, id: u32) -> Self {
        Self {
            region: region.into(),
            id,
        }
    }
}

impl fmt::Display for SymbolicRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.region, self.id)
    }
}

/// A cell within a procedural region.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coord {
    /// West (-) to east (+).
    pub x: i32,
    /// South (-) to north (+).
    pub y: i32,
    /// Down (-) to up (+).
    #[serde(default)]
    pub z: i32,
}

impl Coord {
    /// Create a coordinate.
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The coordinate one step away in `dir`.
    pub fn step(self, dir: Direction) -> Self {
        let (dx, dy, dz) = dir.offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.x, self.y, self.z)
    }
}

/// Address of a procedural room: a region name plus a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridRef {
    /// Region owning the grid.
    pub region: String,
    /// Cell within the region.
    pub coord: Coord,
}

impl GridRef {
    /// Create a grid reference.
    pub fn new(region: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self {
            region: region.into(),
            coord: Coord::new(x, y, z),
        }
    }
}

impl fmt::Display for GridRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.region, self.coord)
    }
}

/// Where something is: exactly one of a symbolic or a grid reference.
///
/// Serialized as text: `"region:id"` for symbolic references and
/// `"region.x.y.z"` for grid references (`z` may be omitted).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Location {
    /// An authored room.
    Symbolic(SymbolicRef),
    /// A procedural room.
    Grid(GridRef),
}

impl Location {
    /// Shorthand for a symbolic location.
    pub fn symbolic(region: impl Into<String>, id: u32) -> Self {
        Self::Symbolic(SymbolicRef::new(region, id))
    }

    /// Shorthand for a grid location.
    pub fn grid(region: impl Into<String>, x: i32, y: i32, z: i32) -> Self {
        Self::Grid(GridRef::new(region, x, y, z))
    }

    /// The region this location belongs to.
    pub fn region(&self) -> &str {
        match self {
            Self::Symbolic(s) => &s.region,
            Self::Grid(g) => &g.region,
        }
    }

    /// Return `true` for grid-addressed locations.
    pub fn is_grid(&self) -> bool {
        matches!(self, Self::Grid(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symbolic(s) => write!(f, "{s}"),
            Self::Grid(g) => write!(f, "{g}"),
        }
    }
}

impl FromStr for Location {
    type Err = WfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || WfError::InvalidLocation(s.to_string());
        let s = s.trim();

        if let Some((region, id)) = s.split_once(':') {
            if region.is_empty() {
                return Err(bad());
            }
            let id = id.parse::<u32>().map_err(|_| bad())?;
            return Ok(Self::symbolic(region, id));
        }

        let parts: Vec<&str> = s.split('.').collect();
        if !(3..=4).contains(&parts.len()) || parts[0].is_empty() {
            return Err(bad());
        }
        let num = |p: &str| p.parse::<i32>().map_err(|_| bad());
        let x = num(parts[1])?;
        let y = num(parts[2])?;
        let z = match parts.get(3) {
            Some(p) => num(p)?,
            None => 0,
        };
        Ok(Self::grid(parts[0], x, y, z))
    }
}

impl TryFrom<String> for Location {
    type Error = WfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Location> for String {
    fn from(value: Location) -> Self {
        value.to_string()
    }
}

/// Compass and vertical directions used by procedural rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward positive y.
    North,
    /// North and east.
    Northeast,
    /// Toward positive x.
    East,
    /// South and east.
    Southeast,
    /// Toward negative y.
    South,
    /// South and west.
    Southwest,
    /// Toward negative x.
    West,
    /// North and west.
    Northwest,
    /// One level up.
    Up,
    /// One level down.
    Down,
}

impl Direction {
    /// The eight compass directions, in the order procedural rooms list them.
    pub const COMPASS: [Direction; 8] = [
        Self::North,
        Self::Northeast,
        Self::East,
        Self::Southeast,
        Self::South,
        Self::Southwest,
        Self::West,
        Self::Northwest,
    ];

    /// Coordinate delta for one step.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::North => (0, 1, 0),
            Self::Northeast => (1, 1, 0),
            Self::East => (1, 0, 0),
            Self::Southeast => (1, -1, 0),
            Self::South => (0, -1, 0),
            Self::Southwest => (-1, -1, 0),
            Self::West => (-1, 0, 0),
            Self::Northwest => (-1, 1, 0),
            Self::Up => (0, 0, 1),
            Self::Down => (0, 0, -1),
        }
    }

    /// Exit name for this direction.
    pub fn name(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::Northeast => "northeast",
            Self::East => "east",
            Self::Southeast => "southeast",
            Self::South => "south",
            Self::Southwest => "southwest",
            Self::West => "west",
            Self::Northwest => "northwest",
            Self::Up => "up",
            Self::Down => "down",
        }
    }

    /// Parse a direction from its name or the usual abbreviation.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "n" | "north" => Some(Self::North),
            "ne" | "northeast" => Some(Self::Northeast),
            "e" | "east" => Some(Self::East),
            "se" | "southeast" => Some(Self::Southeast),
            "s" | "south" => Some(Self::South),
            "sw" | "southwest" => Some(Self::Southwest),
            "w" | "west" => Some(Self::West),
            "nw" | "northwest" => Some(Self::Northwest),
            "u" | "up" => Some(Self::Up),
            "d" | "down" => Some(Self::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
