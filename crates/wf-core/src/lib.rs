//! Core types for Wayfarer: addressing, rooms, exits, actors, and the world arena.
//!
//! This crate defines the navigation graph that the engine operates on. It
//! knows how rooms, exits and actors refer to each other but not the rules
//! for moving between them; those live in `wf-engine`. Every cross-reference
//! is an identifier looked up through the owning [`World`], never a pointer.

/// Actors (players and monsters), their conditions and attributes.
pub mod actor;
/// Symbolic and grid addressing, and compass directions.
pub mod addressing;
/// Procedural regions: terrain, embedded rooms, and the room pool.
pub mod area;
/// Error types used throughout the crate.
pub mod error;
/// Exits, their traits, and traveler-relative targets.
pub mod exit;
/// Adventuring groups.
pub mod group;
/// Rooms (authored and procedural).
pub mod room;
/// Footprints left behind by departing travelers.
pub mod track;
/// The arena that owns rooms, actors, groups and regions.
pub mod world;

/// Re-export actor types.
pub use actor::{Actor, ActorFlag, ActorId, ActorKind, Condition, Role, Size, stat_bonus};
/// Re-export addressing types.
pub use addressing::{Coord, Direction, GridRef, Location, SymbolicRef};
/// Re-export region types.
pub use area::{Area, AreaDef, EmbeddedRoom, SlotId, Tile};
/// Re-export error types.
pub use error::{WfError, WfResult};
/// Re-export exit types.
pub use exit::{Exit, ExitFlag, ExitTarget, Portal, Wall, WallKind};
/// Re-export group types.
pub use group::{Group, GroupId, GroupStatus};
/// Re-export room types.
pub use room::{Item, Room, RoomDef, RoomFlag, RoomKind};
/// Re-export the footprint record.
pub use track::Track;
/// Re-export the world arena.
pub use world::{RoomKey, World};
