//! Movement engine for Wayfarer worlds.
//!
//! Runs movement transactions on a [`wf_core::World`]: resolving exits,
//! applying the policy gate, materializing and recycling procedural rooms,
//! moving parties and recording footprints. Authored room content comes
//! from a [`RoomStore`]; distance rules consult a [`ZoneDirectory`]; every
//! chance roll goes through [`Dice`] so runs are reproducible.

/// Tick counter.
pub mod clock;
/// Engine configuration.
pub mod config;
/// Randomness behind every chance roll.
pub mod dice;
/// Opening, closing, locking and unlocking exits.
pub mod doors;
/// The engine itself: rooms, time and narration.
pub mod engine;
/// Error types for the engine crate.
pub mod error;
/// Narration events and the event log.
pub mod event;
/// Read-only admissibility checks.
pub mod gate;
/// Falls and magical walls.
pub mod hazard;
/// JSON world files.
pub mod loader;
/// The multi-actor movement transaction.
pub mod movement;
/// Temporary portal pairs.
pub mod portal;
/// Exit target resolution.
pub mod resolver;
/// Deferred actions.
pub mod schedule;
/// Authored room content.
pub mod store;
/// Footprint recording and searching.
pub mod tracks;
/// Zone tags for distance rules.
pub mod zone;

/// Re-export of [`clock::Clock`].
pub use clock::Clock;
/// Re-export of [`config::EngineConfig`].
pub use config::EngineConfig;
/// Re-exports of [`dice::Dice`], [`dice::RngDice`] and [`dice::ScriptedDice`].
pub use dice::{Dice, RngDice, ScriptedDice};
/// Re-export of [`engine::Engine`].
pub use engine::Engine;
/// Re-exports of the engine error types.
pub use error::{EngineError, EngineResult, MoveError, Unresolved};
/// Re-exports of [`event::EventLog`], [`event::NavEvent`], [`event::NavEventKind`] and [`event::Audience`].
pub use event::{Audience, EventLog, NavEvent, NavEventKind};
/// Re-exports of [`hazard::Hazard`] and [`hazard::HazardOutcome`].
pub use hazard::{Hazard, HazardOutcome};
/// Re-export of [`loader::WorldFile`].
pub use loader::WorldFile;
/// Re-exports of [`movement::MoveOutcome`] and [`movement::MoveStatus`].
pub use movement::{MoveOutcome, MoveStatus};
/// Re-exports of [`schedule::Scheduler`] and [`schedule::Deferred`].
pub use schedule::{Deferred, DeferredKind, Scheduler};
/// Re-exports of [`store::RoomStore`] and [`store::MemoryStore`].
pub use store::{MemoryStore, RoomStore};
/// Re-exports of [`tracks::TrackSearch`] and [`tracks::TrackFinding`].
pub use tracks::{TrackFinding, TrackSearch};
/// Re-exports of [`zone::ZoneDirectory`], [`zone::StaticZones`] and [`zone::ZoneKind`].
pub use zone::{StaticZones, ZoneDirectory, ZoneKind};
