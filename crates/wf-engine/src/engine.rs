use tracing::{debug, info};
use wf_core::{ActorId, Location, Room, RoomKey, World};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::dice::{Dice, RngDice};
use crate::error::{EngineResult, MoveError, Unresolved};
use crate::event::{Audience, EventLog, NavEvent, NavEventKind};
use crate::schedule::Scheduler;
use crate::store::{MemoryStore, RoomStore};
use crate::zone::{StaticZones, ZoneDirectory};

/// The navigation engine.
///
/// Owns the world, the room store, the zone directory, the dice, the
/// narration log and the deferred-action queue. Every operation runs to
/// completion on `&mut self`; nothing is shared across threads.
pub struct Engine {
    pub(crate) world: World,
    pub(crate) store: Box<dyn RoomStore>,
    pub(crate) zones: Box<dyn ZoneDirectory>,
    pub(crate) dice: Box<dyn Dice>,
    pub(crate) clock: Clock,
    pub(crate) events: EventLog,
    pub(crate) scheduler: Scheduler,
    pub(crate) config: EngineConfig,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("world", &self.world.name)
            .field("tick", &self.clock.tick())
            .field("actors", &self.world.actor_count())
            .field("events", &self.events.len())
            .field("deferred", &self.scheduler.len())
            .finish()
    }
}

impl Engine {
    /// Create an engine with an empty room store, no zones and seeded dice.
    pub fn new(mut world: World, config: EngineConfig) -> Self {
        for area in world.areas_mut() {
            area.set_max_tracks(config.max_area_tracks);
        }
        Self {
            world,
            store: Box::new(MemoryStore::new()),
            zones: Box::new(StaticZones::new()),
            dice: Box::new(RngDice::seeded(config.seed)),
            clock: Clock::new(),
            events: EventLog::new(config.max_events),
            scheduler: Scheduler::new(),
            config,
        }
    }

    /// Use `store` for authored room content.
    pub fn with_store(mut self, store: impl RoomStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    /// Use `zones` for distance rules.
    pub fn with_zones(mut self, zones: impl ZoneDirectory + 'static) -> Self {
        self.zones = Box::new(zones);
        self
    }

    /// Replace the dice, typically with scripted ones in tests.
    pub fn with_dice(mut self, dice: impl Dice + 'static) -> Self {
        self.dice = Box::new(dice);
        self
    }

    /// The world being navigated.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The world, mutably. Use the engine's operations to move actors.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Narration so far.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// The tick clock.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// The configuration the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pending deferred actions.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub(crate) fn emit(
        &mut self,
        kind: NavEventKind,
        audience: Audience,
        description: impl Into<String>,
    ) {
        let event = NavEvent::new(self.clock.tick(), kind, audience, description);
        self.events.push(event);
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    /// Put an actor into the room at `at`, loading or materializing it.
    /// No movement rules apply.
    pub fn spawn(&mut self, actor: ActorId, at: &Location) -> EngineResult<RoomKey> {
        self.world.try_actor(actor)?;
        let key = self.load_room(at)?;
        self.world.place(actor, &key)?;
        debug!(actor = %actor, at = %at, "actor spawned");
        Ok(key)
    }

    /// Make the room at `at` resident. Grid cells holding an embedded room
    /// load that room instead.
    pub(crate) fn load_room(&mut self, at: &Location) -> EngineResult<RoomKey> {
        if let Some(key) = self.world.room_key_of(at) {
            return Ok(key);
        }
        match at {
            Location::Symbolic(s) => {
                let def = self
                    .store
                    .load(s)
                    .ok_or_else(|| MoveError::Unresolvable(Unresolved::NoRoom(s.clone())))?;
                debug!(room = %s, "authored room loaded");
                Ok(self.world.insert_authored(Room::authored(s.clone(), def))?)
            }
            Location::Grid(g) => {
                let area = self.world.area_mut(&g.region).ok_or_else(|| {
                    MoveError::Unresolvable(Unresolved::NoRegion(g.region.clone()))
                })?;
                if let Some(embedded) = area.embedded_at(g.coord).cloned() {
                    return self.load_room(&Location::Symbolic(embedded));
                }
                let slot = area.get_or_create(g.coord);
                Ok(RoomKey::Procedural {
                    region: g.region.clone(),
                    slot,
                })
            }
        }
    }

    /// Look at the room at a location without loading anything.
    pub fn peek(&self, at: &Location) -> Option<&Room> {
        let key = self.world.room_key_of(at)?;
        self.world.room(&key)
    }

    /// The resident room an exit of the actor's room leads to, if any. Never
    /// materializes the destination.
    pub fn peek_exit(&self, actor: ActorId, exit: &str) -> EngineResult<Option<&Room>> {
        let a = self.world.try_actor(actor)?;
        let here = self
            .world
            .room_of(actor)
            .and_then(|k| self.world.room(&k))
            .ok_or_else(|| MoveError::Restricted("You are nowhere.".into()))?;
        let exit = here
            .find_exit(exit)
            .ok_or_else(|| MoveError::NoSuchExit(exit.to_string()))?;
        let target = crate::resolver::resolve(&self.world, &exit.target, a)?;
        Ok(self.peek(&target))
    }

    /// Release an authored room nobody needs any more.
    pub(crate) fn release_if_idle(&mut self, key: &RoomKey) -> bool {
        let RoomKey::Authored(at) = key else {
            return false;
        };
        let idle = self.world.room(key).is_some_and(|r| {
            r.is_empty()
                && r.pins() == 0
                && (!r.dirty || self.store.load(at).is_some_and(|def| r.matches_def(&def)))
        });
        if idle {
            self.world.release_authored(at);
            debug!(room = %at, "authored room released");
        }
        idle
    }

    /// Reclaim a procedural room, or release an authored one, if idle.
    pub(crate) fn tidy(&mut self, key: &RoomKey) -> bool {
        match key {
            RoomKey::Procedural { region, slot } => self
                .world
                .area_mut(region)
                .is_some_and(|area| area.reclaim(*slot)),
            RoomKey::Authored(_) => self.release_if_idle(key),
        }
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Drop an actor's deferred actions, telling it if any were cancelled.
    pub fn interrupt(&mut self, actor: ActorId) -> usize {
        let dropped = self.scheduler.interrupt(actor);
        if dropped > 0 {
            self.emit(
                NavEventKind::TrackSearchInterrupted { actor },
                Audience::Actor(actor),
                "You stop searching for tracks.",
            );
        }
        dropped
    }

    /// Advance one tick: fire due deferred actions, then sweep idle rooms.
    pub fn tick(&mut self) -> EngineResult<()> {
        let now = self.clock.advance();
        for deferred in self.scheduler.take_due(now) {
            self.fire(deferred);
        }

        let reclaimed: usize = self.world.areas_mut().map(|a| a.clean_up_rooms()).sum();
        let idle: Vec<RoomKey> = self
            .world
            .resident_rooms()
            .into_iter()
            .filter(|(k, _)| matches!(k, RoomKey::Authored(_)))
            .map(|(k, _)| k)
            .collect();
        let released = idle.iter().filter(|k| self.release_if_idle(k)).count();
        if reclaimed + released > 0 {
            info!(tick = now, reclaimed, released, "rooms swept");
        }
        Ok(())
    }

    /// Advance `n` ticks.
    pub fn run(&mut self, n: u64) -> EngineResult<()> {
        for _ in 0..n {
            self.tick()?;
        }
        Ok(())
    }
}
