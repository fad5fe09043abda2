//! The movement transaction.
//!
//! A move is driven by one commander through one exit. Everything that can
//! refuse the commander is checked before any state changes: actor state,
//! the exit, resolution of the destination, entry rules and capacity. Only
//! then do hazards roll and rooms materialize. Dependents (pets, group
//! followers, pursuing monsters) are re-checked one by one against the
//! destination the commander resolved; a dependent that fails stays behind
//! without affecting anyone else.
//!
//! Procedural rooms are pinned while a transaction needs them and the
//! source room is recycled into the destination cell when the last mover
//! leaves it empty.

use tracing::{debug, info, warn};
use wf_core::{
    Actor, ActorFlag, ActorId, ActorKind, Condition, Coord, Exit, ExitFlag, Location, Room,
    RoomDef, RoomFlag, RoomKey, SymbolicRef,
};

use crate::engine::Engine;
use crate::error::{EngineResult, MoveError, Unresolved};
use crate::event::{Audience, NavEventKind};
use crate::gate::{self, RoomFacts, Traverse};
use crate::hazard::{Hazard, HazardOutcome};
use crate::resolver;
use crate::tracks;
use crate::zone::ZoneKind;

/// How a move ended for the commander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    /// The commander and every dependent arrived.
    Completed,
    /// The commander arrived; some dependents did not.
    Partial,
    /// The commander was killed on the way.
    Died,
}

/// Result of a movement transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// How the move ended.
    pub status: MoveStatus,
    /// Where the party went. `None` if the commander died.
    pub destination: Option<Location>,
    /// Everyone who arrived, commander first.
    pub moved: Vec<ActorId>,
    /// Dependents that could not follow, with the reason.
    pub omitted: Vec<(ActorId, MoveError)>,
    /// Actors killed by hazards on the way.
    pub died: Vec<ActorId>,
    /// The departure went unnoticed.
    pub sneaked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Walk,
    Sneak,
}

/// Destination of a transaction before and after materialization.
#[derive(Debug, Clone)]
enum Dest {
    Resident(RoomKey),
    /// Authored room not loaded yet.
    Unloaded(SymbolicRef, RoomDef),
    /// Procedural cell not materialized yet.
    Pending { region: String, coord: Coord },
}

#[derive(Debug)]
struct Transaction {
    commander: ActorId,
    /// The room movers leave. Cleared once it has been recycled or reclaimed.
    source: Option<RoomKey>,
    source_loc: Location,
    permanent_tracks: bool,
    underwater: bool,
    /// The crossed exit, as it stands after any automatic opening. `None`
    /// for teleports.
    exit: Option<Exit>,
    leader_bound: Option<Location>,
    dest_loc: Location,
    dest: Dest,
    facts: RoomFacts,
    admitted: u32,
    pinned: Option<RoomKey>,
    sneaked: bool,
    moved: Vec<ActorId>,
    omitted: Vec<(ActorId, MoveError)>,
    died: Vec<ActorId>,
}

impl Engine {
    /// Move an actor, with everyone following it, through a named exit.
    pub fn go(&mut self, actor: ActorId, exit: &str) -> EngineResult<MoveOutcome> {
        self.walk(actor, exit, Mode::Walk)
    }

    /// Like [`Engine::go`], but the departure may go unnoticed. Group
    /// followers stay behind and pursuers lose the trail on success.
    pub fn sneak(&mut self, actor: ActorId, exit: &str) -> EngineResult<MoveOutcome> {
        self.walk(actor, exit, Mode::Sneak)
    }

    /// Move a single actor straight to a location, subject to the teleport
    /// distance rule. Nobody follows.
    pub fn teleport(&mut self, actor: ActorId, target: &Location) -> EngineResult<MoveOutcome> {
        let bypass = self.config.staff_bypass;
        let a = self.world.try_actor(actor)?.clone();
        let source = self.source_of(&a)?;
        gate::can_depart(&a, false, bypass).inspect_err(|e| refused(actor, e))?;

        let dest_loc = resolver::resolve_location(&self.world, target, &a)
            .inspect_err(|e| refused(actor, e))?;
        gate::check_builder(&a, &dest_loc).inspect_err(|e| refused(actor, e))?;
        let (dest, facts) = self.plan(&dest_loc).inspect_err(|e| refused(actor, e))?;
        let source_loc = self
            .world
            .room(&source)
            .map(Room::location)
            .unwrap_or_else(|| dest_loc.clone());
        if !(bypass && a.is_staff()) {
            gate::check_distance(
                self.zones.as_ref(),
                &source_loc,
                &dest_loc,
                ZoneKind::Teleport,
                &facts,
            )
            .inspect_err(|e| refused(actor, e))?;
        }
        gate::can_enter_room(&a, &facts, bypass).inspect_err(|e| refused(actor, e))?;
        let mut admitted = 0;
        gate::admit(&a, &facts, &mut admitted).inspect_err(|e| refused(actor, e))?;

        let mut txn = self.begin(&a, source, None, dest_loc, dest, facts, admitted);
        self.materialize(&mut txn)?;
        self.depart(&mut txn, actor, false)?;
        self.arrive(txn)
    }

    fn walk(&mut self, actor: ActorId, exit_name: &str, mode: Mode) -> EngineResult<MoveOutcome> {
        let bypass = self.config.staff_bypass;
        let a = self.world.try_actor(actor)?.clone();
        let source = self.source_of(&a)?;
        gate::can_depart(&a, mode == Mode::Sneak, bypass).inspect_err(|e| refused(actor, e))?;

        let room = self
            .world
            .room(&source)
            .ok_or_else(|| MoveError::Restricted("You are nowhere.".into()))?;
        let mut exit = room
            .find_exit(exit_name)
            .cloned()
            .ok_or_else(|| MoveError::NoSuchExit(exit_name.to_string()))
            .inspect_err(|e| refused(actor, e))?;
        // Closed but unlocked exits open on the way through.
        let auto_open = exit.is(ExitFlag::Closed) && !exit.is(ExitFlag::Locked);
        if auto_open {
            exit.clear(ExitFlag::Closed);
        }

        let hazards = gate::can_traverse(&self.world, &a, room, &exit, &Traverse::leader(bypass))
            .inspect_err(|e| refused(actor, e))?;
        let dest_loc = resolver::resolve(&self.world, &exit.target, &a)
            .inspect_err(|e| refused(actor, e))?;
        gate::check_builder(&a, &dest_loc).inspect_err(|e| refused(actor, e))?;
        let (dest, facts) = self.plan(&dest_loc).inspect_err(|e| refused(actor, e))?;
        gate::can_enter_room(&a, &facts, bypass).inspect_err(|e| refused(actor, e))?;
        let mut admitted = 0;
        gate::admit(&a, &facts, &mut admitted).inspect_err(|e| refused(actor, e))?;

        // Dependents are taken from the source as it stood before anyone left.
        let snapshot: Vec<ActorId> = room.occupants().to_vec();
        let pets = self.pets_in(&a, &snapshot);
        let followers: Vec<ActorId> = match mode {
            Mode::Sneak => Vec::new(),
            Mode::Walk => self
                .world
                .group_of(actor)
                .filter(|g| g.leader == actor)
                .map(|g| g.followers())
                .unwrap_or_default()
                .into_iter()
                .filter(|id| *id != actor && snapshot.contains(id))
                .collect(),
        };
        let pursuers: Vec<ActorId> = snapshot
            .iter()
            .copied()
            .filter(|id| *id != actor)
            .filter(|id| {
                self.world.actor(*id).is_some_and(|m| {
                    m.kind == ActorKind::Monster
                        && m.master.is_none()
                        && m.flagged(ActorFlag::FollowAttacker)
                        && m.current_target() == Some(actor)
                })
            })
            .collect();

        let mut txn = self.begin(&a, source, Some(exit), dest_loc, dest, facts, admitted);
        if !self.survive(&mut txn, actor, &hazards)? {
            return Ok(MoveOutcome {
                status: MoveStatus::Died,
                destination: None,
                moved: Vec::new(),
                omitted: Vec::new(),
                died: txn.died,
                sneaked: false,
            });
        }

        self.materialize(&mut txn)?;
        if auto_open {
            self.open_on_the_way(&txn, actor)?;
        }
        self.depart(&mut txn, actor, mode == Mode::Sneak)?;

        for pet in pets {
            self.follow(&mut txn, pet)?;
        }
        for member in followers {
            if self.follow(&mut txn, member)? {
                let member_pets = match self.world.actor(member) {
                    Some(m) => self.pets_in(m, &snapshot),
                    None => Vec::new(),
                };
                for pet in member_pets {
                    self.follow(&mut txn, pet)?;
                }
            }
        }
        if !txn.sneaked {
            for monster in pursuers {
                self.pursue(&mut txn, monster)?;
            }
        }
        self.arrive(txn)
    }

    // -----------------------------------------------------------------------
    // Planning
    // -----------------------------------------------------------------------

    fn source_of(&self, actor: &Actor) -> Result<RoomKey, MoveError> {
        if let Some(key) = self.world.room_of(actor.id) {
            return Ok(key);
        }
        if let Some(at) = &actor.location {
            warn!(actor = %actor.id, at = %at, "actor is in a room that is not resident");
        }
        Err(MoveError::Restricted("You are nowhere.".into()))
    }

    /// Work out what the destination will be without changing anything.
    fn plan(&self, dest_loc: &Location) -> Result<(Dest, RoomFacts), MoveError> {
        if let Some(key) = self.world.room_key_of(dest_loc) {
            let facts = self
                .world
                .room(&key)
                .map(|r| RoomFacts::of_room(&self.world, r))
                .unwrap_or_default();
            return Ok((Dest::Resident(key), facts));
        }
        match dest_loc {
            Location::Symbolic(s) => {
                let def = self
                    .store
                    .load(s)
                    .ok_or_else(|| MoveError::Unresolvable(Unresolved::NoRoom(s.clone())))?;
                let facts = RoomFacts::of_def(&def);
                Ok((Dest::Unloaded(s.clone(), def), facts))
            }
            Location::Grid(g) => {
                let facts = self.facts_of_unloaded(dest_loc)?;
                let dest = Dest::Pending {
                    region: g.region.clone(),
                    coord: g.coord,
                };
                Ok((dest, facts))
            }
        }
    }

    fn pets_in(&self, owner: &Actor, snapshot: &[ActorId]) -> Vec<ActorId> {
        owner
            .pets
            .iter()
            .copied()
            .filter(|p| snapshot.contains(p))
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn begin(
        &self,
        commander: &Actor,
        source: RoomKey,
        exit: Option<Exit>,
        dest_loc: Location,
        dest: Dest,
        facts: RoomFacts,
        admitted: u32,
    ) -> Transaction {
        let room = self.world.room(&source);
        Transaction {
            commander: commander.id,
            source_loc: room.map(Room::location).unwrap_or_else(|| dest_loc.clone()),
            permanent_tracks: room.is_some_and(|r| r.has(RoomFlag::PermanentTracks)),
            underwater: room.is_some_and(|r| r.has(RoomFlag::Underwater)),
            source: Some(source),
            exit,
            leader_bound: commander.bound.clone(),
            dest_loc,
            dest,
            facts,
            admitted,
            pinned: None,
            sneaked: false,
            moved: Vec::new(),
            omitted: Vec::new(),
            died: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Roll hazards for one mover. Returns `false` if it died.
    fn survive(
        &mut self,
        txn: &mut Transaction,
        actor: ActorId,
        hazards: &[Hazard],
    ) -> EngineResult<bool> {
        for hazard in hazards {
            let a = self.world.try_actor(actor)?;
            let outcome = hazard.resolve(a, self.dice.as_mut());
            let name = a.name.clone();
            let damage = match outcome {
                HazardOutcome::Safe => continue,
                HazardOutcome::Hurt { damage } | HazardOutcome::Fatal { damage } => damage,
            };
            if let Some(a) = self.world.actor_mut(actor) {
                a.hp -= damage;
            }
            let (kind, line) = match hazard {
                Hazard::Fall { .. } => (
                    NavEventKind::Fell { actor, damage },
                    format!("{name} slips and falls."),
                ),
                Hazard::Wall { kind, .. } => (
                    NavEventKind::WallDamage {
                        actor,
                        wall: *kind,
                        damage,
                    },
                    format!("{name} is hurt passing through {}.", hazard.cause()),
                ),
            };
            self.emit(
                kind,
                Audience::Room {
                    at: txn.source_loc.clone(),
                    exclude: Vec::new(),
                },
                line,
            );
            if matches!(outcome, HazardOutcome::Fatal { .. }) {
                self.kill(txn, actor, hazard.cause())?;
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn kill(&mut self, txn: &mut Transaction, actor: ActorId, cause: &str) -> EngineResult<()> {
        self.world.unplace(actor)?;
        self.scheduler.interrupt(actor);
        let name = match self.world.actor_mut(actor) {
            Some(a) => {
                a.conditions.insert(Condition::Dead);
                a.previous = a.location.take();
                a.name.clone()
            }
            None => return Ok(()),
        };
        info!(actor = %actor, cause, "killed while moving");
        self.emit(
            NavEventKind::Died {
                actor,
                cause: cause.to_string(),
            },
            Audience::Room {
                at: txn.source_loc.clone(),
                exclude: Vec::new(),
            },
            format!("{name} is killed by {cause}!"),
        );
        txn.died.push(actor);
        self.vacated(txn)
    }

    /// Load or create the destination and pin it. A procedural destination
    /// in the source's region is left pending so the source can be reused.
    fn materialize(&mut self, txn: &mut Transaction) -> EngineResult<()> {
        let key = match txn.dest.clone() {
            Dest::Resident(key) => key,
            Dest::Unloaded(at, def) => self.world.insert_authored(Room::authored(at, def))?,
            Dest::Pending { region, coord } => {
                let same_region = matches!(
                    &txn.source,
                    Some(RoomKey::Procedural { region: r, .. }) if *r == region
                );
                if same_region {
                    return Ok(());
                }
                self.create_cell(&region, coord)?
            }
        };
        self.pin(txn, key)
    }

    fn create_cell(&mut self, region: &str, coord: Coord) -> EngineResult<RoomKey> {
        let area = self.world.area_mut(region).ok_or_else(|| {
            MoveError::Unresolvable(Unresolved::NoRegion(region.to_string()))
        })?;
        let slot = area.get_or_create(coord);
        Ok(RoomKey::Procedural {
            region: region.to_string(),
            slot,
        })
    }

    fn pin(&mut self, txn: &mut Transaction, key: RoomKey) -> EngineResult<()> {
        self.world.try_room_mut(&key)?.pin();
        txn.dest = Dest::Resident(key.clone());
        txn.pinned = Some(key);
        Ok(())
    }

    fn open_on_the_way(&mut self, txn: &Transaction, actor: ActorId) -> EngineResult<()> {
        let (Some(source), Some(exit)) = (&txn.source, &txn.exit) else {
            return Ok(());
        };
        let authored = matches!(source, RoomKey::Authored(_));
        let room = self.world.try_room_mut(source)?;
        if let Some(e) = room.exit_mut(&exit.name) {
            e.clear(ExitFlag::Closed);
        }
        if authored {
            room.dirty = true;
        }
        let name = self.world.try_actor(actor)?.name.clone();
        let line = exit
            .open_text
            .clone()
            .unwrap_or_else(|| format!("{name} opens the {}.", exit.name));
        self.emit(
            NavEventKind::ExitOpened {
                actor,
                exit: exit.name.clone(),
            },
            Audience::Room {
                at: txn.source_loc.clone(),
                exclude: Vec::new(),
            },
            line,
        );
        Ok(())
    }

    /// Take one mover out of the source: pay the toll, try to sneak, narrate
    /// and leave. The source is recycled once it empties.
    fn depart(&mut self, txn: &mut Transaction, actor: ActorId, sneaking: bool) -> EngineResult<()> {
        let a = self.world.try_actor(actor)?.clone();
        let bypass = self.config.staff_bypass && a.is_staff();

        if let (Some(exit), Some(source)) = (&txn.exit, &txn.source) {
            let toll = self
                .world
                .room(source)
                .and_then(|room| gate::toll_due(&self.world, &a, room, exit))
                .filter(|_| !bypass);
            if let Some(amount) = toll {
                if let Some(payer) = self.world.actor_mut(actor) {
                    payer.gold = payer.gold.saturating_sub(amount);
                }
                self.emit(
                    NavEventKind::TollPaid { actor, amount },
                    Audience::Actor(actor),
                    format!("You pay a toll of {amount} gold."),
                );
            }
        }

        if sneaking {
            let unseen = bypass
                || a.has(Condition::Mist)
                || self.dice.roll(1, 100) <= a.sneak_chance() as i32;
            txn.sneaked = unseen;
            if !unseen {
                if let Some(a) = self.world.actor_mut(actor) {
                    a.conditions.remove(&Condition::Hidden);
                }
                self.emit(
                    NavEventKind::SneakFailed { actor },
                    Audience::Actor(actor),
                    "You failed to sneak.",
                );
            }
        }
        self.interrupt(actor);

        // Pets of a successful sneak slip away with their master.
        let quiet = txn.sneaked && (actor == txn.commander || a.master == Some(txn.commander));
        let (exit_name, line) = match &txn.exit {
            Some(exit) => (exit.name.clone(), departure_line(&a, exit, txn.underwater)),
            None => (String::new(), format!("{} vanishes.", a.name)),
        };
        let audience = if quiet {
            Audience::Staff {
                at: txn.source_loc.clone(),
            }
        } else {
            Audience::Room {
                at: txn.source_loc.clone(),
                exclude: vec![actor],
            }
        };
        self.emit(
            NavEventKind::Departed {
                actor,
                exit: exit_name,
            },
            audience,
            line,
        );

        self.world.unplace(actor)?;
        if let Some(mover) = self.world.actor_mut(actor) {
            mover.previous = Some(txn.source_loc.clone());
        }
        txn.moved.push(actor);
        self.vacated(txn)
    }

    /// Hook run whenever someone leaves the source. An emptied procedural
    /// source becomes the pending destination if it can; otherwise it is
    /// reclaimed.
    fn vacated(&mut self, txn: &mut Transaction) -> EngineResult<()> {
        let Some(RoomKey::Procedural { region, slot }) = txn.source.clone() else {
            return Ok(());
        };
        let Some(area) = self.world.area_mut(&region) else {
            return Ok(());
        };
        if !area.is_reclaimable(slot) {
            return Ok(());
        }
        match txn.dest.clone() {
            Dest::Pending { region: r, coord } if r == region && !txn.moved.is_empty() => {
                let reused = area.recycle(slot, coord)?;
                debug!(region = %region, from = %slot, to = %reused, "room recycled");
                txn.source = None;
                self.pin(
                    txn,
                    RoomKey::Procedural {
                        region,
                        slot: reused,
                    },
                )
            }
            _ => {
                area.reclaim(slot);
                debug!(region = %region, slot = %slot, "room reclaimed");
                txn.source = None;
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Dependents
    // -----------------------------------------------------------------------

    /// Run every check for a pet or group follower against the commander's
    /// destination. Returns whether it moved.
    fn follow(&mut self, txn: &mut Transaction, actor: ActorId) -> EngineResult<bool> {
        let Some(source) = txn.source.clone() else {
            return Ok(false);
        };
        let Some(a) = self.world.actor(actor).cloned() else {
            return Ok(false);
        };
        if txn.moved.contains(&actor) || self.world.room_of(actor) != Some(source.clone()) {
            return Ok(false);
        }
        let hazards = match self.check_dependent(txn, &a, &source) {
            Ok(hazards) => hazards,
            Err(reason) => {
                debug!(actor = %actor, %reason, "dependent left behind");
                self.emit(
                    NavEventKind::LeftBehind {
                        actor,
                        reason: reason.to_string(),
                    },
                    Audience::Room {
                        at: txn.source_loc.clone(),
                        exclude: Vec::new(),
                    },
                    format!("{} stays behind.", a.name),
                );
                txn.omitted.push((actor, reason));
                return Ok(false);
            }
        };
        if !self.survive(txn, actor, &hazards)? {
            return Ok(false);
        }
        self.depart(txn, actor, false)?;
        Ok(true)
    }

    fn check_dependent(
        &self,
        txn: &mut Transaction,
        actor: &Actor,
        source: &RoomKey,
    ) -> Result<Vec<Hazard>, MoveError> {
        let bypass = self.config.staff_bypass;
        let (Some(exit), Some(room)) = (&txn.exit, self.world.room(source)) else {
            return Err(MoveError::Restricted("You can't follow that way.".into()));
        };
        gate::can_depart(actor, false, bypass)?;
        let ctx = Traverse {
            is_leader: false,
            leader_bound: txn.leader_bound.as_ref(),
            staff_bypass: bypass,
        };
        let hazards = gate::can_traverse(&self.world, actor, room, exit, &ctx)?;
        let dest = resolver::resolve(&self.world, &exit.target, actor)?;
        if dest != txn.dest_loc {
            return Err(MoveError::Blocked("You can't follow that way.".into()));
        }
        gate::check_builder(actor, &dest)?;
        gate::can_enter_room(actor, &txn.facts, bypass)?;
        gate::admit(actor, &txn.facts, &mut txn.admitted)?;
        Ok(hazards)
    }

    /// Monsters chasing the commander follow if they can see it, can take
    /// the exit and win a dexterity contest. Losers simply stay.
    fn pursue(&mut self, txn: &mut Transaction, monster: ActorId) -> EngineResult<()> {
        let Some(source) = txn.source.clone() else {
            return Ok(());
        };
        let (Some(m), Some(target)) = (
            self.world.actor(monster).cloned(),
            self.world.actor(txn.commander).cloned(),
        ) else {
            return Ok(());
        };
        let Some(exit) = txn.exit.clone() else {
            return Ok(());
        };
        if txn.moved.contains(&monster) || self.world.room_of(monster) != Some(source.clone()) {
            return Ok(());
        }
        let aggressive_at_guard = m.flagged(ActorFlag::Aggressive) && exit.is(ExitFlag::PassiveGuard);
        let able = !m.is_incapacitated()
            && !m.is_immobilized()
            && !aggressive_at_guard
            && m.can_see(&target)
            && gate::exit_admits(&m, &exit).is_ok()
            && resolver::resolve(&self.world, &exit.target, &m).as_ref() == Ok(&txn.dest_loc)
            && gate::can_enter_room(&m, &txn.facts, false).is_ok();
        if !able {
            return Ok(());
        }
        let odds = 10 - (target.dexterity / 10) as i32 + (m.dexterity / 10) as i32;
        if self.dice.roll(1, 20) > odds {
            debug!(actor = %monster, "pursuer lost the trail");
            return Ok(());
        }
        let hazards = self
            .world
            .room(&source)
            .map(|room| Hazard::for_crossing(&m, room, &exit))
            .unwrap_or_default();
        if self.survive(txn, monster, &hazards)? {
            self.depart(txn, monster, false)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Arrival
    // -----------------------------------------------------------------------

    fn arrive(&mut self, mut txn: Transaction) -> EngineResult<MoveOutcome> {
        let key = match txn.dest.clone() {
            Dest::Resident(key) => key,
            Dest::Unloaded(at, def) => self.world.insert_authored(Room::authored(at, def))?,
            Dest::Pending { region, coord } => self.create_cell(&region, coord)?,
        };

        for id in &txn.moved {
            self.world.place(*id, &key)?;
            let Some(a) = self.world.actor(*id) else {
                continue;
            };
            let name = a.name.clone();
            let quiet = txn.sneaked && (*id == txn.commander || a.master == Some(txn.commander));
            let line = match &txn.exit {
                Some(_) => format!("{name} has arrived."),
                None => format!("{name} appears."),
            };
            let audience = if quiet {
                Audience::Staff {
                    at: txn.dest_loc.clone(),
                }
            } else {
                Audience::Room {
                    at: txn.dest_loc.clone(),
                    exclude: vec![*id],
                }
            };
            self.emit(
                NavEventKind::Arrived {
                    actor: *id,
                    at: txn.dest_loc.clone(),
                },
                audience,
                line,
            );
            if let Some(text) = txn.exit.as_ref().and_then(|e| e.enter_text.clone()) {
                self.emit(
                    NavEventKind::Entered {
                        actor: *id,
                        text: text.clone(),
                    },
                    Audience::Actor(*id),
                    text,
                );
            }
        }
        if let Some(room) = txn.pinned.take().and_then(|k| self.world.room_mut(&k)) {
            room.unpin();
        }

        if let Some(exit) = &txn.exit {
            if !exit.is_track_exempt() {
                tracks::record(
                    &mut self.world,
                    &txn.source_loc,
                    &exit.name,
                    &txn.moved,
                    txn.permanent_tracks,
                );
            }
            if let Some(portal) = &exit.portal {
                self.consume_portal(&portal.owner);
            }
        }
        // Leaving takes an owner's portal down with it.
        for id in txn.moved.clone() {
            let Some(name) = self.world.actor(id).map(|a| a.name.clone()) else {
                continue;
            };
            let owns_here = txn
                .source
                .as_ref()
                .and_then(|k| self.world.room(k))
                .is_some_and(|r| {
                    r.exits
                        .iter()
                        .any(|e| e.portal.as_ref().is_some_and(|p| p.owner == name))
                });
            if owns_here {
                self.collapse_portal(&name);
            }
        }
        if let Some(source) = &txn.source {
            self.release_if_idle(source);
        }

        let status = if txn.omitted.is_empty() && txn.died.is_empty() {
            MoveStatus::Completed
        } else {
            MoveStatus::Partial
        };
        info!(
            actor = %txn.commander,
            to = %txn.dest_loc,
            moved = txn.moved.len(),
            omitted = txn.omitted.len(),
            "move completed"
        );
        Ok(MoveOutcome {
            status,
            destination: Some(txn.dest_loc),
            moved: txn.moved,
            omitted: txn.omitted,
            died: txn.died,
            sneaked: txn.sneaked,
        })
    }
}

fn refused(actor: ActorId, reason: &MoveError) {
    debug!(actor = %actor, %reason, "move refused");
}

/// What the source room sees when someone leaves.
fn departure_line(actor: &Actor, exit: &Exit, underwater: bool) -> String {
    if exit.is_hidden() {
        return format!("{} slips out of sight.", actor.name);
    }
    let verb = if actor.is_staff() {
        "wandered"
    } else if underwater {
        "swam"
    } else if actor.has(Condition::Fly) {
        "flew"
    } else if actor.has(Condition::Levitate) || actor.has(Condition::Mist) {
        "floated"
    } else {
        "went"
    };
    match exit.name.as_str() {
        "up" | "down" | "out" => format!("{} {verb} {}.", actor.name, exit.name),
        _ => format!("{} {verb} to the {}.", actor.name, exit.name),
    }
}
