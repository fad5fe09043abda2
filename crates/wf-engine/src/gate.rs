//! Admissibility checks run before anything moves.
//!
//! Every function here is read-only. Checks that depend on dice (hazards)
//! are returned as [`Hazard`] values for the caller to roll.

use std::collections::BTreeSet;

use wf_core::{
    Actor, ActorFlag, ActorKind, Condition, Exit, ExitFlag, ExitTarget, Location, Role, Room,
    RoomDef, RoomFlag, Tile, World,
};

use crate::error::MoveError;
use crate::hazard::Hazard;
use crate::zone::{ZoneDirectory, ZoneKind};

/// Actor-state checks unrelated to any exit.
pub fn can_depart(actor: &Actor, sneaking: bool, staff_bypass: bool) -> Result<(), MoveError> {
    if actor.is_incapacitated() {
        return Err(MoveError::Restricted(
            "You are in no condition to move.".into(),
        ));
    }
    if staff_bypass && actor.is_staff() {
        return Ok(());
    }
    if actor.is_immobilized() {
        return Err(MoveError::Restricted("You are held in place.".into()));
    }
    if actor.has(Condition::Busy) {
        return Err(MoveError::Restricted("You are too busy to move.".into()));
    }
    if actor.has(Condition::Sitting) {
        return Err(MoveError::Restricted("You must stand up first.".into()));
    }
    if actor.is_overloaded() {
        return Err(MoveError::Restricted(
            "You are carrying too much to move.".into(),
        ));
    }
    if sneaking && !actor.has(Condition::Mist) {
        if actor.skill("sneak") == 0 {
            return Err(MoveError::Restricted("You don't know how to sneak.".into()));
        }
        if !actor.has(Condition::Hidden) {
            return Err(MoveError::Restricted("You need to hide first.".into()));
        }
    }
    Ok(())
}

/// Context for an exit check.
#[derive(Debug, Clone, Copy)]
pub struct Traverse<'a> {
    /// The actor is the commander of the move.
    pub is_leader: bool,
    /// Bound location of the commander, for followers through bound exits.
    pub leader_bound: Option<&'a Location>,
    /// Staff may skip level, closed-room and capacity checks.
    pub staff_bypass: bool,
}

impl Traverse<'_> {
    /// Context for the commander of a move.
    pub fn leader(staff_bypass: bool) -> Self {
        Self {
            is_leader: true,
            leader_bound: None,
            staff_bypass,
        }
    }
}

/// Exit-specific checks. On success, returns the hazards the actor must
/// survive on the way through.
pub fn can_traverse(
    world: &World,
    actor: &Actor,
    room: &Room,
    exit: &Exit,
    ctx: &Traverse<'_>,
) -> Result<Vec<Hazard>, MoveError> {
    if ctx.staff_bypass && actor.is_staff() {
        return Ok(Vec::new());
    }
    exit_admits(actor, exit)?;

    if let Some(amount) = toll_due(world, actor, room, exit).filter(|t| actor.gold < *t) {
        return Err(MoveError::Blocked(format!(
            "You must pay a toll of {amount} gold to pass."
        )));
    }
    if let Some(guard) = guard_for(world, actor, room, exit) {
        return Err(MoveError::Blocked(format!("{} blocks your exit.", guard.name)));
    }
    if !ctx.is_leader && exit.target == ExitTarget::Bound && ctx.leader_bound != actor.bound.as_ref()
    {
        return Err(MoveError::Blocked(
            "You are bound to a different place.".into(),
        ));
    }
    Ok(Hazard::for_crossing(actor, room, exit))
}

/// Restrictions carried by the exit itself.
pub fn exit_admits(actor: &Actor, exit: &Exit) -> Result<(), MoveError> {
    let blocked = |msg: String| Err(MoveError::Blocked(msg));
    if exit.is(ExitFlag::LookOnly) {
        return blocked("You can only look through there.".into());
    }
    if exit.is(ExitFlag::StaffOnly) {
        return blocked("Only staff may go that way.".into());
    }
    if exit.is(ExitFlag::Locked) {
        return blocked(format!("The {} is locked.", exit.name));
    }
    if exit.is(ExitFlag::Closed) {
        return blocked(format!("The {} is closed.", exit.name));
    }
    if exit.is(ExitFlag::NoMonsters) && actor.kind == ActorKind::Monster {
        return blocked("Creatures cannot go that way.".into());
    }
    if exit.is(ExitFlag::NoMist) && actor.has(Condition::Mist) {
        return blocked("You cannot pass through there in mist form.".into());
    }
    if exit.is(ExitFlag::NeedsFly) && !actor.has(Condition::Fly) {
        return blocked("You must fly to get there.".into());
    }
    if exit.max_size.is_some_and(|max| actor.size > max) {
        return blocked("You are too big to fit through there.".into());
    }
    if actor.is_player() {
        if let Some(min) = exit.min_level.filter(|min| actor.level < *min) {
            return blocked(format!("You must be at least level {min} to go that way."));
        }
        if let Some(max) = exit.max_level.filter(|max| actor.level > *max) {
            return blocked(format!("Only those of level {max} or less may go that way."));
        }
    }
    Ok(())
}

/// Toll owed to pass, if a tollkeeper is present to collect it.
pub fn toll_due(world: &World, actor: &Actor, room: &Room, exit: &Exit) -> Option<u64> {
    if !exit.is(ExitFlag::TollToPass) || exit.toll == 0 || !actor.is_player() {
        return None;
    }
    occupants(world, room)
        .any(|a| a.flagged(ActorFlag::Tollkeeper) && !a.is_incapacitated())
        .then_some(exit.toll)
}

/// A monster in the room that refuses to let `actor` through `exit`.
pub fn guard_for<'w>(
    world: &'w World,
    actor: &Actor,
    room: &Room,
    exit: &Exit,
) -> Option<&'w Actor> {
    occupants(world, room).find(|m| {
        m.id != actor.id
            && m.kind == ActorKind::Monster
            && m.master.is_none()
            && !m.is_incapacitated()
            && m.can_see(actor)
            && ((m.flagged(ActorFlag::BlockExit) && m.is_enemy(actor.id))
                || (exit.is(ExitFlag::PassiveGuard)
                    && m.flagged(ActorFlag::PassiveExitGuard)
                    && actor.is_player()))
    })
}

fn occupants<'w>(world: &'w World, room: &Room) -> impl Iterator<Item = &'w Actor> {
    room.occupants()
        .iter()
        .filter_map(move |id| world.actor(*id))
}

// ---------------------------------------------------------------------------
// Destination checks
// ---------------------------------------------------------------------------

/// What the gate needs to know about a destination, whether or not the
/// room is resident yet.
#[derive(Debug, Clone, Default)]
pub struct RoomFacts {
    /// Display name.
    pub name: String,
    /// Most players allowed inside at once.
    pub capacity: Option<u32>,
    /// Room flags.
    pub flags: BTreeSet<RoomFlag>,
    /// Lowest level allowed in.
    pub min_level: Option<u32>,
    /// Highest level allowed in.
    pub max_level: Option<u32>,
    /// Players already inside who count toward capacity.
    pub players: u32,
}

impl RoomFacts {
    /// Facts of a resident room, counting the players inside.
    pub fn of_room(world: &World, room: &Room) -> Self {
        Self {
            name: room.name.clone(),
            capacity: room.capacity,
            flags: room.flags.clone(),
            min_level: room.min_level,
            max_level: room.max_level,
            players: occupants(world, room)
                .filter(|a| counts_toward_capacity(a))
                .count() as u32,
        }
    }

    /// Facts of authored content not yet loaded.
    pub fn of_def(def: &RoomDef) -> Self {
        Self {
            name: def.name.clone(),
            capacity: def.capacity,
            flags: def.flags.clone(),
            min_level: def.min_level,
            max_level: def.max_level,
            players: 0,
        }
    }

    /// Facts of a grid tile not yet materialized.
    pub fn of_tile(tile: &Tile) -> Self {
        Self {
            name: tile.name.clone(),
            capacity: tile.capacity,
            flags: tile.flags.clone(),
            min_level: None,
            max_level: None,
            players: 0,
        }
    }
}

/// Only non-staff players take up room.
pub fn counts_toward_capacity(actor: &Actor) -> bool {
    actor.is_player() && !actor.is_staff()
}

/// Builders may only visit authored rooms of their own regions.
pub fn check_builder(actor: &Actor, dest: &Location) -> Result<(), MoveError> {
    let Role::Builder { regions } = &actor.role else {
        return Ok(());
    };
    match dest {
        Location::Grid(_) => Err(MoveError::Restricted(
            "Builders may not enter procedural regions.".into(),
        )),
        Location::Symbolic(s) if !regions.contains(&s.region) => Err(MoveError::Restricted(
            "You are not allowed in that region.".into(),
        )),
        Location::Symbolic(_) => Ok(()),
    }
}

/// Room-level entry rules other than capacity.
pub fn can_enter_room(actor: &Actor, facts: &RoomFacts, staff_bypass: bool) -> Result<(), MoveError> {
    if staff_bypass && actor.is_staff() {
        return Ok(());
    }
    if facts.flags.contains(&RoomFlag::DisperseMist) && actor.has(Condition::Mist) {
        return Err(MoveError::Blocked(
            "Your mist form would disperse there.".into(),
        ));
    }
    let out_of_range = facts.min_level.is_some_and(|min| actor.level < min)
        || facts.max_level.is_some_and(|max| actor.level > max);
    if actor.is_player() && out_of_range {
        return Err(MoveError::Restricted(
            "You are not the right level to enter there.".into(),
        ));
    }
    Ok(())
}

/// Count `actor` against the destination's capacity. The counter is bumped
/// before the check and rolled back if the actor is refused.
pub fn admit(actor: &Actor, facts: &RoomFacts, admitted: &mut u32) -> Result<(), MoveError> {
    if !counts_toward_capacity(actor) {
        return Ok(());
    }
    *admitted += 1;
    match facts.capacity {
        Some(cap) if facts.players + *admitted > cap => {
            *admitted -= 1;
            Err(MoveError::CapacityExceeded(facts.name.clone()))
        }
        _ => Ok(()),
    }
}

/// Zone-distance policy for teleport- and track-class actions.
pub fn check_distance(
    zones: &dyn ZoneDirectory,
    from: &Location,
    to: &Location,
    kind: ZoneKind,
    dest: &RoomFacts,
) -> Result<(), MoveError> {
    if from == to {
        return Ok(());
    }
    if dest.flags.contains(&RoomFlag::Jail) || dest.flags.contains(&RoomFlag::Limbo) {
        return Err(MoveError::Restricted("That place is closed to you.".into()));
    }
    match (zones.zone_of(from, kind), zones.zone_of(to, kind)) {
        (Some(a), Some(b)) if a == b => Ok(()),
        _ => Err(MoveError::Restricted("That is too far away.".into())),
    }
}
