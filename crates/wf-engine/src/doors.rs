//! Opening, closing, locking and unlocking exits.

use tracing::debug;
use wf_core::{ActorId, Exit, ExitFlag, RoomKey, WfError};

use crate::engine::Engine;
use crate::error::{EngineResult, MoveError};
use crate::event::{Audience, NavEventKind};
use crate::gate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DoorOp {
    Open,
    Close,
    Lock,
    Unlock,
}

impl Engine {
    /// Open a closed exit. Refused if it is locked or guarded.
    pub fn open_exit(&mut self, actor: ActorId, exit: &str) -> EngineResult<()> {
        self.operate(actor, exit, DoorOp::Open)
    }

    /// Close an open exit that can be closed.
    pub fn close_exit(&mut self, actor: ActorId, exit: &str) -> EngineResult<()> {
        self.operate(actor, exit, DoorOp::Close)
    }

    /// Lock a closed exit. Needs the exit's key unless the actor is staff.
    pub fn lock_exit(&mut self, actor: ActorId, exit: &str) -> EngineResult<()> {
        self.operate(actor, exit, DoorOp::Lock)
    }

    /// Unlock a locked exit. Needs the exit's key unless the actor is staff.
    pub fn unlock_exit(&mut self, actor: ActorId, exit: &str) -> EngineResult<()> {
        self.operate(actor, exit, DoorOp::Unlock)
    }

    fn operate(&mut self, actor: ActorId, name: &str, op: DoorOp) -> EngineResult<()> {
        let a = self.world.try_actor(actor)?;
        if a.is_incapacitated() {
            return Err(MoveError::Restricted("You are in no condition to do that.".into()).into());
        }
        let staff = self.config.staff_bypass && a.is_staff();
        let key = self
            .world
            .room_of(actor)
            .ok_or_else(|| MoveError::Restricted("You are nowhere.".into()))?;
        let room = self
            .world
            .room(&key)
            .ok_or_else(|| WfError::RoomNotResident(key.to_string()))?;
        let exit = room
            .find_exit(name)
            .ok_or_else(|| MoveError::NoSuchExit(name.to_string()))?;

        let guard = (!staff && op != DoorOp::Close)
            .then(|| gate::guard_for(&self.world, a, room, exit))
            .flatten();
        if let Some(guard) = guard {
            return Err(MoveError::Blocked(format!("{} won't let you.", guard.name)).into());
        }
        check(op, exit, a.keys.contains(exit.key.as_deref().unwrap_or_default()), staff)?;

        let exit_name = exit.name.clone();
        let line = narration(op, &a.name, exit);
        let at = room.location();
        let authored = matches!(key, RoomKey::Authored(_));

        let room = self.world.try_room_mut(&key)?;
        if let Some(exit) = room.exit_mut(&exit_name) {
            match op {
                DoorOp::Open => exit.clear(ExitFlag::Closed),
                DoorOp::Close => exit.set(ExitFlag::Closed),
                DoorOp::Lock => exit.set(ExitFlag::Locked),
                DoorOp::Unlock => exit.clear(ExitFlag::Locked),
            }
        }
        if authored {
            room.dirty = true;
        }
        debug!(actor = %actor, exit = %exit_name, ?op, "exit state changed");

        let kind = match op {
            DoorOp::Open => NavEventKind::ExitOpened { actor, exit: exit_name },
            DoorOp::Close => NavEventKind::ExitClosed { actor, exit: exit_name },
            DoorOp::Lock => NavEventKind::ExitLocked { actor, exit: exit_name },
            DoorOp::Unlock => NavEventKind::ExitUnlocked { actor, exit: exit_name },
        };
        self.emit(kind, Audience::Room { at, exclude: Vec::new() }, line);
        Ok(())
    }
}

fn check(op: DoorOp, exit: &Exit, has_key: bool, staff: bool) -> Result<(), MoveError> {
    let blocked = |msg: &str| Err(MoveError::Blocked(msg.to_string()));
    let closable = exit.is(ExitFlag::Closable) || exit.is(ExitFlag::Closed);
    let lockable = exit.is(ExitFlag::Lockable) || exit.is(ExitFlag::Locked);
    match op {
        DoorOp::Open if !exit.is(ExitFlag::Closed) => blocked("It's already open."),
        DoorOp::Open if exit.is(ExitFlag::Locked) => blocked("It's locked."),
        DoorOp::Close if !closable => blocked("You can't close that."),
        DoorOp::Close if exit.is(ExitFlag::Closed) => blocked("It's already closed."),
        DoorOp::Lock if !lockable => blocked("You can't lock that."),
        DoorOp::Lock if exit.is(ExitFlag::Locked) => blocked("It's already locked."),
        DoorOp::Lock if !exit.is(ExitFlag::Closed) => blocked("You have to close it first."),
        DoorOp::Unlock if !exit.is(ExitFlag::Locked) => blocked("It's not locked."),
        DoorOp::Lock | DoorOp::Unlock if !staff && !(exit.key.is_some() && has_key) => {
            blocked("You don't have the right key.")
        }
        _ => Ok(()),
    }
}

fn narration(op: DoorOp, who: &str, exit: &Exit) -> String {
    match op {
        DoorOp::Open => exit
            .open_text
            .clone()
            .unwrap_or_else(|| format!("{who} opens the {}.", exit.name)),
        DoorOp::Close => exit
            .close_text
            .clone()
            .unwrap_or_else(|| format!("{who} closes the {}.", exit.name)),
        DoorOp::Lock => format!("{who} locks the {}.", exit.name),
        DoorOp::Unlock => format!("{who} unlocks the {}.", exit.name),
    }
}
