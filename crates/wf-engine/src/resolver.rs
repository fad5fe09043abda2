//! Turning exits into concrete locations for a particular traveler.

use wf_core::{Actor, Condition, ExitTarget, Location, World};

use crate::error::{MoveError, Unresolved};

/// Resolve an exit target for `traveler`. Never creates rooms.
pub fn resolve(world: &World, target: &ExitTarget, traveler: &Actor) -> Result<Location, MoveError> {
    let loc = match target {
        ExitTarget::Location(loc) => loc.clone(),
        ExitTarget::Previous => traveler
            .previous
            .clone()
            .ok_or(MoveError::Unresolvable(Unresolved::NoPrevious))?,
        ExitTarget::Bound => traveler
            .bound
            .clone()
            .ok_or(MoveError::Unresolvable(Unresolved::NoBound))?,
        ExitTarget::Storage => match traveler.storage.as_slice() {
            [] => return Err(MoveError::Unresolvable(Unresolved::NoStorage)),
            [only] => Location::Symbolic(only.clone()),
            _ => return Err(MoveError::Unresolvable(Unresolved::AmbiguousStorage)),
        },
    };
    resolve_location(world, &loc, traveler)
}

/// Normalize a location for `traveler`: grid cells are wrapped, embedded
/// rooms take precedence over terrain, and impassable terrain is refused.
pub fn resolve_location(
    world: &World,
    loc: &Location,
    traveler: &Actor,
) -> Result<Location, MoveError> {
    let grid = match loc {
        Location::Symbolic(_) => return Ok(loc.clone()),
        Location::Grid(g) => g,
    };
    let area = world
        .area(&grid.region)
        .ok_or_else(|| MoveError::Unresolvable(Unresolved::NoRegion(grid.region.clone())))?;
    if let Some(room) = area.embedded_at(grid.coord) {
        return Ok(Location::Symbolic(room.clone()));
    }
    if !area.can_pass(grid.coord, flight(traveler)) {
        return Err(MoveError::Unresolvable(Unresolved::Impassable(
            Location::Grid(area.grid_ref(grid.coord)),
        )));
    }
    Ok(Location::Grid(area.grid_ref(grid.coord)))
}

/// Flight strength for terrain checks. Staff cross anything.
fn flight(traveler: &Actor) -> u8 {
    if traveler.is_staff() {
        u8::MAX
    } else if traveler.has(Condition::Fly) {
        traveler.fly_strength.max(1)
    } else {
        0
    }
}
