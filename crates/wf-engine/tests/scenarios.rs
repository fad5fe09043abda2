//! Scenario and property tests for the wf engine.
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use wf_core::area::{AreaDef, Tile};
use wf_core::{
    Actor, ActorFlag, ActorId, Area, Condition, Coord, Exit, ExitFlag, Group, GroupStatus,
    Location, RoomDef, RoomFlag, Size, SymbolicRef, World,
};
use wf_engine::{
    Audience, Engine, EngineConfig, EngineError, MemoryStore, MoveError, MoveStatus,
    NavEventKind, RoomStore, ScriptedDice, StaticZones, TrackSearch, Unresolved, ZoneKind,
};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn tile(symbol: char, name: &str, fly: Option<u8>) -> Tile {
    Tile {
        symbol,
        name: name.to_string(),
        water: false,
        road: false,
        fly,
        holds_tracks: true,
        flags: BTreeSet::new(),
        capacity: None,
    }
}

fn wild() -> Area {
    Area::new(AreaDef {
        name: "wild".into(),
        default_tile: '.',
        tiles: vec![tile('.', "Plains", Some(0)), tile('^', "Peaks", None)],
        terrain: vec![
            "........".into(),
            "........".into(),
            "........".into(),
            "........".into(),
            "........".into(),
            "......^.".into(),
        ],
        wrap: Some(Coord::new(20, 20, 0)),
        embedded: Vec::new(),
    })
    .unwrap()
}

fn room(name: &str, exits: Vec<Exit>) -> RoomDef {
    RoomDef {
        name: name.into(),
        exits,
        ..RoomDef::default()
    }
}

fn to(region: &str, id: u32) -> Location {
    Location::symbolic(region, id)
}

fn store() -> MemoryStore {
    let mut gate = Exit::new("gate", to("town", 4));
    gate.max_size = Some(Size::Medium);
    let door = Exit::new("door", to("town", 2))
        .with_flag(ExitFlag::Closable)
        .with_flag(ExitFlag::Lockable)
        .with_flag(ExitFlag::Closed);

    let mut field = room("Field", vec![Exit::new("east", to("town", 1))]);
    field.flags.insert(RoomFlag::Vast);
    let mut closet = room("Closet", vec![Exit::new("out", to("town", 1))]);
    closet.capacity = Some(2);

    let mut s = MemoryStore::new();
    s.insert(
        SymbolicRef::new("town", 1),
        room(
            "Square",
            vec![
                Exit::new("north", to("town", 2)),
                Exit::new("up", to("town", 3)).with_flag(ExitFlag::NeedsClimbingGear),
                gate,
                door,
                Exit::new("closet", to("town", 5)),
                Exit::new("west", to("town", 6)),
            ],
        ),
    );
    s.insert(
        SymbolicRef::new("town", 2),
        room("Lane", vec![Exit::new("south", to("town", 1))]),
    );
    s.insert(SymbolicRef::new("town", 3), room("Ledge", Vec::new()));
    s.insert(SymbolicRef::new("town", 4), room("Cubby", Vec::new()));
    s.insert(SymbolicRef::new("town", 5), closet);
    s.insert(SymbolicRef::new("town", 6), field);
    s.insert(SymbolicRef::new("astral", 1), room("Astral Plane", Vec::new()));
    s
}

fn zones() -> StaticZones {
    StaticZones::new()
        .with_zone(ZoneKind::Teleport, "town", "main")
        .with_zone(ZoneKind::Teleport, "wild", "main")
        .with_zone(ZoneKind::Teleport, "astral", "planes")
        .with_zone(ZoneKind::Track, "town", "main")
}

fn engine(rolls: Vec<i32>) -> Engine {
    let mut world = World::new("Test");
    world.add_area(wild()).unwrap();
    Engine::new(world, EngineConfig::default())
        .with_store(store())
        .with_zones(zones())
        .with_dice(ScriptedDice::new(rolls))
}

fn add(e: &mut Engine, actor: Actor, at: &Location) -> ActorId {
    let id = e.world_mut().add_actor(actor).unwrap();
    e.spawn(id, at).unwrap();
    id
}

fn occupants(e: &Engine, at: &Location) -> Vec<ActorId> {
    e.peek(at)
        .map(|r| r.occupants().to_vec())
        .unwrap_or_default()
}

fn move_err(err: EngineError) -> MoveError {
    err.as_move().cloned().unwrap()
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn impassable_terrain_refuses_without_mutation() {
    let mut e = engine(vec![]);
    let here = Location::grid("wild", 5, 5, 0);
    let kael = add(&mut e, Actor::player("Kael", 5), &here);

    let err = move_err(e.go(kael, "east").unwrap_err());
    assert!(matches!(
        err,
        MoveError::Unresolvable(Unresolved::Impassable(_))
    ));
    assert_eq!(occupants(&e, &here), vec![kael]);
    assert_eq!(e.world().area("wild").unwrap().resident_count(), 1);
    assert!(e.events().is_empty());
    assert!(e.world().track_at(&here).is_none());
}

#[test]
fn pet_blocked_by_exit_is_left_behind() {
    let mut e = engine(vec![]);
    let square = to("town", 1);
    let kael = add(&mut e, Actor::player("Kael", 5), &square);
    let mut rex = Actor::monster("Rex", 2);
    rex.size = Size::Tiny;
    let rex = add(&mut e, rex, &square);
    let mut bear = Actor::monster("Bear", 4);
    bear.size = Size::Large;
    let bear = add(&mut e, bear, &square);
    e.world_mut().tame(kael, rex).unwrap();
    e.world_mut().tame(kael, bear).unwrap();

    let outcome = e.go(kael, "gate").unwrap();
    assert_eq!(outcome.status, MoveStatus::Partial);
    assert_eq!(outcome.moved, vec![kael, rex]);
    assert_eq!(outcome.omitted.len(), 1);
    assert_eq!(outcome.omitted[0].0, bear);
    assert!(matches!(outcome.omitted[0].1, MoveError::Blocked(_)));

    assert_eq!(occupants(&e, &to("town", 4)), vec![kael, rex]);
    assert_eq!(occupants(&e, &square), vec![bear]);
    assert!(e.events().events().iter().any(|ev| matches!(
        ev.kind,
        NavEventKind::LeftBehind { actor, .. } if actor == bear
    )));
}

#[test]
fn fatal_fall_kills_before_arrival() {
    // Fall chance is 50; the roll of 1 falls and the damage roll is capped at 20.
    let mut e = engine(vec![1, 25]);
    let square = to("town", 1);
    let mut kael = Actor::player("Kael", 5);
    kael.hp = 10;
    let kael = add(&mut e, kael, &square);

    let outcome = e.go(kael, "up").unwrap();
    assert_eq!(outcome.status, MoveStatus::Died);
    assert_eq!(outcome.died, vec![kael]);
    assert!(outcome.destination.is_none());

    assert!(!occupants(&e, &to("town", 3)).contains(&kael));
    assert!(!occupants(&e, &square).contains(&kael));
    assert_eq!(e.world().rooms_containing(kael), 0);
    let dead = e.world().actor(kael).unwrap();
    assert!(dead.has(Condition::Dead));
    assert!(dead.location.is_none());
    assert!(e.events().events().iter().any(|ev| matches!(
        ev.kind,
        NavEventKind::Died { actor, .. } if actor == kael
    )));
}

#[test]
fn survivable_fall_hurts_but_passes() {
    let mut e = engine(vec![1, 7]);
    let kael = add(&mut e, Actor::player("Kael", 5), &to("town", 1));
    let outcome = e.go(kael, "up").unwrap();
    assert_eq!(outcome.status, MoveStatus::Completed);
    assert_eq!(e.world().actor(kael).unwrap().hp, 23);
    assert_eq!(occupants(&e, &to("town", 3)), vec![kael]);
}

#[test]
fn recycled_room_is_reused_at_new_cell() {
    let mut area = wild();
    let slot = area.get_or_create(Coord::new(2, 2, 0));
    let reused = area.recycle(slot, Coord::new(2, 3, 0)).unwrap();
    assert_eq!(reused, slot);
    assert_eq!(area.get_or_create(Coord::new(2, 3, 0)), slot);
    assert_eq!(area.lookup_only(Coord::new(2, 2, 0)), None);
    assert_eq!(area.resident_count(), 1);
}

#[test]
fn walking_the_wilds_recycles_the_vacated_room() {
    let mut e = engine(vec![]);
    let start = Location::grid("wild", 2, 2, 0);
    let kael = add(&mut e, Actor::player("Kael", 5), &start);
    let slot = e.world().area("wild").unwrap().lookup_only(Coord::new(2, 2, 0));

    let outcome = e.go(kael, "north").unwrap();
    assert_eq!(outcome.destination, Some(Location::grid("wild", 2, 3, 0)));
    let area = e.world().area("wild").unwrap();
    assert_eq!(area.resident_count(), 1);
    assert_eq!(area.lookup_only(Coord::new(2, 3, 0)), slot);
    assert_eq!(area.lookup_only(Coord::new(2, 2, 0)), None);
    assert_eq!(
        e.world().actor(kael).unwrap().previous,
        Some(start.clone())
    );
    let track = e.world().track_at(&start).unwrap();
    assert_eq!(track.direction.as_deref(), Some("north"));
}

#[test]
fn teleport_across_zones_is_restricted_before_loading() {
    let mut e = engine(vec![]);
    let square = to("town", 1);
    let kael = add(&mut e, Actor::player("Kael", 5), &square);

    let err = move_err(e.teleport(kael, &to("astral", 1)).unwrap_err());
    assert!(matches!(err, MoveError::Restricted(_)));
    assert!(e.peek(&to("astral", 1)).is_none());
    assert_eq!(occupants(&e, &square), vec![kael]);
}

#[test]
fn teleport_within_zone() {
    let mut e = engine(vec![]);
    let kael = add(&mut e, Actor::player("Kael", 5), &to("town", 1));
    let outcome = e.teleport(kael, &Location::grid("wild", 1, 1, 0)).unwrap();
    assert_eq!(outcome.status, MoveStatus::Completed);
    assert_eq!(
        e.world().actor(kael).unwrap().location,
        Some(Location::grid("wild", 1, 1, 0))
    );
    // Teleports leave no footprints.
    assert!(e.world().track_at(&to("town", 1)).is_none());
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

fn party(e: &mut Engine, names: &[&str], at: &Location) -> Vec<ActorId> {
    let ids: Vec<ActorId> = names
        .iter()
        .map(|n| add(e, Actor::player(*n, 5), at))
        .collect();
    let mut group = Group::new("Party", ids[0]);
    for id in &ids[1..] {
        group.add(*id, GroupStatus::Member);
    }
    e.world_mut().add_group(group).unwrap();
    ids
}

#[test]
fn group_moves_together_without_double_occupancy() {
    let mut e = engine(vec![]);
    let square = to("town", 1);
    let ids = party(&mut e, &["Kael", "Mira"], &square);
    let rex = add(&mut e, Actor::monster("Rex", 1), &square);
    e.world_mut().tame(ids[1], rex).unwrap();

    let outcome = e.go(ids[0], "north").unwrap();
    assert_eq!(outcome.status, MoveStatus::Completed);
    assert_eq!(outcome.moved, vec![ids[0], ids[1], rex]);
    for id in [ids[0], ids[1], rex] {
        assert_eq!(e.world().rooms_containing(id), 1);
        assert_eq!(e.world().actor(id).unwrap().location, Some(to("town", 2)));
    }
    let track = e.world().track_at(&square).unwrap();
    assert_eq!(track.count, 2);
}

#[test]
fn invited_members_stay_home() {
    let mut e = engine(vec![]);
    let square = to("town", 1);
    let kael = add(&mut e, Actor::player("Kael", 5), &square);
    let tam = add(&mut e, Actor::player("Tam", 5), &square);
    let mut group = Group::new("Party", kael);
    group.add(tam, GroupStatus::Invited);
    e.world_mut().add_group(group).unwrap();

    let outcome = e.go(kael, "north").unwrap();
    assert_eq!(outcome.moved, vec![kael]);
    assert_eq!(occupants(&e, &square), vec![tam]);
}

#[test]
fn capacity_turns_away_the_last_follower() {
    let mut e = engine(vec![]);
    let ids = party(&mut e, &["Kael", "Mira", "Tam"], &to("town", 1));

    let outcome = e.go(ids[0], "closet").unwrap();
    assert_eq!(outcome.status, MoveStatus::Partial);
    assert_eq!(outcome.moved, vec![ids[0], ids[1]]);
    assert_eq!(
        outcome.omitted,
        vec![(ids[2], MoveError::CapacityExceeded("Closet".into()))]
    );
}

#[test]
fn full_room_refuses_the_commander() {
    let mut e = engine(vec![]);
    let closet = to("town", 5);
    add(&mut e, Actor::player("Ann", 5), &closet);
    add(&mut e, Actor::player("Bo", 5), &closet);
    let kael = add(&mut e, Actor::player("Kael", 5), &to("town", 1));
    // Staff never take up room.
    let mut warden = Actor::player("Warden", 50);
    warden.role = wf_core::Role::Staff;
    let warden = add(&mut e, warden, &to("town", 1));

    let err = move_err(e.go(kael, "closet").unwrap_err());
    assert_eq!(err, MoveError::CapacityExceeded("Closet".into()));
    assert!(e.go(warden, "closet").is_ok());
}

// ---------------------------------------------------------------------------
// Stealth and pursuit
// ---------------------------------------------------------------------------

fn wolf(e: &mut Engine, target: ActorId, at: &Location) -> ActorId {
    let mut wolf = Actor::monster("wolf", 3);
    wolf.flags.insert(ActorFlag::FollowAttacker);
    wolf.enemies.push(target);
    add(e, wolf, at)
}

#[test]
fn pursuer_follows_on_a_good_roll() {
    let square = to("town", 1);
    let mut e = engine(vec![5]);
    let kael = add(&mut e, Actor::player("Kael", 5), &square);
    let w = wolf(&mut e, kael, &square);
    let outcome = e.go(kael, "north").unwrap();
    assert_eq!(outcome.moved, vec![kael, w]);

    let mut e = engine(vec![15]);
    let kael = add(&mut e, Actor::player("Kael", 5), &square);
    let w = wolf(&mut e, kael, &square);
    let outcome = e.go(kael, "north").unwrap();
    assert_eq!(outcome.moved, vec![kael]);
    // Losing the trail is not a left-behind dependent.
    assert!(outcome.omitted.is_empty());
    assert_eq!(occupants(&e, &square), vec![w]);
}

fn sneaker(e: &mut Engine, at: &Location) -> ActorId {
    let mut kael = Actor::player("Kael", 5);
    kael.skills.insert("sneak".into(), 50);
    kael.conditions.insert(Condition::Hidden);
    add(e, kael, at)
}

#[test]
fn successful_sneak_shakes_off_followers() {
    let square = to("town", 1);
    let mut e = engine(vec![10]);
    let kael = sneaker(&mut e, &square);
    let mira = add(&mut e, Actor::player("Mira", 5), &square);
    let mut group = Group::new("Party", kael);
    group.add(mira, GroupStatus::Member);
    e.world_mut().add_group(group).unwrap();
    let w = wolf(&mut e, kael, &square);

    let outcome = e.sneak(kael, "north").unwrap();
    assert!(outcome.sneaked);
    assert_eq!(outcome.moved, vec![kael]);
    assert_eq!(occupants(&e, &square), vec![mira, w]);
    let departed = e
        .events()
        .events()
        .iter()
        .find(|ev| matches!(ev.kind, NavEventKind::Departed { .. }))
        .unwrap();
    assert!(matches!(departed.audience, Audience::Staff { .. }));
}

#[test]
fn pets_slip_away_with_a_sneaking_master() {
    let square = to("town", 1);
    let mut e = engine(vec![10]);
    let kael = sneaker(&mut e, &square);
    let rex = add(&mut e, Actor::monster("Rex", 2), &square);
    e.world_mut().tame(kael, rex).unwrap();

    let outcome = e.sneak(kael, "north").unwrap();
    assert!(outcome.sneaked);
    assert_eq!(outcome.status, MoveStatus::Completed);
    assert_eq!(outcome.moved, vec![kael, rex]);
    assert_eq!(occupants(&e, &to("town", 2)), vec![kael, rex]);
    let departures: Vec<_> = e
        .events()
        .events()
        .iter()
        .filter(|ev| matches!(ev.kind, NavEventKind::Departed { .. }))
        .collect();
    assert_eq!(departures.len(), 2);
    assert!(departures
        .iter()
        .all(|ev| matches!(ev.audience, Audience::Staff { .. })));
}

#[test]
fn failed_sneak_still_moves_but_is_noticed() {
    let square = to("town", 1);
    let mut e = engine(vec![90, 1]);
    let kael = sneaker(&mut e, &square);
    let w = wolf(&mut e, kael, &square);

    let outcome = e.sneak(kael, "north").unwrap();
    assert!(!outcome.sneaked);
    assert_eq!(outcome.moved, vec![kael, w]);
    assert!(!e.world().actor(kael).unwrap().has(Condition::Hidden));
    assert!(e
        .events()
        .events()
        .iter()
        .any(|ev| matches!(ev.kind, NavEventKind::SneakFailed { .. })));
}

#[test]
fn sneaking_needs_hiding_first() {
    let mut e = engine(vec![]);
    let mut kael = Actor::player("Kael", 5);
    kael.skills.insert("sneak".into(), 50);
    let kael = add(&mut e, kael, &to("town", 1));
    assert!(matches!(
        move_err(e.sneak(kael, "north").unwrap_err()),
        MoveError::Restricted(_)
    ));
}

// ---------------------------------------------------------------------------
// Exits and portals
// ---------------------------------------------------------------------------

#[test]
fn closed_door_opens_on_the_way() {
    let mut e = engine(vec![]);
    let kael = add(&mut e, Actor::player("Kael", 5), &to("town", 1));
    e.go(kael, "door").unwrap();
    assert_eq!(e.world().actor(kael).unwrap().location, Some(to("town", 2)));
    let square = e.peek(&to("town", 1)).unwrap();
    assert!(!square.find_exit("door").unwrap().is(ExitFlag::Closed));
    assert!(square.dirty);
    assert!(e
        .events()
        .events()
        .iter()
        .any(|ev| matches!(ev.kind, NavEventKind::ExitOpened { .. })));
}

#[test]
fn locked_door_blocks() {
    let mut e = engine(vec![]);
    let kael = add(&mut e, Actor::player("Kael", 5), &to("town", 1));
    let mut warden = Actor::player("Warden", 50);
    warden.role = wf_core::Role::Staff;
    let warden = add(&mut e, warden, &to("town", 1));
    e.lock_exit(warden, "door").unwrap();

    assert!(matches!(
        move_err(e.go(kael, "door").unwrap_err()),
        MoveError::Blocked(_)
    ));
    assert!(e.go(warden, "door").is_ok());
}

#[test]
fn unknown_exit_is_no_such_exit() {
    let mut e = engine(vec![]);
    let kael = add(&mut e, Actor::player("Kael", 5), &to("town", 1));
    assert_eq!(
        move_err(e.go(kael, "sideways").unwrap_err()),
        MoveError::NoSuchExit("sideways".into())
    );
}

#[test]
fn single_charge_portal_collapses_after_use() {
    let mut e = engine(vec![]);
    let mage = add(&mut e, Actor::player("Mage", 1), &to("town", 1));
    let kael = add(&mut e, Actor::player("Kael", 5), &to("town", 1));
    e.create_portal(mage, &to("town", 2)).unwrap();
    assert!(e.portal_of("Mage").is_some());

    let outcome = e.go(kael, "portal").unwrap();
    assert_eq!(outcome.destination, Some(to("town", 2)));
    assert!(e.portal_of("Mage").is_none());
    assert!(e.peek(&to("town", 2)).unwrap().find_exit("portal").is_none());
    assert!(e
        .events()
        .events()
        .iter()
        .any(|ev| matches!(ev.kind, NavEventKind::PortalCollapsed { .. })));
    // Portal crossings leave no footprints.
    assert!(e.world().track_at(&to("town", 1)).is_none());
}

#[test]
fn whole_group_crosses_a_single_charge_portal() {
    let mut e = engine(vec![]);
    let square = to("town", 1);
    let mage = add(&mut e, Actor::player("Mage", 1), &square);
    let ids = party(&mut e, &["Kael", "Mira", "Tam"], &square);
    e.create_portal(mage, &to("town", 2)).unwrap();

    let outcome = e.go(ids[0], "portal").unwrap();
    assert_eq!(outcome.status, MoveStatus::Completed);
    assert_eq!(outcome.moved, ids);
    assert_eq!(occupants(&e, &to("town", 2)), ids);
    assert_eq!(occupants(&e, &square), vec![mage]);
    assert!(e.portal_of("Mage").is_none());
}

#[test]
fn portal_collapses_when_its_owner_leaves() {
    let mut e = engine(vec![]);
    let mage = add(&mut e, Actor::player("Mage", 40), &to("town", 1));
    e.create_portal(mage, &to("town", 3)).unwrap();
    e.go(mage, "north").unwrap();
    assert!(e.portal_of("Mage").is_none());
}

#[test]
fn square_is_released_once_its_door_is_shut_again() {
    let mut e = engine(vec![]);
    let square = to("town", 1);
    let kael = add(&mut e, Actor::player("Kael", 5), &square);
    e.open_exit(kael, "door").unwrap();
    e.close_exit(kael, "door").unwrap();
    assert!(e.peek(&square).unwrap().dirty);

    e.go(kael, "north").unwrap();
    e.tick().unwrap();
    assert!(e.peek(&square).is_none());
    // Footprints outlive the room.
    assert!(e.world().track_at(&square).is_some());
}

#[test]
fn square_with_an_open_door_stays_resident() {
    let mut e = engine(vec![]);
    let square = to("town", 1);
    let kael = add(&mut e, Actor::player("Kael", 5), &square);
    e.open_exit(kael, "door").unwrap();

    e.go(kael, "north").unwrap();
    e.tick().unwrap();
    let room = e.peek(&square).unwrap();
    assert!(!room.find_exit("door").unwrap().is(ExitFlag::Closed));
}

/// Counts loads per room on top of the fixture store.
#[derive(Debug)]
struct CountingStore {
    inner: MemoryStore,
    loads: Arc<Mutex<Vec<SymbolicRef>>>,
}

impl RoomStore for CountingStore {
    fn load(&self, at: &SymbolicRef) -> Option<RoomDef> {
        self.loads.lock().unwrap().push(at.clone());
        self.inner.load(at)
    }
}

#[test]
fn entering_an_unloaded_room_reads_the_store_once() {
    let loads = Arc::new(Mutex::new(Vec::new()));
    let mut world = World::new("Test");
    world.add_area(wild()).unwrap();
    let mut e = Engine::new(world, EngineConfig::default())
        .with_store(CountingStore {
            inner: store(),
            loads: Arc::clone(&loads),
        })
        .with_zones(zones());
    let kael = add(&mut e, Actor::player("Kael", 5), &to("town", 1));

    let out = e.go(kael, "north").unwrap();
    assert_eq!(out.status, MoveStatus::Completed);
    let lane = SymbolicRef::new("town", 2);
    let lane_loads = loads.lock().unwrap().iter().filter(|r| **r == lane).count();
    assert_eq!(lane_loads, 1);
}

#[test]
fn rooms_are_released_after_their_portal_collapses() {
    let mut e = engine(vec![]);
    let square = to("town", 1);
    let mage = add(&mut e, Actor::player("Mage", 40), &square);
    e.create_portal(mage, &to("town", 3)).unwrap();
    assert!(e.peek(&to("town", 3)).is_some());

    e.go(mage, "north").unwrap();
    e.tick().unwrap();
    assert!(e.portal_of("Mage").is_none());
    assert!(e.peek(&square).is_none());
    assert!(e.peek(&to("town", 3)).is_none());
}

#[test]
fn portal_needs_a_shared_zone() {
    let mut e = engine(vec![]);
    let mage = add(&mut e, Actor::player("Mage", 40), &to("town", 1));
    assert!(e.create_portal(mage, &to("astral", 1)).is_err());
    assert!(e.portal_of("Mage").is_none());
}

// ---------------------------------------------------------------------------
// Tracks
// ---------------------------------------------------------------------------

fn ranger(e: &mut Engine, at: &Location) -> ActorId {
    let mut r = Actor::player("Ranger", 10);
    r.skills.insert("track".into(), 10);
    add(e, r, at)
}

#[test]
fn tracks_are_found_where_the_party_left() {
    let mut e = engine(vec![1]);
    let square = to("town", 1);
    let kael = add(&mut e, Actor::player("Kael", 5), &square);
    let r = ranger(&mut e, &square);
    e.go(kael, "north").unwrap();

    match e.search_tracks(r).unwrap() {
        TrackSearch::Found(finding) => {
            assert_eq!(finding.direction, "north");
            assert_eq!(finding.size, Some(Size::Medium));
            assert_eq!(finding.count, Some(1));
        }
        other => panic!("expected tracks, got {other:?}"),
    }
}

#[test]
fn vast_rooms_defer_the_search() {
    let mut e = engine(vec![1]);
    let field = to("town", 6);
    let kael = add(&mut e, Actor::player("Kael", 5), &field);
    let r = ranger(&mut e, &field);
    e.go(kael, "east").unwrap();

    let TrackSearch::Pending { due } = e.search_tracks(r).unwrap() else {
        panic!("search in a vast room should be deferred");
    };
    assert_eq!(due, 5);
    assert!(matches!(
        move_err(e.search_tracks(r).unwrap_err()),
        MoveError::Restricted(_)
    ));
    e.run(5).unwrap();
    assert!(e.scheduler().is_empty());
    assert!(e.events().events().iter().any(|ev| matches!(
        &ev.kind,
        NavEventKind::TracksFound { direction, .. } if direction == "east"
    )));
}

#[test]
fn moving_interrupts_a_pending_search() {
    let mut e = engine(vec![]);
    let field = to("town", 6);
    let r = ranger(&mut e, &field);
    assert!(matches!(
        e.search_tracks(r).unwrap(),
        TrackSearch::Pending { .. }
    ));
    e.go(r, "east").unwrap();
    assert!(e.scheduler().is_empty());
    assert!(e
        .events()
        .events_for_actor(r)
        .iter()
        .any(|ev| matches!(ev.kind, NavEventKind::TrackSearchInterrupted { .. })));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn capacity_admits_exactly_up_to_the_limit(cap in 1u32..5, inside in 0u32..4, party_size in 1usize..6) {
        let mut store = store();
        let mut closet = room("Closet", Vec::new());
        closet.capacity = Some(cap);
        store.insert(SymbolicRef::new("town", 5), closet);
        let mut world = World::new("Test");
        world.add_area(wild()).unwrap();
        let mut e = Engine::new(world, EngineConfig::default())
            .with_store(store)
            .with_zones(zones())
            .with_dice(ScriptedDice::new(Vec::new()));

        for i in 0..inside {
            add(&mut e, Actor::player(format!("Inside{i}"), 5), &to("town", 5));
        }
        let names: Vec<String> = (0..party_size).map(|i| format!("Member{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let ids = party(&mut e, &refs, &to("town", 1));

        let free = cap.saturating_sub(inside) as usize;
        match e.go(ids[0], "closet") {
            Ok(outcome) => {
                prop_assert!(free >= 1);
                prop_assert_eq!(outcome.moved.len(), free.min(party_size));
                prop_assert_eq!(outcome.omitted.len(), party_size - free.min(party_size));
            }
            Err(err) => {
                prop_assert_eq!(free, 0);
                prop_assert_eq!(move_err(err), MoveError::CapacityExceeded("Closet".into()));
            }
        }
    }

    #[test]
    fn resolving_twice_gives_the_same_location(x in -30i32..30, y in -30i32..30) {
        let mut world = World::new("Test");
        world.add_area(wild()).unwrap();
        let kael = Actor::player("Kael", 5);
        let target = wf_core::ExitTarget::Location(Location::grid("wild", x, y, 0));
        let first = wf_engine::resolver::resolve(&world, &target, &kael);
        let second = wf_engine::resolver::resolve(&world, &target, &kael);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn recycled_rooms_match_fresh_ones(ax in 0i32..8, ay in 0i32..6, bx in 0i32..8, by in 0i32..6) {
        prop_assume!((ax, ay) != (bx, by));
        let b = Coord::new(bx, by, 0);

        let mut recycled = wild();
        let slot = recycled.get_or_create(Coord::new(ax, ay, 0));
        let slot = recycled.recycle(slot, b).unwrap();
        let mut fresh = wild();
        let other = fresh.get_or_create(b);

        let r = recycled.room(slot).unwrap();
        let f = fresh.room(other).unwrap();
        prop_assert_eq!(&r.name, &f.name);
        prop_assert_eq!(&r.flags, &f.flags);
        prop_assert_eq!(&r.exits, &f.exits);
        prop_assert_eq!(r.embedded(), f.embedded());
        prop_assert_eq!(r.occupants(), f.occupants());
        prop_assert_eq!(r.location(), f.location());
        prop_assert_eq!(r.capacity, f.capacity);
    }
}
