use std::collections::HashMap;

use wf_core::{RoomDef, SymbolicRef};

/// Where authored room content comes from. Loading must not have side
/// effects; the same reference always yields the same content.
pub trait RoomStore: std::fmt::Debug {
    /// Content authored at `at`, if any.
    fn load(&self, at: &SymbolicRef) -> Option<RoomDef>;
}

/// A store backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rooms: HashMap<SymbolicRef, RoomDef>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a room definition.
    pub fn insert(&mut self, at: SymbolicRef, def: RoomDef) {
        self.rooms.insert(at, def);
    }

    /// Number of stored rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether the store holds no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// References of every stored room.
    pub fn refs(&self) -> impl Iterator<Item = &SymbolicRef> {
        self.rooms.keys()
    }
}

impl RoomStore for MemoryStore {
    fn load(&self, at: &SymbolicRef) -> Option<RoomDef> {
        self.rooms.get(at).cloned()
    }
}
