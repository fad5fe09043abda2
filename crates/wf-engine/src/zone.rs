use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wf_core::Location;

/// Which zone grouping a distance check uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneKind {
    /// Grouping for teleports and portals.
    Teleport,
    /// Grouping for track memory.
    Track,
}

/// Maps locations to zone tags.
pub trait ZoneDirectory: std::fmt::Debug {
    /// Zone tag of `location`, if its region has one.
    fn zone_of(&self, location: &Location, kind: ZoneKind) -> Option<String>;
}

/// Zone tags assigned per region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticZones {
    /// Region name to teleport zone.
    #[serde(default)]
    pub teleport: HashMap<String, String>,
    /// Region name to track zone.
    #[serde(default)]
    pub track: HashMap<String, String>,
}

impl StaticZones {
    /// No zones.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag `region` with `zone` for the given kind.
    pub fn with_zone(mut self, kind: ZoneKind, region: &str, zone: &str) -> Self {
        let map = match kind {
            ZoneKind::Teleport => &mut self.teleport,
            ZoneKind::Track => &mut self.track,
        };
        map.insert(region.to_string(), zone.to_string());
        self
    }
}

impl ZoneDirectory for StaticZones {
    fn zone_of(&self, location: &Location, kind: ZoneKind) -> Option<String> {
        let map = match kind {
            ZoneKind::Teleport => &self.teleport,
            ZoneKind::Track => &self.track,
        };
        map.get(location.region()).cloned()
    }
}
