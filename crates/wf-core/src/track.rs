use serde::{Deserialize, Serialize};

use crate::actor::Size;

/// The footprint left by the last party to leave a location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Exit name the party left through.
    pub direction: Option<String>,
    /// Largest traveler in the party.
    pub size: Option<Size>,
    /// How many travelers left tracks.
    pub count: u32,
}

impl Track {
    /// Forget the previous party.
    pub fn reset(&mut self, direction: impl Into<String>) {
        self.direction = Some(direction.into());
        self.size = None;
        self.count = 0;
    }

    /// Add one traveler to the current party.
    pub fn record(&mut self, size: Size) {
        self.size = Some(self.size.map_or(size, |s| s.max(size)));
        self.count += 1;
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.direction.is_none()
    }
}
