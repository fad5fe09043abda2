/// Configuration for an engine instance.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// RNG seed for deterministic rolls.
    pub seed: u64,
    /// Maximum narration log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Footprints remembered per procedural region.
    pub max_area_tracks: usize,
    /// Base delay, in ticks, of a track search in a vast room.
    pub track_search_base_delay: u64,
    /// Whether staff skip the movement rules.
    pub staff_bypass: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            max_events: 0,
            max_area_tracks: wf_core::area::DEFAULT_MAX_TRACKS,
            track_search_base_delay: 5,
            staff_bypass: true,
        }
    }
}

impl EngineConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the maximum narration log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }

    /// Set the per-region footprint cap.
    pub fn with_max_area_tracks(mut self, max: usize) -> Self {
        self.max_area_tracks = max;
        self
    }

    /// Set the base delay of a vast-room track search.
    pub fn with_track_search_base_delay(mut self, ticks: u64) -> Self {
        self.track_search_base_delay = ticks;
        self
    }

    /// Set whether staff skip the movement rules.
    pub fn with_staff_bypass(mut self, bypass: bool) -> Self {
        self.staff_bypass = bypass;
        self
    }
}
