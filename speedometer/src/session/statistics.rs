//! Statistics snapshot.

/// Point-in-time statistics returned by every tracker update.
///
/// Recomputed on each update and never persisted. The presentation layer
/// owns redrawing when it receives a new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionStatistics {
    /// Speed of the most recent fix in km/h.
    pub current_speed_kmh: f32,
    /// Peak trusted speed this session in km/h.
    pub max_speed_kmh: f32,
    /// Satellites used in the most recent fix.
    pub current_satellites: u32,
    /// Peak satellites used in any fix this session.
    pub max_satellites: u32,
}

impl SessionStatistics {
    /// Whether the displayed speed is nonzero.
    pub fn is_moving(&self) -> bool {
        self.current_speed_kmh != 0.0
    }
}
