//! Presentation snapshot.

use crate::session::SessionStatistics;

/// Everything the presentation layer renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    /// Latest statistics snapshot.
    pub statistics: SessionStatistics,
    /// Provider or permission message to show over the readout, if any.
    pub status: Option<String>,
}

impl DashboardState {
    /// The four readout lines, top to bottom.
    ///
    /// Current speed is shown whole, top speed to one decimal.
    pub fn readout(&self) -> [String; 4] {
        let stats = &self.statistics;
        [
            format!("satellites: {}", stats.current_satellites),
            format!("{:.0} km/h", stats.current_speed_kmh),
            format!("top speed: {:.1}", stats.max_speed_kmh),
            format!("top satellites: {}", stats.max_satellites),
        ]
    }
}

impl std::fmt::Display for DashboardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(status) = &self.status {
            writeln!(f, "! {}", status)?;
        }
        let lines = self.readout();
        write!(f, "{}", lines.join("\n"))
    }
}
