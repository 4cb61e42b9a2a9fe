use grbl::AxisId;

use crate::error::Result;

/// Volumetric speed range of an axis, in ml per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimits {
    pub min_speed: f64,
    pub max_speed: f64,
}

pub trait ReagentDispenser {
    /// Starts dispensing `volume` ml (negative withdraws) on `axis`,
    /// optionally spread over `duration` seconds.
    ///
    /// Returns the number of seconds the move will take. This is longer than
    /// `duration` when the requested rate exceeds what the axis allows.
    fn dispense(&mut self, axis: AxisId, volume: f64, duration: Option<f64>) -> Result<f64>;

    fn speed_limits(&self, axis: AxisId) -> Result<SpeedLimits>;
}
