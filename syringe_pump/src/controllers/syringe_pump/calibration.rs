use std::{collections::BTreeMap, io::Write};

use grbl::{AxisId, GrblCommand};
use tracing::{debug, info};

use super::config::SyringeAxisConfig;
use crate::error::Result;

/// Slowest step rate (steps/s) the controller produces reliably.
pub const MIN_STEP_RATE: f64 = 30.0;
/// Controller specific scaling from the step-rate floor to mm/min.
pub const FEED_FLOOR_SCALE: f64 = 120.0;

/// Values derived once per axis from its mechanical configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisCalibration {
    pub steps_per_mm: f64,
    pub min_mm_per_min: f64,
}

impl AxisCalibration {
    pub fn from_config(config: &SyringeAxisConfig) -> Self {
        let steps_per_mm = config.steps_per_mm();
        let min_mm_per_min = ((MIN_STEP_RATE / steps_per_mm) * FEED_FLOOR_SCALE).ceil();

        Self {
            steps_per_mm,
            min_mm_per_min,
        }
    }
}

/// Derives the calibration of every axis and pushes the steps/mm and max
/// rate settings to the controller.
///
/// All axes are validated before anything is written, so a bad entry leaves
/// the controller untouched.
pub fn calibrate(
    configs: &BTreeMap<AxisId, SyringeAxisConfig>,
    sender: &mut impl Write,
) -> Result<BTreeMap<AxisId, AxisCalibration>> {
    for (axis, config) in configs {
        config.validate(&axis.to_string())?;
    }

    let mut calibrations = BTreeMap::new();

    for (axis, config) in configs {
        let calibration = AxisCalibration::from_config(config);

        let settings = [
            GrblCommand::StepsPerMm {
                axis: *axis,
                steps_per_mm: calibration.steps_per_mm,
            },
            GrblCommand::MaxRate {
                axis: *axis,
                mm_per_min: config.max_mm_per_min,
            },
        ];
        for setting in settings {
            debug!("Configuring axis {} with '{}'", axis, setting.line().trim_end());
            setting.send(sender)?;
        }

        info!(
            "Calibrated axis {}: {} steps/mm, feed rate {}..{} mm/min",
            axis, calibration.steps_per_mm, calibration.min_mm_per_min, config.max_mm_per_min
        );
        calibrations.insert(*axis, calibration);
    }

    Ok(calibrations)
}
