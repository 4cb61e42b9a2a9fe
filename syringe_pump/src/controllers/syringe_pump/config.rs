use std::{collections::BTreeMap, time::Duration};

use grbl::AxisId;
use serde::{Deserialize, Serialize};
use utilities::lazy_serial::{DEFAULT_BAUD_RATE, DEFAULT_TIMEOUT};

use super::calibration::AxisCalibration;
use crate::error::{DispenserError, Result};

/// Mechanical description of one syringe axis.
#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq)]
pub struct SyringeAxisConfig {
    /// Travel per motor revolution (thread pitch), mm.
    pub mm_per_rev: f64,
    pub steps_per_rev: u32,
    /// Travel needed to move 1 ml: syringe length over its capacity.
    pub mm_per_ml: f64,
    pub max_mm_per_min: f64,
}

impl SyringeAxisConfig {
    pub fn steps_per_mm(&self) -> f64 {
        self.steps_per_rev as f64 / self.mm_per_rev
    }

    pub fn validate(&self, axis: &str) -> Result<()> {
        let invalid = |reason: String| DispenserError::InvalidConfiguration {
            axis: axis.to_string(),
            reason,
        };

        for (name, value) in [
            ("mm_per_rev", self.mm_per_rev),
            ("mm_per_ml", self.mm_per_ml),
            ("max_mm_per_min", self.max_mm_per_min),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(format!(
                    "{name} must be a finite positive number, got {value}"
                )));
            }
        }

        if self.steps_per_rev == 0 {
            return Err(invalid("steps_per_rev must be positive".to_string()));
        }

        let steps_per_mm = self.steps_per_mm();
        if !steps_per_mm.is_finite() || steps_per_mm <= 0.0 {
            return Err(invalid(format!(
                "steps per mm {steps_per_mm} is out of range"
            )));
        }

        let min_mm_per_min = AxisCalibration::from_config(self).min_mm_per_min;
        if !min_mm_per_min.is_finite() {
            return Err(invalid(format!(
                "minimum feed rate {min_mm_per_min} mm/min is out of range"
            )));
        }

        Ok(())
    }
}

impl Default for SyringeAxisConfig {
    fn default() -> Self {
        Self {
            mm_per_rev: 8.0,
            steps_per_rev: 200,
            mm_per_ml: 50.0,
            max_mm_per_min: 500.0,
        }
    }
}

#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
pub struct SyringePumpConfig {
    pub port: String,
    pub baud_rate: u32,
    pub timeout_ms: u64,

    pub axes: BTreeMap<String, SyringeAxisConfig>,
}

impl SyringePumpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Maps axis names onto controller axes and validates every entry.
    pub fn resolved_axes(&self) -> Result<BTreeMap<AxisId, SyringeAxisConfig>> {
        let mut axes = BTreeMap::new();

        for (name, axis_config) in &self.axes {
            let axis = name.parse::<AxisId>().map_err(|e| {
                DispenserError::InvalidConfiguration {
                    axis: name.clone(),
                    reason: e.to_string(),
                }
            })?;

            axis_config.validate(name)?;

            if axes.insert(axis, *axis_config).is_some() {
                return Err(DispenserError::InvalidConfiguration {
                    axis: name.clone(),
                    reason: format!("axis {axis} is configured more than once"),
                });
            }
        }

        Ok(axes)
    }
}

impl Default for SyringePumpConfig {
    fn default() -> Self {
        Self {
            port: String::from("/dev/ttyACM0"),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,

            axes: AxisId::ALL
                .iter()
                .map(|axis| (axis.to_string(), SyringeAxisConfig::default()))
                .collect(),
        }
    }
}
