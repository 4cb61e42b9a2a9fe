use std::{collections::BTreeMap, io::Write};

use grbl::{AxisId, GrblCommand};
use tracing::{debug, info, warn};

use super::{
    calibration::{AxisCalibration, calibrate},
    config::{SyringeAxisConfig, SyringePumpConfig},
};
use crate::{
    dispenser::{ReagentDispenser, SpeedLimits},
    error::{DispenserError, Result},
};

/// Motion worked out for one dispense request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispensePlan {
    pub axis: AxisId,
    /// Signed travel in mm, negative withdraws.
    pub distance: f64,
    /// mm/min actually used, after clamping.
    pub feed_rate: f64,
    /// Seconds the move takes at `feed_rate`.
    pub elapsed: f64,
    pub clamped: bool,
}

impl DispensePlan {
    pub fn command(&self) -> GrblCommand {
        GrblCommand::RelativeMove {
            axis: self.axis,
            distance: self.distance,
            feed_rate: self.feed_rate,
        }
    }
}

struct PumpAxis {
    config: SyringeAxisConfig,
    calibration: AxisCalibration,
}

/// Syringe pump bank driven through a GRBL controller.
pub struct SyringePump<W: Write> {
    axes: BTreeMap<AxisId, PumpAxis>,
    transport: W,
}

impl<W: Write> SyringePump<W> {
    pub fn new(config: &SyringePumpConfig, transport: W) -> Result<Self> {
        Self::with_axes(config.resolved_axes()?, transport)
    }

    pub fn with_axes(
        configs: BTreeMap<AxisId, SyringeAxisConfig>,
        mut transport: W,
    ) -> Result<Self> {
        let calibrations = calibrate(&configs, &mut transport)?;

        let axes = calibrations
            .into_iter()
            .zip(configs.into_values())
            .map(|((axis, calibration), config)| {
                (
                    axis,
                    PumpAxis {
                        config,
                        calibration,
                    },
                )
            })
            .collect();

        Ok(Self { axes, transport })
    }

    fn axis(&self, axis: AxisId) -> Result<&PumpAxis> {
        self.axes
            .get(&axis)
            .ok_or_else(|| DispenserError::UnknownAxis(axis.to_string()))
    }

    pub fn axes(&self) -> impl Iterator<Item = AxisId> + '_ {
        self.axes.keys().copied()
    }

    pub fn calibration(&self, axis: AxisId) -> Result<AxisCalibration> {
        Ok(self.axis(axis)?.calibration)
    }

    /// Works out distance, feed rate and duration without touching the
    /// transport.
    pub fn plan_dispense(
        &self,
        axis: AxisId,
        volume: f64,
        duration: Option<f64>,
    ) -> Result<DispensePlan> {
        let pump_axis = self.axis(axis)?;

        if !volume.is_finite() || volume == 0.0 {
            return Err(DispenserError::InvalidVolume(volume));
        }
        if let Some(duration) = duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(DispenserError::InvalidDuration(duration));
            }
        }

        let SyringeAxisConfig {
            mm_per_ml,
            max_mm_per_min,
            ..
        } = pump_axis.config;

        let mut feed_rate = max_mm_per_min;
        let mut clamped = false;

        if let Some(duration) = duration {
            // Direction lives in the sign of the distance, the rate is a magnitude.
            let requested = volume.abs() * mm_per_ml * 60.0 / duration;
            if requested > max_mm_per_min {
                clamped = true;
            } else {
                feed_rate = requested;
            }
        }

        let distance = volume * mm_per_ml;
        if !distance.is_finite() || distance == 0.0 {
            return Err(DispenserError::InvalidVolume(volume));
        }
        // A long duration can push the requested rate below what f64 holds.
        if !feed_rate.is_finite() || feed_rate <= 0.0 {
            return Err(DispenserError::InvalidDuration(duration.unwrap_or(0.0)));
        }

        let elapsed = distance.abs() * 60.0 / feed_rate;
        if !elapsed.is_finite() {
            return Err(DispenserError::InvalidVolume(volume));
        }

        Ok(DispensePlan {
            axis,
            distance,
            feed_rate,
            elapsed,
            clamped,
        })
    }

    pub fn dispense(&mut self, axis: AxisId, volume: f64, duration: Option<f64>) -> Result<f64> {
        let plan = self.plan_dispense(axis, volume, duration)?;
        let min_mm_per_min = self.axis(axis)?.calibration.min_mm_per_min;

        if plan.clamped {
            warn!(
                "Requested rate for {} ml on axis {} exceeds the axis limit, using {} mm/min",
                volume, axis, plan.feed_rate
            );
        }
        if plan.feed_rate < min_mm_per_min {
            warn!(
                "Feed rate {} mm/min on axis {} is below the reliable floor of {} mm/min",
                plan.feed_rate, axis, min_mm_per_min
            );
        }

        let command = plan.command();
        debug!("Dispensing with command '{}'", command.line().trim_end());
        command.send(&mut self.transport)?;

        info!(
            "Dispensing {} ml with motor speed of {} mm/min over {} seconds",
            volume, plan.feed_rate, plan.elapsed
        );

        Ok(plan.elapsed)
    }

    pub fn speed_limits(&self, axis: AxisId) -> Result<SpeedLimits> {
        let PumpAxis {
            config,
            calibration,
        } = self.axis(axis)?;

        Ok(SpeedLimits {
            min_speed: calibration.min_mm_per_min / config.mm_per_ml / 60.0,
            max_speed: config.max_mm_per_min / config.mm_per_ml / 60.0,
        })
    }

    pub fn transport(&self) -> &W {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut W {
        &mut self.transport
    }

    pub fn into_transport(self) -> W {
        self.transport
    }
}

impl<W: Write> ReagentDispenser for SyringePump<W> {
    fn dispense(&mut self, axis: AxisId, volume: f64, duration: Option<f64>) -> Result<f64> {
        SyringePump::dispense(self, axis, volume, duration)
    }

    fn speed_limits(&self, axis: AxisId) -> Result<SpeedLimits> {
        SyringePump::speed_limits(self, axis)
    }
}
