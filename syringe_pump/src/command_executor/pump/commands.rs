use grbl::AxisId;
use utilities::command_executor::Command;

use crate::{command_executor::pump::PumpHandler, dispenser::SpeedLimits, error::DispenserError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpCommand {
    Dispense {
        axis: AxisId,
        volume: f64,
        duration: Option<f64>,
    },
    SpeedLimits {
        axis: AxisId,
    },
    Reopen,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PumpResponse {
    Dispensed(f64),
    SpeedLimits(SpeedLimits),
    Ok,
}

impl Command for PumpCommand {
    type Response = PumpResponse;
    type Handler = PumpHandler;

    fn execute(self, handler: &mut Self::Handler) -> Result<Self::Response, DispenserError> {
        match self {
            PumpCommand::Dispense {
                axis,
                volume,
                duration,
            } => {
                let elapsed = handler.dispense(axis, volume, duration)?;
                Ok(PumpResponse::Dispensed(elapsed))
            }
            PumpCommand::SpeedLimits { axis } => {
                let limits = handler.speed_limits(axis)?;
                Ok(PumpResponse::SpeedLimits(limits))
            }
            PumpCommand::Reopen => {
                handler.reopen()?;
                Ok(PumpResponse::Ok)
            }
        }
    }
}
