use grbl::AxisId;
use utilities::command_executor::CommandSender;

use super::commands::{PumpCommand, PumpResponse};
use crate::{
    dispenser::SpeedLimits,
    error::{DispenserError, Result},
};

#[derive(Clone)]
pub struct PumpCommandSender {
    sender: CommandSender<PumpCommand>,
}

impl PumpCommandSender {
    pub fn new(sender: CommandSender<PumpCommand>) -> Self {
        Self { sender }
    }

    pub async fn dispense(&self, axis: AxisId, volume: f64, duration: Option<f64>) -> Result<f64> {
        let response = self
            .sender
            .send_command(PumpCommand::Dispense {
                axis,
                volume,
                duration,
            })
            .await?;

        match response {
            PumpResponse::Dispensed(elapsed) => Ok(elapsed),
            _ => Err(DispenserError::UnexpectedResponse),
        }
    }

    pub async fn speed_limits(&self, axis: AxisId) -> Result<SpeedLimits> {
        let response = self
            .sender
            .send_command(PumpCommand::SpeedLimits { axis })
            .await?;

        match response {
            PumpResponse::SpeedLimits(limits) => Ok(limits),
            _ => Err(DispenserError::UnexpectedResponse),
        }
    }

    pub async fn reopen(&self) -> Result<()> {
        let response = self.sender.send_command(PumpCommand::Reopen).await?;

        match response {
            PumpResponse::Ok => Ok(()),
            _ => Err(DispenserError::UnexpectedResponse),
        }
    }
}
