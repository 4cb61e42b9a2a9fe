use std::io::{self, Write};

use commands::PumpCommand;
use grbl::AxisId;
use utilities::{command_executor::DeviceHandler, lazy_serial::LazySerialPort};

use crate::{
    controllers::syringe_pump::pump::SyringePump,
    dispenser::SpeedLimits,
    error::{DispenserError, Result},
};

pub mod command_sender;
pub mod commands;

/// Byte sink the pump writes controller commands to.
pub trait PumpTransport: Write + Send {
    fn reopen(&mut self) -> io::Result<()>;
}

impl PumpTransport for LazySerialPort {
    fn reopen(&mut self) -> io::Result<()> {
        LazySerialPort::reopen(self)
    }
}

pub struct PumpHandler {
    pump: SyringePump<Box<dyn PumpTransport>>,
}

impl DeviceHandler for PumpHandler {
    type Command = PumpCommand;
    type Error = DispenserError;
}

impl PumpHandler {
    pub fn new(pump: SyringePump<Box<dyn PumpTransport>>) -> Self {
        Self { pump }
    }

    pub fn dispense(&mut self, axis: AxisId, volume: f64, duration: Option<f64>) -> Result<f64> {
        self.pump.dispense(axis, volume, duration)
    }

    pub fn speed_limits(&self, axis: AxisId) -> Result<SpeedLimits> {
        self.pump.speed_limits(axis)
    }

    pub fn reopen(&mut self) -> Result<()> {
        self.pump.transport_mut().reopen()?;
        Ok(())
    }

    pub fn into_pump(self) -> SyringePump<Box<dyn PumpTransport>> {
        self.pump
    }
}
