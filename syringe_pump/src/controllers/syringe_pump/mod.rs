pub mod calibration;
pub mod config;
pub mod pump;

use utilities::{command_executor::CommandExecutor, lazy_serial::LazySerialPort};

use crate::{
    command_executor::pump::{PumpHandler, PumpTransport, command_sender::PumpCommandSender},
    controllers::syringe_pump::{config::SyringePumpConfig, pump::SyringePump},
    error::Result,
};

pub fn create_transport(config: &SyringePumpConfig) -> LazySerialPort {
    LazySerialPort::new(config.port.clone(), config.baud_rate, config.timeout())
}

/// Calibrates the pump over `transport` and wraps it in an executor so
/// several tasks can share the single connection.
pub fn create_pump(
    config: &SyringePumpConfig,
    transport: Box<dyn PumpTransport>,
) -> Result<(CommandExecutor<PumpHandler>, PumpCommandSender)> {
    let pump = SyringePump::new(config, transport)?;

    let executor = CommandExecutor::new(PumpHandler::new(pump));
    let sender = PumpCommandSender::new(executor.sender());

    Ok((executor, sender))
}
