pub mod command_executor;
pub mod commands;
pub mod config;
pub mod controllers;
pub mod dispenser;
pub mod error;
pub mod logging;

pub use controllers::syringe_pump::{
    calibration::AxisCalibration,
    config::{SyringeAxisConfig, SyringePumpConfig},
    pump::{DispensePlan, SyringePump},
};
pub use dispenser::{ReagentDispenser, SpeedLimits};
pub use error::DispenserError;
pub use grbl::AxisId;
