use std::io::{self, Write};

use crate::AxisId;

/// Text commands understood by the controller. Every command is a single
/// newline-terminated ASCII line; replies are not read here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrblCommand {
    /// `$10n` setting, steps per millimeter of travel.
    StepsPerMm { axis: AxisId, steps_per_mm: f64 },
    /// `$11n` setting, maximum feed rate in mm/min.
    MaxRate { axis: AxisId, mm_per_min: f64 },
    /// Relative linear move, `distance` in mm and `feed_rate` in mm/min.
    RelativeMove {
        axis: AxisId,
        distance: f64,
        feed_rate: f64,
    },
}

impl GrblCommand {
    pub fn line(&self) -> String {
        match self {
            GrblCommand::StepsPerMm { axis, steps_per_mm } => {
                format!("$10{}={}\n", axis.controller_index(), steps_per_mm)
            }
            GrblCommand::MaxRate { axis, mm_per_min } => {
                format!("$11{}={}\n", axis.controller_index(), mm_per_min)
            }
            GrblCommand::RelativeMove {
                axis,
                distance,
                feed_rate,
            } => format!("G91 G1 {}{} F{}\n", axis.letter(), distance, feed_rate),
        }
    }

    pub fn send(&self, sender: &mut impl Write) -> io::Result<()> {
        sender.write_all(self.line().as_bytes())?;
        sender.flush()
    }
}
