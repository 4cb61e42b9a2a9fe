use grbl::AxisId;

use crate::{
    command_executor::pump::{command_sender::PumpCommandSender, commands::PumpCommand},
    error::DispenserError,
};

#[derive(Debug, PartialEq)]
pub enum Request {
    Command(PumpCommand),
    /// The axis name did not match any controller axis.
    UnknownAxis(String),
}

/// Parses one control line:
///
/// ```text
/// dispense:<axis>:<volume>[:<duration>]
/// limits:<axis>
/// reopen
/// ```
pub fn parse_command(cmd_str: &str) -> Option<Request> {
    let parts: Vec<&str> = cmd_str.trim().split(':').collect();

    let axis = |name: &str| name.parse::<AxisId>().map_err(|_| name.trim().to_string());

    let command = match parts[0] {
        "dispense" => {
            if parts.len() != 3 && parts.len() != 4 {
                return None;
            }
            let volume = parts[2].trim().parse::<f64>().ok()?;
            let duration = match parts.get(3) {
                Some(duration) => Some(duration.trim().parse::<f64>().ok()?),
                None => None,
            };

            match axis(parts[1]) {
                Ok(axis) => PumpCommand::Dispense {
                    axis,
                    volume,
                    duration,
                },
                Err(name) => return Some(Request::UnknownAxis(name)),
            }
        }
        "limits" => {
            if parts.len() != 2 {
                return None;
            }

            match axis(parts[1]) {
                Ok(axis) => PumpCommand::SpeedLimits { axis },
                Err(name) => return Some(Request::UnknownAxis(name)),
            }
        }
        "reopen" => {
            if parts.len() != 1 {
                return None;
            }
            PumpCommand::Reopen
        }
        _ => return None,
    };

    Some(Request::Command(command))
}

/// Runs one control line against the pump and renders the reply line.
pub async fn handle_line(line: &str, sender: &PumpCommandSender) -> String {
    let command = match parse_command(line) {
        Some(Request::Command(command)) => command,
        Some(Request::UnknownAxis(name)) => {
            return format_error(&DispenserError::UnknownAxis(name));
        }
        None => return "err:malformed command".to_string(),
    };

    let reply = match command {
        PumpCommand::Dispense {
            axis,
            volume,
            duration,
        } => sender
            .dispense(axis, volume, duration)
            .await
            .map(|elapsed| format!("ok:{elapsed}")),
        PumpCommand::SpeedLimits { axis } => sender
            .speed_limits(axis)
            .await
            .map(|limits| format!("ok:{}:{}", limits.min_speed, limits.max_speed)),
        PumpCommand::Reopen => sender.reopen().await.map(|_| "ok".to_string()),
    };

    reply.unwrap_or_else(|e| format_error(&e))
}

fn format_error(error: &DispenserError) -> String {
    format!("err:{error}")
}
