use std::{fmt, str::FromStr};

pub mod command;

pub use command::GrblCommand;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AxisError {
    #[error("Unsupported axis '{0}', expected one of X, Y, Z")]
    UnsupportedAxis(String),
}

/// Syringe axis as addressed by the controller.
///
/// The letter is what goes into motion commands, the index is what the
/// `$10x`/`$11x` settings use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AxisId {
    X,
    Y,
    Z,
}

impl AxisId {
    pub const ALL: [AxisId; 3] = [AxisId::X, AxisId::Y, AxisId::Z];

    pub fn letter(&self) -> char {
        match self {
            AxisId::X => 'X',
            AxisId::Y => 'Y',
            AxisId::Z => 'Z',
        }
    }

    pub fn controller_index(&self) -> u8 {
        match self {
            AxisId::X => 0,
            AxisId::Y => 1,
            AxisId::Z => 2,
        }
    }
}

impl fmt::Display for AxisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for AxisId {
    type Err = AxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "X" => Ok(AxisId::X),
            "Y" => Ok(AxisId::Y),
            "Z" => Ok(AxisId::Z),
            _ => Err(AxisError::UnsupportedAxis(s.to_string())),
        }
    }
}
