use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use crate::config::ConfigError;

/// Everything that can stop a simulation. None of these are recoverable, a run either finishes
/// with a complete result or fails with one of these
#[derive(Debug)]
pub enum SimulatorError {
    Config(ConfigError),
    /// The line grid couldn't be reserved
    Allocation { lines: usize },
    /// Reading the trace or writing verbose output failed
    Io(io::Error),
}

impl Display for SimulatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulatorError::Config(e) => write!(f, "Invalid cache configuration: {e}"),
            SimulatorError::Allocation { lines } => write!(f, "Couldn't allocate a cache of {lines} lines"),
            SimulatorError::Io(e) => write!(f, "I/O error during simulation: {e}"),
        }
    }
}

impl Error for SimulatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SimulatorError::Config(e) => Some(e),
            SimulatorError::Allocation { .. } => None,
            SimulatorError::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SimulatorError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<io::Error> for SimulatorError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}
