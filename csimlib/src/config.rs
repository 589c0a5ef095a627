use std::error::Error;
use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};

/// The shape of a simulated cache: 2^s sets of E lines, each holding a 2^b byte block
///
/// Can be read from JSON, either with the full field names or the short `s`, `E` and `b` names
/// used on the command line
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(alias = "s")]
    pub set_bits: u32,
    #[serde(alias = "E")]
    pub lines_per_set: u32,
    #[serde(alias = "b")]
    pub block_bits: u32,
}

/// Rejected cache shapes. Raised before anything is allocated
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ConfigError {
    ZeroSetBits,
    ZeroLinesPerSet,
    ZeroBlockBits,
    /// The set index and block offset leave no room for a tag in a 64-bit address
    AddressBitsExceeded { set_bits: u32, block_bits: u32 },
    /// The S x E line grid can't be addressed on this platform
    TooManyLines { set_bits: u32, lines_per_set: u32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ZeroSetBits => write!(f, "the number of set index bits (s) must be at least 1"),
            ConfigError::ZeroLinesPerSet => write!(f, "the number of lines per set (E) must be at least 1"),
            ConfigError::ZeroBlockBits => write!(f, "the number of block bits (b) must be at least 1"),
            ConfigError::AddressBitsExceeded { set_bits, block_bits } => write!(
                f,
                "s + b must be less than {} (got s = {set_bits}, b = {block_bits})",
                u64::BITS
            ),
            ConfigError::TooManyLines { set_bits, lines_per_set } => write!(
                f,
                "a cache of 2^{set_bits} sets with {lines_per_set} lines each is too large to simulate"
            ),
        }
    }
}

impl Error for ConfigError {}

impl CacheConfig {
    pub fn new(set_bits: u32, lines_per_set: u32, block_bits: u32) -> Self {
        Self {
            set_bits,
            lines_per_set,
            block_bits,
        }
    }

    /// Checks the configuration describes a cache that can be built and addressed
    ///
    /// returns: Result<(), ConfigError>
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.set_bits == 0 {
            return Err(ConfigError::ZeroSetBits);
        }
        if self.lines_per_set == 0 {
            return Err(ConfigError::ZeroLinesPerSet);
        }
        if self.block_bits == 0 {
            return Err(ConfigError::ZeroBlockBits);
        }
        if self.set_bits + self.block_bits >= u64::BITS {
            return Err(ConfigError::AddressBitsExceeded {
                set_bits: self.set_bits,
                block_bits: self.block_bits,
            });
        }
        self.num_lines().map(|_| ())
    }

    /// Number of sets, S = 2^s
    pub fn num_sets(&self) -> u64 {
        1u64 << self.set_bits
    }

    /// Block size in bytes, B = 2^b
    pub fn block_size(&self) -> u64 {
        1u64 << self.block_bits
    }

    /// Total number of lines in the cache, S x E, if it fits in memory addressing
    pub fn num_lines(&self) -> Result<usize, ConfigError> {
        let too_many = ConfigError::TooManyLines {
            set_bits: self.set_bits,
            lines_per_set: self.lines_per_set,
        };
        let sets = 1usize.checked_shl(self.set_bits).ok_or(too_many.clone())?;
        sets.checked_mul(self.lines_per_set as usize).ok_or(too_many)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_parameters() {
        assert_eq!(CacheConfig::new(0, 1, 1).validate(), Err(ConfigError::ZeroSetBits));
        assert_eq!(CacheConfig::new(1, 0, 1).validate(), Err(ConfigError::ZeroLinesPerSet));
        assert_eq!(CacheConfig::new(1, 1, 0).validate(), Err(ConfigError::ZeroBlockBits));
    }

    #[test]
    fn rejects_address_overflow() {
        assert_eq!(
            CacheConfig::new(32, 1, 32).validate(),
            Err(ConfigError::AddressBitsExceeded { set_bits: 32, block_bits: 32 })
        );
        assert!(CacheConfig::new(4, 1, 59).validate().is_ok());
    }

    #[test]
    fn rejects_unaddressable_grid() {
        let config = CacheConfig::new(62, u32::MAX, 1);
        assert!(matches!(config.validate(), Err(ConfigError::TooManyLines { .. })));
    }

    #[test]
    fn derived_sizes() {
        let config = CacheConfig::new(4, 2, 5);
        assert_eq!(config.num_sets(), 16);
        assert_eq!(config.block_size(), 32);
        assert_eq!(config.num_lines(), Ok(32));
    }

    #[test]
    fn parses_short_and_long_names() {
        let short: CacheConfig = serde_json::from_str(r#"{"s": 4, "E": 1, "b": 4}"#).unwrap();
        let long: CacheConfig = serde_json::from_str(r#"{"set_bits": 4, "lines_per_set": 1, "block_bits": 4}"#).unwrap();
        assert_eq!(short, long);
        assert_eq!(short, CacheConfig::new(4, 1, 4));
    }
}
