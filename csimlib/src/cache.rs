use std::fmt::{Display, Formatter};
use tracing::{debug, trace};
use crate::config::CacheConfig;
use crate::error::SimulatorError;
use crate::replacement_policies::{LeastRecentlyUsed, ReplacementPolicy};

/// A single cache slot. No data is stored, only enough to classify accesses
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct Line {
    pub valid: bool,
    pub tag: u64,
    /// Logical clock maintained by the replacement policy, only comparable within one set
    pub recency: u64,
}

/// The outcome of looking a tag up in a set
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Access {
    Hit,
    /// An empty line was filled
    Miss,
    /// A valid line was displaced
    MissWithEviction,
}

impl Display for Access {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Access::Hit => write!(f, "hit"),
            Access::Miss => write!(f, "miss"),
            Access::MissWithEviction => write!(f, "miss eviction"),
        }
    }
}

/// A set-associative cache, parameterised by a replacement policy
///
/// The sets are stored back to back in one flat vector, set `n` being the `E` lines starting at
/// `n * E`. Only the relevant set is ever searched
pub struct Cache<R: ReplacementPolicy = LeastRecentlyUsed> {
    lines: Vec<Line>,
    replacement_policy: R,
    set_size: usize,
    set_bits: u32,
    block_bits: u32,
    set_selection_bit_mask: u64,
}

impl Cache<LeastRecentlyUsed> {
    /// Creates an LRU cache for a configuration
    pub fn lru(config: &CacheConfig) -> Result<Self, SimulatorError> {
        Self::new(config, LeastRecentlyUsed)
    }
}

impl<R: ReplacementPolicy> Cache<R> {
    /// Creates a cache with every line invalid
    ///
    /// The configuration is validated first, and the whole line grid is reserved up front so an
    /// allocation failure is reported instead of leaving a partially built cache
    ///
    /// # Arguments
    ///
    /// * `config`: The shape of the cache
    /// * `policy`: The replacement policy used on misses
    ///
    /// returns: Result<Cache<R>, SimulatorError>
    pub fn new(config: &CacheConfig, policy: R) -> Result<Self, SimulatorError> {
        config.validate()?;
        let num_lines = config.num_lines()?;
        let mut lines = Vec::new();
        lines
            .try_reserve_exact(num_lines)
            .map_err(|_| SimulatorError::Allocation { lines: num_lines })?;
        lines.resize(num_lines, Line::default());
        debug!(
            sets = config.num_sets(),
            lines_per_set = config.lines_per_set,
            block_size = config.block_size(),
            "Built cache"
        );
        Ok(Self {
            lines,
            replacement_policy: policy,
            set_size: config.lines_per_set as usize,
            set_bits: config.set_bits,
            block_bits: config.block_bits,
            set_selection_bit_mask: config.num_sets() - 1,
        })
    }

    /// Splits an address into its set index and tag. The block offset bits are dropped
    ///
    /// # Arguments
    ///
    /// * `address`:
    ///
    /// returns: (usize, u64)
    pub fn address_to_set_and_tag(&self, address: u64) -> (usize, u64) {
        let set = (address >> self.block_bits) & self.set_selection_bit_mask;
        let tag = address >> (self.block_bits + self.set_bits);
        (set as usize, tag)
    }

    /// Looks a tag up in one set, updating the set as a real cache would
    ///
    /// A hit refreshes the matching line. A miss reloads the line chosen by the replacement
    /// policy, which is an eviction if that line was already valid
    ///
    /// # Arguments
    ///
    /// * `set_index`: Must be below the number of sets
    /// * `tag`:
    ///
    /// returns: Access
    pub fn classify(&mut self, set_index: usize, tag: u64) -> Access {
        let lower_bound = set_index * self.set_size;
        let set = &mut self.lines[lower_bound..lower_bound + self.set_size];
        // At most one valid line holds a tag, stop at the first
        if let Some(index) = set.iter().position(|line| line.valid && line.tag == tag) {
            self.replacement_policy.update_on_use(set, index);
            trace!(set_index, tag, line = index, "hit");
            return Access::Hit;
        }
        let index = self.replacement_policy.get_victim(set);
        let victim = &mut set[index];
        let access = if victim.valid {
            Access::MissWithEviction
        } else {
            victim.valid = true;
            Access::Miss
        };
        victim.tag = tag;
        self.replacement_policy.update_on_use(set, index);
        trace!(set_index, tag, line = index, %access);
        access
    }

    /// Classifies an access to the block holding `address`
    pub fn read_and_update_line(&mut self, address: u64) -> Access {
        let (set, tag) = self.address_to_set_and_tag(address);
        self.classify(set, tag)
    }

    /// The lines of one set, in index order
    pub fn set(&self, set_index: usize) -> &[Line] {
        let lower_bound = set_index * self.set_size;
        &self.lines[lower_bound..lower_bound + self.set_size]
    }

    pub fn num_sets(&self) -> usize {
        self.lines.len() / self.set_size
    }

    /// Gets the number of lines which have never been filled. Useful for analysing cache
    /// performance or debugging
    pub fn get_invalid_line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.valid).count()
    }
}
