use std::fmt::{Display, Formatter};
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use crate::cache::{Access, Cache};
use crate::config::CacheConfig;
use crate::error::SimulatorError;
use crate::replacement_policies::{LeastRecentlyUsed, ReplacementPolicy};
use crate::trace::{parse_line, Operation, OperationKind};

/// The simulator replays traces against a cache, and collects results.
///
/// It supports calling simulate multiple times, the cache stays warm between calls, and the time
/// taken and the results accumulate accordingly
pub struct Simulator<R: ReplacementPolicy = LeastRecentlyUsed> {
    cache: Cache<R>,
    result: SimulationResult,
    simulation_time: Duration,
}

/// The totals of a simulation. Displays as the summary line, and can be serialised as JSON
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct SimulationResult {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl SimulationResult {
    pub fn record(&mut self, access: Access) {
        match access {
            Access::Hit => self.hits += 1,
            Access::Miss => self.misses += 1,
            Access::MissWithEviction => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }
}

impl Display for SimulationResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "hits:{} misses:{} evictions:{}", self.hits, self.misses, self.evictions)
    }
}

/// What happened to a single simulated operation. Displays as a verbose trace record, e.g.
/// `M 20,1 miss eviction hit`
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OperationOutcome {
    pub operation: Operation,
    accesses: [Option<Access>; 2],
}

impl OperationOutcome {
    /// The outcome of each cache access the operation made, in order
    pub fn accesses(&self) -> impl Iterator<Item = Access> + '_ {
        self.accesses.iter().flatten().copied()
    }
}

impl Display for OperationOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.operation)?;
        for access in self.accesses() {
            write!(f, " {access}")?;
        }
        Ok(())
    }
}

impl Simulator<LeastRecentlyUsed> {
    /// Creates a new LRU simulator for a given configuration
    ///
    /// # Arguments
    ///
    /// * `config`: A cache configuration, from the command line or parsed from JSON
    ///
    /// returns: Result<Simulator, SimulatorError>
    pub fn new(config: &CacheConfig) -> Result<Self, SimulatorError> {
        Ok(Self::with_cache(Cache::lru(config)?))
    }
}

impl<R: ReplacementPolicy> Simulator<R> {
    /// Creates a simulator around an existing cache
    pub fn with_cache(cache: Cache<R>) -> Self {
        Self {
            cache,
            result: SimulationResult::default(),
            simulation_time: Duration::new(0, 0),
        }
    }

    /// Simulates a single operation, returning None for instruction fetches which never touch
    /// the cache
    ///
    /// A modify is a load followed by a store, so it accesses the same block twice. The second
    /// access is always a hit
    ///
    /// # Arguments
    ///
    /// * `operation`: The parsed operation
    ///
    /// returns: Option<OperationOutcome>, internally the result is updated
    pub fn execute(&mut self, operation: Operation) -> Option<OperationOutcome> {
        if operation.kind == OperationKind::Instruction {
            return None;
        }
        let mut accesses = [None; 2];
        for slot in accesses.iter_mut().take(operation.kind.accesses()) {
            let access = self.cache.read_and_update_line(operation.address);
            self.result.record(access);
            *slot = Some(access);
        }
        Some(OperationOutcome { operation, accesses })
    }

    /// Simulates the cache over a trace, calling `observer` with every simulated operation
    ///
    /// Lines which can't be parsed are skipped, they don't count towards the results. Reads are
    /// sequential, one line at a time, so memory mapped input can be advised accordingly
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace
    /// * `observer`: Called once per load, store and modify, after it has been classified. An
    /// error from it stops the simulation
    ///
    /// returns: Result<&SimulationResult, SimulatorError>
    pub fn simulate_with<B, F>(&mut self, mut reader: B, mut observer: F) -> Result<&SimulationResult, SimulatorError>
    where
        B: BufRead,
        F: FnMut(&OperationOutcome) -> std::io::Result<()>,
    {
        let start = Instant::now();
        let mut buffer = Vec::new();
        let mut line_number = 0u64;
        loop {
            buffer.clear();
            if reader.read_until(b'\n', &mut buffer)? == 0 {
                break;
            }
            line_number += 1;
            let operation = match std::str::from_utf8(&buffer).ok().and_then(parse_line) {
                Some(operation) => operation,
                None => {
                    debug!(line_number, "Skipping malformed trace line");
                    continue;
                }
            };
            if let Some(outcome) = self.execute(operation) {
                observer(&outcome)?;
            }
        }
        let end = Instant::now();
        self.simulation_time += end - start;
        info!(
            hits = self.result.hits,
            misses = self.result.misses,
            evictions = self.result.evictions,
            lines = line_number,
            "Simulation finished"
        );
        Ok(&self.result)
    }

    /// Simulates the cache over a trace
    pub fn simulate<B: BufRead>(&mut self, reader: B) -> Result<&SimulationResult, SimulatorError> {
        self.simulate_with(reader, |_| Ok(()))
    }

    /// Simulates the cache over a trace, writing a record of every simulated operation to `out`
    pub fn simulate_verbose<B: BufRead, W: Write>(&mut self, reader: B, out: &mut W) -> Result<&SimulationResult, SimulatorError> {
        self.simulate_with(reader, |outcome| writeln!(out, "{outcome}"))
    }

    pub fn get_result(&self) -> &SimulationResult {
        &self.result
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of lines never filled during the simulation
    pub fn get_invalid_line_count(&self) -> usize {
        self.cache.get_invalid_line_count()
    }

    pub fn cache(&self) -> &Cache<R> {
        &self.cache
    }
}

/// Replays a whole trace against a fresh LRU cache
///
/// The cache only lives for the duration of the call. When `verbose` is set, a record of every
/// simulated operation is printed to stdout
///
/// # Arguments
///
/// * `reader`: The trace, already opened
/// * `config`: The shape of the cache
/// * `verbose`: Whether to print a record per operation
///
/// returns: Result<SimulationResult, SimulatorError>
///
/// # Examples
///
/// ```
/// use csimlib::config::CacheConfig;
/// use csimlib::simulator::replay;
/// let trace = " L 10,1\n M 20,1\n L 10,1\n";
/// let result = replay(trace.as_bytes(), &CacheConfig::new(1, 1, 1), false).unwrap();
/// assert_eq!(result.to_string(), "hits:1 misses:3 evictions:2");
/// ```
pub fn replay<B: BufRead>(reader: B, config: &CacheConfig, verbose: bool) -> Result<SimulationResult, SimulatorError> {
    let mut simulator = Simulator::new(config)?;
    let result = if verbose {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        *simulator.simulate_verbose(reader, &mut out)?
    } else {
        *simulator.simulate(reader)?
    };
    Ok(result)
}
