use std::fmt::{Display, Formatter};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Leading whitespace, an operation letter, then a hex address. Anything after the address other
    // than an optional ",<size>" is ignored
    static ref TRACE_LINE: Regex = Regex::new(r"^\s*([A-Za-z])\s+(?:0[xX])?([0-9a-fA-F]+)(?:,(\d+))?").unwrap();
}

/// The kind of memory access recorded on a trace line
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OperationKind {
    /// Instruction fetch, never simulated
    Instruction,
    Load,
    Store,
    /// A load followed by a store to the same address
    Modify,
}

impl OperationKind {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'I' => Some(OperationKind::Instruction),
            'L' => Some(OperationKind::Load),
            'S' => Some(OperationKind::Store),
            'M' => Some(OperationKind::Modify),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            OperationKind::Instruction => 'I',
            OperationKind::Load => 'L',
            OperationKind::Store => 'S',
            OperationKind::Modify => 'M',
        }
    }

    /// Number of cache accesses the operation makes
    pub fn accesses(self) -> usize {
        match self {
            OperationKind::Instruction => 0,
            OperationKind::Load | OperationKind::Store => 1,
            OperationKind::Modify => 2,
        }
    }
}

/// A single parsed trace line
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub address: u64,
    /// Access size in bytes, if the line has one. Not used for classification
    pub size: Option<u32>,
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {:x}", self.kind.code(), self.address)?;
        if let Some(size) = self.size {
            write!(f, ",{size}")?;
        }
        Ok(())
    }
}

/// Parses one line of a trace
///
/// Lines which don't have the expected shape, have an unknown operation code, or have an address
/// too large for 64 bits return None. Instruction fetches are returned like any other operation,
/// it's up to the caller to skip them
///
/// # Arguments
///
/// * `line`: A single line, with or without its line ending
///
/// returns: Option<Operation>
///
/// # Examples
///
/// ```
/// use csimlib::trace::{parse_line, OperationKind};
/// let op = parse_line(" M 7ff000398,8").unwrap();
/// assert_eq!(op.kind, OperationKind::Modify);
/// assert_eq!(op.address, 0x7ff000398);
/// assert_eq!(op.size, Some(8));
/// ```
pub fn parse_line(line: &str) -> Option<Operation> {
    let captures = TRACE_LINE.captures(line)?;
    let code = captures.get(1)?.as_str().chars().next()?;
    let kind = OperationKind::from_code(code)?;
    let address = u64::from_str_radix(captures.get(2)?.as_str(), 16).ok()?;
    let size = captures.get(3).and_then(|size| size.as_str().parse().ok());
    Some(Operation { kind, address, size })
}
