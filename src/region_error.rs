//! RegionError: unified error type for geo-regions public APIs
//!
//! Every failure the engine can detect is fatal to the current run. The
//! variants name the violated invariant and where it was observed so a batch
//! job can report it verbatim.

use thiserror::Error;

/// Unified error type for container, queue, traversal and persistence faults.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegionError {
    /// Index past the end of a fixed or growable container.
    #[error("index {index} out of range for {container} of length {len}")]
    IndexOutOfRange {
        container: &'static str,
        index: usize,
        len: usize,
    },
    /// A bounded structure was asked to hold more than its static capacity.
    #[error("{container} capacity {capacity} exceeded")]
    CapacityExceeded {
        container: &'static str,
        capacity: usize,
    },
    /// An id outside the dense domain a queue or array was sized for.
    #[error("id {id} outside domain of size {domain}")]
    IdOutOfDomain { id: usize, domain: usize },
    /// `add` called for an id that is already in the frontier.
    #[error("id {0} is already queued")]
    AlreadyQueued(usize),
    /// NaN or negative cost handed to the priority queue.
    #[error("invalid cost {cost} for id {id}")]
    InvalidCost { id: usize, cost: f64 },
    /// Two inputs that must share a cardinality do not.
    #[error("length mismatch for {what}: expected {expected}, got {found}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Grid dimensions must both be positive, and the width even (or 1)
    /// when rows reflect across the poles.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidGrid { width: u32, height: u32 },
    /// An edge references a node that does not exist.
    #[error("edge {edge} references missing node {node} (node count {nodes})")]
    InvalidEdge {
        edge: usize,
        node: usize,
        nodes: usize,
    },
    /// Edge weights must be finite and non-negative.
    #[error("edge {edge} has invalid weight {weight}")]
    InvalidWeight { edge: usize, weight: f64 },
    /// A categorical label does not fit the tally table.
    #[error("label {label} at id {id} exceeds label count {label_count}")]
    LabelOutOfRange {
        id: usize,
        label: u32,
        label_count: usize,
    },
    /// A commonest-label query over a tally with no votes.
    #[error("commonest label requested over an empty tally")]
    EmptyTally,
    /// A labelled id whose seed does not label itself.
    #[error("id {id} settled with label {label}, which is not a seed")]
    MissingSeedAncestor { id: usize, label: usize },
    /// A seed ancestor whose owner is not of the expected source kind.
    #[error("id {id} traced to seed {seed} which is not a {expected} node")]
    UnexpectedSourceKind {
        id: usize,
        seed: usize,
        expected: &'static str,
    },
    /// Configuration outside its admissible range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Catch-all for internal structural invariants.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    /// Malformed persisted membership data.
    #[error("malformed membership data: {0}")]
    Wire(String),
    /// Underlying stream failure while persisting results.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for RegionError {
    fn from(e: std::io::Error) -> Self {
        RegionError::Io(e.to_string())
    }
}
