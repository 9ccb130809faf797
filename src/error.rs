//!
//! Error type shared by every module
//!
//! `Prob::zero()` (an impossible event) is never an error. Only a broken
//! probability (NaN) or a structural problem becomes an `Error`.
//!
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Alphabet symbols are empty, duplicated or overlap with the any symbol
    #[error("invalid alphabet: {0}")]
    InvalidAlphabet(String),

    /// A byte that is neither in the alphabet nor its any symbol
    #[error("symbol {symbol:#04x} at position {position} is not in the alphabet")]
    InvalidSymbol { symbol: u8, position: usize },

    /// Emission table does not fit the alphabet (wrong size, bad key, ...)
    #[error("invalid emission of state `{state}`: {msg}")]
    InvalidEmission { state: String, msg: String },

    /// Out-of-range numeric parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// `add_state` with a name already in the model
    #[error("state `{0}` is already in the model")]
    DuplicateState(String),

    /// Reference to a state that is not (or no longer) in the model
    #[error("state {0} is not in the model")]
    StateNotFound(String),

    /// Zero-length emitting states form a cycle, so no DP order exists
    #[error("zero-length emitting states form a cycle through `{0}`")]
    ZeroEmissionCycle(String),

    /// log-sum-exp of values that are all -inf
    #[error("cannot normalize `{0}`: total probability is zero")]
    ZeroMass(String),

    /// A probability evaluated to NaN
    #[error("invalid (NaN) probability at {0}")]
    InvalidProbability(String),

    /// No path with non-zero probability reaches the end state
    #[error("no path explains the sequence (end state `{0}`)")]
    NoPath(String),

    /// Total emitted length of a path differs from the sequence length
    #[error("path emits {path_len} symbols but the sequence has {seq_len}")]
    SequenceLengthMismatch { path_len: usize, seq_len: usize },

    /// Sub-range outside the parent sequence
    #[error("range {offset}..{end} is out of the sequence of length {len}")]
    OutOfRange { offset: usize, end: usize, len: usize },

    /// Target-length dependent transitions need `L >= 1`
    #[error("target length must be positive")]
    InvalidTargetLength,

    #[error("unknown genetic code id {0}")]
    UnknownGeneticCode(u8),

    #[error("parse error on line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result with the crate `Error`
pub type Result<T> = std::result::Result<T, Error>;
