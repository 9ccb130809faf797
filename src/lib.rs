//!
//! profhmm: profile HMM search over variable-length emitting states
//!
//! * `prob`, `alphabet`, `seq`: log-probabilities and symbol sequences
//! * `state`: mute, normal, table and frame (codon) emissions
//! * `hmm`: transition graph of states, Viterbi decoding and paths
//! * `profile`: profile models built from HMMER3 files and their search
//! * `io`: HMMER3 reader, FASTA and GFF3
//!
pub mod alphabet;
pub mod cli;
pub mod error;
pub mod gencode;
pub mod hmm;
pub mod io;
pub mod prelude;
pub mod prob;
pub mod profile;
pub mod seq;
pub mod state;

#[macro_use]
extern crate approx;
