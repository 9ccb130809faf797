//!
//! Hidden Markov Model over variable-length emitting states
//!
//! # Overview of calculation
//!
//! x = x[0],...,x[n-1] : Emissions of length n
//!
//! A path is a sequence of steps `(state, k)` where the state emits the next
//! `k` symbols (`k = 0` for mute states). Its likelihood is
//!
//! ```text
//! P = start(s[0]) e(s[0], w[0]) prod_j t(s[j-1], s[j]) e(s[j], w[j])
//! ```
//!
//! Viterbi
//! V[i][s]
//!  = max P(emits x[0:i] and the last step ends at s) for 0<=i<=n
//!
//! ```text
//! V[i][s] = max_k e(s, x[i-k:i]) max( start(s) if i == k,
//!                                     max_w V[i-k][w] t(w, s) )
//! ```
//!
//! `k = 0` terms refer to the same row, so they are filled after every
//! emitting term of the row, in topological order of the zero-length
//! emitting states.
//!
pub mod common;
pub mod iterators;
pub mod likelihood;
pub mod mocks;
pub mod path;
pub mod viterbi;

pub use common::{Hmm, StateId};
pub use path::{Path, Step};
