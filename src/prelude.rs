//!
//! globally-available parts
//!
pub use crate::alphabet::Alphabet;
pub use crate::error::{Error, Result};
pub use crate::hmm::{Hmm, Path, StateId, Step};
pub use crate::prob::{p, Prob};
pub use crate::profile::{ProfileModel, SearchParams, SearchResult};
pub use crate::seq::Sequence;
pub use crate::state::State;
