//!
//! Profile HMM search
//!
//! A `ProfileModel` pairs the alternative model
//!
//! ```text
//! S -> N -> B -> (M1 .. MM with inserts and deletes) -> E -> C -> T
//!                ^                                      |
//!                +------------------ J <----------------+
//! ```
//!
//! with a null model made of a single self-looping state `R`. A target is
//! scored by the log-odds of the two Viterbi decodings, and the best path is
//! cut into homologous and non-homologous fragments.
//!
//! * `standard` builds profiles emitting the alphabet of the HMMER model.
//! * `frame` builds profiles of amino-acid models emitting nucleotides
//!   through Frame states.
//!
pub mod builder;
pub mod fragment;
pub mod frame;
pub mod mocks;
pub mod model;
pub mod params;
pub mod result;
pub mod standard;

pub use builder::{ProfileBuilder, Transitions};
pub use fragment::Fragment;
pub use frame::{decode_fragment, frame_profile, DecodedCodon};
pub use model::{CoreIds, ProfileModel, SpecialIds};
pub use params::SearchParams;
pub use result::SearchResult;
pub use standard::standard_profile;
