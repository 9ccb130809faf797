use crate::error::{Error, Result};
use crate::gencode::GeneticCode;
use serde::{Deserialize, Serialize};

///
/// Knobs of a profile search
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// allow several hits per target (`E -> J -> B` loop)
    pub multiple_hits: bool,
    /// frame profiles: probability of a base insertion or deletion
    pub epsilon: f64,
    /// NCBI genetic code id used by frame profiles
    pub gcode: u8,
    /// cap on the symbols consumed by a single step
    pub window_length: Option<usize>,
}

impl SearchParams {
    pub fn new(
        multiple_hits: bool,
        epsilon: f64,
        gcode: u8,
        window_length: Option<usize>,
    ) -> Result<SearchParams> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(Error::InvalidParameter(format!(
                "epsilon {} is not in [0, 1]",
                epsilon
            )));
        }
        if window_length == Some(0) {
            return Err(Error::InvalidParameter(
                "window length must be positive".to_string(),
            ));
        }
        GeneticCode::get(gcode)?;
        Ok(SearchParams {
            multiple_hits,
            epsilon,
            gcode,
            window_length,
        })
    }
    /// One hit per target, other knobs at their default
    pub fn single_hit() -> SearchParams {
        SearchParams {
            multiple_hits: false,
            ..SearchParams::default()
        }
    }
    /// Frame search with indel probability `epsilon` under genetic code `gcode`
    pub fn frame(epsilon: f64, gcode: u8) -> Result<SearchParams> {
        SearchParams::new(true, epsilon, gcode, None)
    }
    pub fn genetic_code(&self) -> Result<&'static GeneticCode> {
        GeneticCode::get(self.gcode)
    }
}

impl Default for SearchParams {
    fn default() -> SearchParams {
        SearchParams {
            multiple_hits: true,
            epsilon: 0.01,
            gcode: 1,
            window_length: None,
        }
    }
}

impl std::fmt::Display for SearchParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "multiple_hits: {}", self.multiple_hits)?;
        writeln!(f, "epsilon: {}", self.epsilon)?;
        writeln!(f, "gcode: {}", self.gcode)?;
        match self.window_length {
            Some(w) => writeln!(f, "window_length: {}", w),
            None => writeln!(f, "window_length: none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn default_params() {
        let params = SearchParams::default();
        assert!(params.multiple_hits);
        assert_abs_diff_eq!(params.epsilon, 0.01);
        assert_eq!(params.genetic_code().unwrap().id, 1);
        assert!(!SearchParams::single_hit().multiple_hits);
    }
    #[test_case(-0.1 ; "negative")]
    #[test_case(1.5 ; "above one")]
    #[test_case(f64::NAN ; "nan")]
    fn epsilon_out_of_range(epsilon: f64) {
        assert!(matches!(
            SearchParams::new(true, epsilon, 1, None),
            Err(Error::InvalidParameter(_))
        ));
    }
    #[test]
    fn unknown_gcode_and_window() {
        assert!(matches!(
            SearchParams::frame(0.01, 7),
            Err(Error::UnknownGeneticCode(7))
        ));
        assert!(SearchParams::new(true, 0.0, 11, Some(0)).is_err());
        assert_eq!(SearchParams::frame(0.0, 11).unwrap().gcode, 11);
    }
}
