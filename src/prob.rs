///
/// probability calculation
/// implements logaddexp
///
use crate::error::{Error, Result};
use approx::AbsDiffEq;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;

///
/// Wrapper of f64 that represents probability `0 <= p <= 1`
/// stored as natural log.
///
/// `log p = -inf` is the valid zero probability, `NaN` marks a broken value
/// (see `Prob::invalid`).
///
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, SerializeDisplay, DeserializeFromStr)]
pub struct Prob(f64);

///
/// short-hand of `Prob::from_prob`
///
pub fn p(p: f64) -> Prob {
    Prob::from_prob(p)
}

///
/// short-hand of `Prob::from_log_prob`
///
pub fn lp(lp: f64) -> Prob {
    Prob::from_log_prob(lp)
}

impl Prob {
    ///
    /// `from_prob(0.0)` is `-inf`, never a panic.
    pub fn from_prob(value: f64) -> Prob {
        Prob(value.ln())
    }
    ///
    ///
    pub fn from_log_prob(log_value: f64) -> Prob {
        Prob(log_value)
    }
    ///
    /// Get the probability (in `[0, 1]`)
    pub fn to_value(self) -> f64 {
        self.0.exp()
    }
    ///
    /// Get the log probability
    pub fn to_log_value(self) -> f64 {
        self.0
    }
    ///
    /// Is `p == 0` or not? (log p = -inf)
    ///
    pub fn is_zero(self) -> bool {
        self.0.is_infinite() && self.0.is_sign_negative()
    }
    ///
    /// Is `p == 1`? (log p = 0)
    ///
    pub fn is_one(self) -> bool {
        self.0 == 0.0
    }
    ///
    /// Is this a usable value? `-inf` and finite values are valid, NaN is not.
    ///
    pub fn is_valid(self) -> bool {
        !self.0.is_nan()
    }
    ///
    /// prob=0.0
    ///
    pub fn zero() -> Prob {
        Prob(f64::NEG_INFINITY)
    }
    ///
    /// prob=1.0
    ///
    pub fn one() -> Prob {
        Prob(0.0)
    }
    ///
    /// "not computed" marker (NaN), distinct from `zero()`
    ///
    pub fn invalid() -> Prob {
        Prob(f64::NAN)
    }
    ///
    /// abs diff of two log probs `= |log p_a - log p_b|`
    ///
    pub fn log_diff(&self, other: Prob) -> f64 {
        if self.is_zero() {
            if other.is_zero() {
                0.0
            } else {
                f64::INFINITY
            }
        } else {
            if other.is_zero() {
                f64::INFINITY
            } else {
                (self.to_log_value() - other.to_log_value()).abs()
            }
        }
    }
    ///
    /// Larger of two probabilities. NaN wins so that it is never hidden.
    ///
    pub fn max(self, other: Prob) -> Prob {
        if !self.is_valid() || !other.is_valid() {
            Prob::invalid()
        } else if self.0 >= other.0 {
            self
        } else {
            other
        }
    }
}

///
/// Rescale `values` so that they sum to 1 (subtract their log-sum-exp).
///
/// `label` names the distribution in the error. On failure `values` is left
/// untouched.
///
pub fn normalize(values: &mut [Prob], label: &str) -> Result<()> {
    if values.iter().any(|v| !v.is_valid()) {
        return Err(Error::InvalidProbability(label.to_string()));
    }
    let total: Prob = values.iter().sum();
    if total.is_zero() {
        return Err(Error::ZeroMass(label.to_string()));
    }
    for v in values.iter_mut() {
        *v = *v / total;
    }
    Ok(())
}

/// p=0 (Prob(-inf)) as a default value
impl Default for Prob {
    fn default() -> Self {
        Prob(f64::NEG_INFINITY)
    }
}

///
/// Prob has multiplicative identity element
/// `num_traits::One`
///
impl num_traits::One for Prob {
    fn one() -> Self {
        Prob::one()
    }
}

///
/// Prob has additive identity element
/// `num_traits::Zero`
///
impl num_traits::Zero for Prob {
    fn zero() -> Self {
        Prob::zero()
    }
    fn is_zero(&self) -> bool {
        Prob::is_zero(*self)
    }
}

// display
impl std::fmt::Display for Prob {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}({:.4})", self.0, self.to_value())
    }
}
impl FromStr for Prob {
    type Err = std::num::ParseFloatError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let front = match s.split_once('(') {
            Some((front, _)) => front,
            None => s,
        };
        front.trim().parse::<f64>().map(Prob)
    }
}

/// Addition of two probabilities `px + py` in log space
///
/// If `px > py`:
///
/// ```text
/// log(exp(x) + exp(y))
///  = log(exp(x) (1 + exp(y-x)))
///  = log(exp(x)) + log(1 + exp(y-x))
///  = x + log(1 + exp(y-x))
/// ```
impl std::ops::Add for Prob {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        let x = self.0;
        let y = other.0;
        let (x, y) = if x >= y { (x, y) } else { (y, x) };
        if y == f64::NEG_INFINITY {
            // x + 0 = x
            Prob(x)
        } else if x == y {
            // x + x = 2x
            Prob(x + 2f64.ln())
        } else {
            Prob(x + (y - x).exp().ln_1p())
        }
    }
}

/// Multiplication of two probabilities `px * py` in log space
///
/// ```text
/// log(px * py) = log(px) + log(py)
/// ```
impl std::ops::Mul for Prob {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        Prob(self.0 + other.0)
    }
}

/// Division of two probabilities `px / py` in log space
///
/// ```text
/// log(px / py) = log(px) - log(py)
/// ```
impl std::ops::Div for Prob {
    type Output = Self;
    fn div(self, other: Self) -> Self {
        Prob(self.0 - other.0)
    }
}

// assign
impl std::ops::AddAssign for Prob {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
impl std::ops::MulAssign for Prob {
    fn mul_assign(&mut self, other: Self) {
        *self = *self * other;
    }
}
// sum/prod
impl std::iter::Sum for Prob {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Prob::zero(), |a, b| a + b)
    }
}
impl<'a> std::iter::Sum<&'a Self> for Prob {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Prob::zero(), |a, b| a + *b)
    }
}
impl std::iter::Product for Prob {
    fn product<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Prob::one(), |a, b| a * b)
    }
}
impl<'a> std::iter::Product<&'a Self> for Prob {
    fn product<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Prob::one(), |a, b| a * *b)
    }
}

//
// Prob mul/div usize
//

/// Multiplication of Prob and usize `p * c`
///
impl std::ops::Mul<usize> for Prob {
    type Output = Self;
    fn mul(self, rhs: usize) -> Self {
        Prob(self.0 + (rhs as f64).ln())
    }
}

/// Division of Prob and usize `p / c`
///
/// Dividing by zero gives `Prob::invalid()`.
impl std::ops::Div<usize> for Prob {
    type Output = Self;
    fn div(self, rhs: usize) -> Self {
        if rhs == 0 {
            Prob::invalid()
        } else {
            Prob(self.0 - (rhs as f64).ln())
        }
    }
}

/// for approx `assert_abs_diff_eq`
impl AbsDiffEq for Prob {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        f64::abs_diff_eq(&self.0, &other.0, epsilon)
    }
}
